use crate::error::{AppError, AppResult};
use crate::storage::repository::{
    ApplicationRepository, ApplicationWithResponses, FormFieldRepository, FormRepository,
    NewApplication, OpeningRepository,
};
use crate::submission::validate::validate_submission;
use log::{info, warn};
use sea_orm::{DatabaseConnection, SqlErr};
use std::sync::Arc;

const DUPLICATE_MESSAGE: &str = "You have already applied to this opening";

pub struct SubmissionService {
    db: Arc<DatabaseConnection>,
}

impl SubmissionService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn submit(&self, new: NewApplication) -> AppResult<ApplicationWithResponses> {
        let db = self.db.as_ref();
        let opening = OpeningRepository::find_by_id(db, new.opening_id)
            .await?
            .ok_or_else(|| AppError::not_found("Opening not found"))?;
        let form = FormRepository::find_by_opening(db, opening.id)
            .await?
            .ok_or_else(|| AppError::not_found("Form not found for this opening"))?;
        let fields = FormFieldRepository::list_by_form(db, form.id).await?;

        let new = validate_submission(new, &opening, &form, &fields)?;

        if ApplicationRepository::exists_for_email(db, opening.id, &new.email).await? {
            return Err(AppError::bad_request(DUPLICATE_MESSAGE));
        }

        // The unique index catches a concurrent submission that passed the pre-check.
        let created = match ApplicationRepository::create_with_responses(db, new).await {
            Ok(c) => c,
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                warn!("duplicate application raced for opening {}", opening.id);
                return Err(AppError::bad_request(DUPLICATE_MESSAGE));
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            "application {} submitted for opening {} ({} responses)",
            created.application.id,
            opening.id,
            created.field_responses.len()
        );
        Ok(created)
    }
}

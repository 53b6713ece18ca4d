use crate::analysis::model::FormSchema;
use crate::error::{AppError, AppResult};
use crate::storage::repository::{FormFieldRepository, FormRepository, OpeningRepository};
use sea_orm::DatabaseConnection;

pub async fn resolve_form(db: &DatabaseConnection, opening_id: i32) -> AppResult<FormSchema> {
    let opening = OpeningRepository::find_by_id(db, opening_id)
        .await?
        .ok_or_else(|| AppError::not_found("Opening not found"))?;
    let form = FormRepository::find_by_opening(db, opening_id)
        .await?
        .ok_or_else(|| AppError::not_found("Form not found for this opening"))?;
    let fields = FormFieldRepository::list_by_form(db, form.id).await?;

    Ok(FormSchema {
        opening,
        form,
        fields,
    })
}

use crate::storage::entity::application::{self, Entity as Application};
use crate::storage::entity::field_response::{self, Entity as FieldResponse};
use crate::storage::entity::form::{
    self, ActiveModel as FormActiveModel, Entity as Form, Model as FormModel,
};
use crate::storage::entity::form_field::{self, Entity as FormField, Model as FormFieldModel};
use crate::storage::repository::form_field_repo::{FormFieldRepository, NewFormField};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};

pub struct FormRepository;

impl FormRepository {
    pub async fn find_by_id(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<Option<FormModel>, sea_orm::DbErr> {
        Form::find_by_id(id).one(db).await
    }

    pub async fn find_by_opening(
        db: &DatabaseConnection,
        opening_id: i32,
    ) -> Result<Option<FormModel>, sea_orm::DbErr> {
        Form::find()
            .filter(form::Column::OpeningId.eq(opening_id))
            .one(db)
            .await
    }

    /// Creates the form and its custom fields atomically. Fields without an
    /// explicit order take their 1-based position in `fields`.
    pub async fn create_with_fields(
        db: &DatabaseConnection,
        opening_id: i32,
        has_prior_exp: bool,
        created_by_id: i32,
        fields: Vec<NewFormField>,
    ) -> Result<(FormModel, Vec<FormFieldModel>), sea_orm::DbErr> {
        let txn = db.begin().await?;
        let now = Utc::now().timestamp_millis();
        let created = FormActiveModel {
            opening_id: Set(opening_id),
            has_prior_exp: Set(has_prior_exp),
            created_by_id: Set(created_by_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        for (idx, f) in fields.into_iter().enumerate() {
            let order = f.order.unwrap_or(idx as i32 + 1);
            FormFieldRepository::insert(&txn, created.id, f, order).await?;
        }
        let stored = FormFieldRepository::list_by_form(&txn, created.id).await?;
        txn.commit().await?;
        Ok((created, stored))
    }

    pub async fn set_has_prior_exp(
        db: &DatabaseConnection,
        model: FormModel,
        has_prior_exp: bool,
    ) -> Result<FormModel, sea_orm::DbErr> {
        let mut am: FormActiveModel = model.into();
        am.has_prior_exp = Set(has_prior_exp);
        am.updated_at = Set(Utc::now().timestamp_millis());
        am.update(db).await
    }

    pub async fn delete_cascade(db: &DatabaseConnection, id: i32) -> Result<u64, sea_orm::DbErr> {
        let txn = db.begin().await?;

        let app_ids: Vec<i32> = Application::find()
            .filter(application::Column::FormId.eq(id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|a| a.id)
            .collect();
        if !app_ids.is_empty() {
            FieldResponse::delete_many()
                .filter(field_response::Column::ApplicationId.is_in(app_ids))
                .exec(&txn)
                .await?;
        }
        Application::delete_many()
            .filter(application::Column::FormId.eq(id))
            .exec(&txn)
            .await?;
        FormField::delete_many()
            .filter(form_field::Column::FormId.eq(id))
            .exec(&txn)
            .await?;

        let res = Form::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(res.rows_affected)
    }
}

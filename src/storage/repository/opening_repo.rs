use crate::storage::entity::application::{self, Entity as Application};
use crate::storage::entity::field_response::{self, Entity as FieldResponse};
use crate::storage::entity::form::{self, Entity as Form};
use crate::storage::entity::form_field::{self, Entity as FormField};
use crate::storage::entity::opening::{
    self, ActiveModel as OpeningActiveModel, Entity as Opening, Model as OpeningModel, WorkType,
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOpening {
    pub title: String,
    pub domain: String,
    pub work_type: WorkType,
    pub number_of_slots: i32,
    pub pre_text: String,
    pub about_role: String,
    pub skills_required: String,
    pub extra_info: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningPatch {
    pub title: Option<String>,
    pub domain: Option<String>,
    pub work_type: Option<WorkType>,
    pub number_of_slots: Option<i32>,
    pub pre_text: Option<String>,
    pub about_role: Option<String>,
    pub skills_required: Option<String>,
    pub extra_info: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningFilter {
    pub is_active: Option<bool>,
    pub domain: Option<String>,
    pub work_type: Option<WorkType>,
}

pub struct OpeningRepository;

impl OpeningRepository {
    pub async fn create(
        db: &DatabaseConnection,
        new: NewOpening,
        created_by_id: i32,
    ) -> Result<OpeningModel, sea_orm::DbErr> {
        let now = Utc::now().timestamp_millis();
        OpeningActiveModel {
            title: Set(new.title),
            domain: Set(new.domain),
            work_type: Set(new.work_type),
            number_of_slots: Set(new.number_of_slots),
            pre_text: Set(new.pre_text),
            about_role: Set(new.about_role),
            skills_required: Set(new.skills_required),
            extra_info: Set(new.extra_info),
            is_active: Set(true),
            views: Set(0),
            created_by_id: Set(created_by_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    pub async fn find_by_id(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<Option<OpeningModel>, sea_orm::DbErr> {
        Opening::find_by_id(id).one(db).await
    }

    pub async fn list(
        db: &DatabaseConnection,
        filter: &OpeningFilter,
    ) -> Result<Vec<OpeningModel>, sea_orm::DbErr> {
        let mut query = Opening::find();
        if let Some(a) = filter.is_active {
            query = query.filter(opening::Column::IsActive.eq(a));
        }
        if let Some(d) = filter.domain.as_ref() {
            query = query.filter(opening::Column::Domain.eq(d.clone()));
        }
        if let Some(w) = filter.work_type {
            query = query.filter(opening::Column::WorkType.eq(w));
        }
        query
            .order_by_desc(opening::Column::CreatedAt)
            .order_by_desc(opening::Column::Id)
            .all(db)
            .await
    }

    pub async fn list_by_creator(
        db: &DatabaseConnection,
        created_by_id: i32,
    ) -> Result<Vec<OpeningModel>, sea_orm::DbErr> {
        Opening::find()
            .filter(opening::Column::CreatedById.eq(created_by_id))
            .order_by_desc(opening::Column::CreatedAt)
            .order_by_desc(opening::Column::Id)
            .all(db)
            .await
    }

    pub async fn count(
        db: &DatabaseConnection,
        active_only: bool,
    ) -> Result<u64, sea_orm::DbErr> {
        let mut query = Opening::find();
        if active_only {
            query = query.filter(opening::Column::IsActive.eq(true));
        }
        query.count(db).await
    }

    pub async fn count_by_creator(
        db: &DatabaseConnection,
        created_by_id: i32,
    ) -> Result<u64, sea_orm::DbErr> {
        Opening::find()
            .filter(opening::Column::CreatedById.eq(created_by_id))
            .count(db)
            .await
    }

    pub async fn update(
        db: &DatabaseConnection,
        model: OpeningModel,
        patch: OpeningPatch,
    ) -> Result<OpeningModel, sea_orm::DbErr> {
        let mut am: OpeningActiveModel = model.into();
        if let Some(v) = patch.title {
            am.title = Set(v);
        }
        if let Some(v) = patch.domain {
            am.domain = Set(v);
        }
        if let Some(v) = patch.work_type {
            am.work_type = Set(v);
        }
        if let Some(v) = patch.number_of_slots {
            am.number_of_slots = Set(v);
        }
        if let Some(v) = patch.pre_text {
            am.pre_text = Set(v);
        }
        if let Some(v) = patch.about_role {
            am.about_role = Set(v);
        }
        if let Some(v) = patch.skills_required {
            am.skills_required = Set(v);
        }
        if let Some(v) = patch.extra_info {
            am.extra_info = Set(Some(v));
        }
        if let Some(v) = patch.is_active {
            am.is_active = Set(v);
        }
        am.updated_at = Set(Utc::now().timestamp_millis());
        am.update(db).await
    }

    pub async fn toggle_status(
        db: &DatabaseConnection,
        model: OpeningModel,
    ) -> Result<OpeningModel, sea_orm::DbErr> {
        let flipped = !model.is_active;
        let mut am: OpeningActiveModel = model.into();
        am.is_active = Set(flipped);
        am.updated_at = Set(Utc::now().timestamp_millis());
        am.update(db).await
    }

    /// `views = views + 1` in the store, so concurrent readers never lose a hit.
    pub async fn increment_views(db: &DatabaseConnection, id: i32) -> Result<u64, sea_orm::DbErr> {
        let res = Opening::update_many()
            .col_expr(
                opening::Column::Views,
                Expr::col(opening::Column::Views).add(1),
            )
            .filter(opening::Column::Id.eq(id))
            .exec(db)
            .await?;
        Ok(res.rows_affected)
    }

    pub async fn delete_cascade(db: &DatabaseConnection, id: i32) -> Result<u64, sea_orm::DbErr> {
        let txn = db.begin().await?;

        let app_ids: Vec<i32> = Application::find()
            .filter(application::Column::OpeningId.eq(id))
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
            .filter(application::Column::OpeningId.eq(id))
            .exec(&txn)
            .await?;

        if let Some(f) = Form::find()
            .filter(form::Column::OpeningId.eq(id))
            .one(&txn)
            .await?
        {
            FormField::delete_many()
                .filter(form_field::Column::FormId.eq(f.id))
                .exec(&txn)
                .await?;
            Form::delete_by_id(f.id).exec(&txn).await?;
        }

        let res = Opening::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(res.rows_affected)
    }
}

use crate::storage::entity::application::{
    self, ActiveModel as ApplicationActiveModel, Entity as Application, Model as ApplicationModel,
    YearOfStudy,
};
use crate::storage::entity::field_response::{
    self, ActiveModel as FieldResponseActiveModel, Entity as FieldResponse,
    Model as FieldResponseModel,
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFieldResponse {
    pub field_id: i32,
    pub response_value: Option<String>,
    pub file_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApplication {
    pub opening_id: i32,
    pub form_id: i32,
    pub name: String,
    pub year_of_study: YearOfStudy,
    pub phone_number: String,
    pub email: String,
    pub branch: String,
    pub prior_experience: Option<String>,
    #[serde(default)]
    pub field_responses: Vec<NewFieldResponse>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationFilter {
    pub opening_id: Option<i32>,
    pub year_of_study: Option<YearOfStudy>,
    pub branch: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationWithResponses {
    #[serde(flatten)]
    pub application: ApplicationModel,
    pub field_responses: Vec<FieldResponseModel>,
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct GroupCountRow {
    pub value: String,
    pub count: i64,
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct OpeningCountRow {
    pub opening_id: i32,
    pub count: i64,
}

/// Fixed application columns that can be grouped on.
#[derive(Debug, Clone, Copy)]
pub enum GroupKey {
    Branch,
    YearOfStudy,
}

impl GroupKey {
    fn column(self) -> application::Column {
        match self {
            GroupKey::Branch => application::Column::Branch,
            GroupKey::YearOfStudy => application::Column::YearOfStudy,
        }
    }
}

pub struct ApplicationRepository;

impl ApplicationRepository {
    /// Inserts the application, its responses, and re-reads the responses in
    /// one transaction; a failure anywhere leaves no application row.
    pub async fn create_with_responses(
        db: &DatabaseConnection,
        new: NewApplication,
    ) -> Result<ApplicationWithResponses, sea_orm::DbErr> {
        let txn = db.begin().await?;
        let created = ApplicationActiveModel {
            opening_id: Set(new.opening_id),
            form_id: Set(new.form_id),
            name: Set(new.name),
            year_of_study: Set(new.year_of_study),
            phone_number: Set(new.phone_number),
            email: Set(new.email),
            branch: Set(new.branch),
            prior_experience: Set(new.prior_experience),
            submitted_at: Set(Utc::now().timestamp_millis()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let rows: Vec<FieldResponseActiveModel> = new
            .field_responses
            .into_iter()
            .map(|r| FieldResponseActiveModel {
                application_id: Set(created.id),
                field_id: Set(r.field_id),
                response_value: Set(r.response_value.unwrap_or_default()),
                file_url: Set(r.file_url),
                ..Default::default()
            })
            .collect();
        if !rows.is_empty() {
            FieldResponse::insert_many(rows).exec(&txn).await?;
        }

        let field_responses = FieldResponse::find()
            .filter(field_response::Column::ApplicationId.eq(created.id))
            .order_by_asc(field_response::Column::Id)
            .all(&txn)
            .await?;
        txn.commit().await?;

        Ok(ApplicationWithResponses {
            application: created,
            field_responses,
        })
    }

    pub async fn exists_for_email(
        db: &DatabaseConnection,
        opening_id: i32,
        email: &str,
    ) -> Result<bool, sea_orm::DbErr> {
        let found = Application::find()
            .filter(application::Column::OpeningId.eq(opening_id))
            .filter(application::Column::Email.eq(email.to_string()))
            .one(db)
            .await?;
        Ok(found.is_some())
    }

    pub async fn find_by_id(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<Option<ApplicationModel>, sea_orm::DbErr> {
        Application::find_by_id(id).one(db).await
    }

    pub async fn find_with_responses(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<Option<ApplicationWithResponses>, sea_orm::DbErr> {
        let Some(application) = Self::find_by_id(db, id).await? else {
            return Ok(None);
        };
        let field_responses = Self::responses_for_applications(db, &[id]).await?;
        Ok(Some(ApplicationWithResponses {
            application,
            field_responses,
        }))
    }

    pub async fn list(
        db: &DatabaseConnection,
        filter: &ApplicationFilter,
    ) -> Result<Vec<ApplicationModel>, sea_orm::DbErr> {
        let mut query = Application::find();
        if let Some(o) = filter.opening_id {
            query = query.filter(application::Column::OpeningId.eq(o));
        }
        if let Some(y) = filter.year_of_study {
            query = query.filter(application::Column::YearOfStudy.eq(y));
        }
        if let Some(b) = filter.branch.as_ref() {
            query = query.filter(application::Column::Branch.eq(b.clone()));
        }
        query
            .order_by_desc(application::Column::SubmittedAt)
            .order_by_desc(application::Column::Id)
            .all(db)
            .await
    }

    /// Oldest submissions first; the base ordering for every report.
    pub async fn list_for_opening_chronological(
        db: &DatabaseConnection,
        opening_id: i32,
    ) -> Result<Vec<ApplicationModel>, sea_orm::DbErr> {
        Application::find()
            .filter(application::Column::OpeningId.eq(opening_id))
            .order_by_asc(application::Column::SubmittedAt)
            .order_by_asc(application::Column::Id)
            .all(db)
            .await
    }

    pub async fn responses_for_applications(
        db: &DatabaseConnection,
        application_ids: &[i32],
    ) -> Result<Vec<FieldResponseModel>, sea_orm::DbErr> {
        if application_ids.is_empty() {
            return Ok(Vec::new());
        }
        FieldResponse::find()
            .filter(field_response::Column::ApplicationId.is_in(application_ids.to_vec()))
            .order_by_asc(field_response::Column::ApplicationId)
            .order_by_asc(field_response::Column::Id)
            .all(db)
            .await
    }

    pub async fn responses_for_field(
        db: &DatabaseConnection,
        field_id: i32,
    ) -> Result<Vec<(FieldResponseModel, Option<ApplicationModel>)>, sea_orm::DbErr> {
        FieldResponse::find()
            .filter(field_response::Column::FieldId.eq(field_id))
            .find_also_related(Application)
            .order_by_asc(field_response::Column::Id)
            .all(db)
            .await
    }

    pub async fn count(
        db: &DatabaseConnection,
        opening_id: Option<i32>,
    ) -> Result<u64, sea_orm::DbErr> {
        let mut query = Application::find();
        if let Some(o) = opening_id {
            query = query.filter(application::Column::OpeningId.eq(o));
        }
        query.count(db).await
    }

    pub async fn group_count(
        db: &DatabaseConnection,
        opening_id: i32,
        key: GroupKey,
    ) -> Result<Vec<GroupCountRow>, sea_orm::DbErr> {
        Application::find()
            .select_only()
            .column_as(key.column(), "value")
            .column_as(Expr::cust("COUNT(*)"), "count")
            .filter(application::Column::OpeningId.eq(opening_id))
            .group_by(key.column())
            .order_by_asc(key.column())
            .into_model::<GroupCountRow>()
            .all(db)
            .await
    }

    pub async fn recent(
        db: &DatabaseConnection,
        limit: u64,
    ) -> Result<Vec<ApplicationModel>, sea_orm::DbErr> {
        Application::find()
            .order_by_desc(application::Column::SubmittedAt)
            .order_by_desc(application::Column::Id)
            .limit(limit)
            .all(db)
            .await
    }

    /// Openings with the most applications, ties broken by opening id.
    pub async fn top_openings(
        db: &DatabaseConnection,
        limit: u64,
    ) -> Result<Vec<OpeningCountRow>, sea_orm::DbErr> {
        Application::find()
            .select_only()
            .column(application::Column::OpeningId)
            .column_as(Expr::cust("COUNT(*)"), "count")
            .group_by(application::Column::OpeningId)
            .order_by_desc(Expr::cust("COUNT(*)"))
            .order_by_asc(application::Column::OpeningId)
            .limit(limit)
            .into_model::<OpeningCountRow>()
            .all(db)
            .await
    }

    pub async fn delete_cascade(db: &DatabaseConnection, id: i32) -> Result<u64, sea_orm::DbErr> {
        let txn = db.begin().await?;
        FieldResponse::delete_many()
            .filter(field_response::Column::ApplicationId.eq(id))
            .exec(&txn)
            .await?;
        let res = Application::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(res.rows_affected)
    }
}

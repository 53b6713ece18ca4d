use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkType {
    #[sea_orm(string_value = "ONSITE")]
    Onsite,
    #[sea_orm(string_value = "REMOTE")]
    Remote,
    #[sea_orm(string_value = "HYBRID")]
    Hybrid,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "openings")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub domain: String,
    pub work_type: WorkType,
    pub number_of_slots: i32,
    #[sea_orm(column_type = "Text")]
    pub pre_text: String,
    #[sea_orm(column_type = "Text")]
    pub about_role: String,
    #[sea_orm(column_type = "Text")]
    pub skills_required: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub extra_info: Option<String>,
    pub is_active: bool,
    pub views: i32,
    pub created_by_id: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedById",
        to = "super::user::Column::Id"
    )]
    CreatedBy,
    #[sea_orm(has_one = "super::form::Entity")]
    Form,
    #[sea_orm(has_many = "super::application::Entity")]
    Application,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CreatedBy.def()
    }
}

impl Related<super::form::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Form.def()
    }
}

impl Related<super::application::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Application.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum YearOfStudy {
    #[sea_orm(string_value = "FIRST")]
    First,
    #[sea_orm(string_value = "SECOND")]
    Second,
    #[sea_orm(string_value = "THIRD")]
    Third,
    #[sea_orm(string_value = "FOURTH")]
    Fourth,
}

impl YearOfStudy {
    pub fn as_str(&self) -> &'static str {
        match self {
            YearOfStudy::First => "FIRST",
            YearOfStudy::Second => "SECOND",
            YearOfStudy::Third => "THIRD",
            YearOfStudy::Fourth => "FOURTH",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "applications")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub opening_id: i32,
    pub form_id: i32,
    pub name: String,
    pub year_of_study: YearOfStudy,
    pub phone_number: String,
    pub email: String,
    pub branch: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub prior_experience: Option<String>,
    pub submitted_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::opening::Entity",
        from = "Column::OpeningId",
        to = "super::opening::Column::Id",
        on_delete = "Cascade"
    )]
    Opening,
    #[sea_orm(
        belongs_to = "super::form::Entity",
        from = "Column::FormId",
        to = "super::form::Column::Id",
        on_delete = "Cascade"
    )]
    Form,
    #[sea_orm(has_many = "super::field_response::Entity")]
    FieldResponse,
}

impl Related<super::opening::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Opening.def()
    }
}

impl Related<super::form::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Form.def()
    }
}

impl Related<super::field_response::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FieldResponse.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

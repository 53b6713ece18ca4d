use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Question kinds an admin can put on a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InputType {
    #[sea_orm(string_value = "SHORT_ANSWER")]
    ShortAnswer,
    #[sea_orm(string_value = "LONG_ANSWER")]
    LongAnswer,
    #[sea_orm(string_value = "MULTIPLE_CHOICE")]
    MultipleChoice,
    #[sea_orm(string_value = "MULTIPLE_CORRECT")]
    MultipleCorrect,
    #[sea_orm(string_value = "UPLOAD_DOC")]
    UploadDoc,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::ShortAnswer => "SHORT_ANSWER",
            InputType::LongAnswer => "LONG_ANSWER",
            InputType::MultipleChoice => "MULTIPLE_CHOICE",
            InputType::MultipleCorrect => "MULTIPLE_CORRECT",
            InputType::UploadDoc => "UPLOAD_DOC",
        }
    }

    pub fn is_choice(&self) -> bool {
        matches!(self, InputType::MultipleChoice | InputType::MultipleCorrect)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "form_fields")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub form_id: i32,
    pub field_title: String,
    pub input_type: InputType,
    pub is_required: bool,
    // JSON array of option labels, only for choice types
    #[sea_orm(column_type = "Text", nullable)]
    pub options_json: Option<String>,
    pub field_order: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
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

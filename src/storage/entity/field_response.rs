use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "field_responses")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub application_id: i32,
    pub field_id: i32,
    #[sea_orm(column_type = "Text")]
    pub response_value: String,
    #[sea_orm(nullable)]
    pub file_url: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::application::Entity",
        from = "Column::ApplicationId",
        to = "super::application::Column::Id",
        on_delete = "Cascade"
    )]
    Application,
    #[sea_orm(
        belongs_to = "super::form_field::Entity",
        from = "Column::FieldId",
        to = "super::form_field::Column::Id",
        on_delete = "Cascade"
    )]
    FormField,
}

impl Related<super::application::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Application.def()
    }
}

impl Related<super::form_field::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FormField.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

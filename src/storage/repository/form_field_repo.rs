use crate::storage::entity::field_response::{self, Entity as FieldResponse};
use crate::storage::entity::form_field::{
    self, ActiveModel as FormFieldActiveModel, Entity as FormField, InputType,
    Model as FormFieldModel,
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFormField {
    pub field_title: String,
    pub input_type: InputType,
    #[serde(default)]
    pub is_required: bool,
    pub options: Option<Vec<String>>,
    pub order: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFieldPatch {
    pub field_title: Option<String>,
    pub input_type: Option<InputType>,
    pub is_required: Option<bool>,
    pub options: Option<Vec<String>>,
    pub order: Option<i32>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOrder {
    pub field_id: i32,
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormFieldDto {
    pub id: i32,
    pub form_id: i32,
    pub field_title: String,
    pub input_type: InputType,
    pub is_required: bool,
    pub options: Option<Vec<String>>,
    pub order: i32,
}

impl From<FormFieldModel> for FormFieldDto {
    fn from(model: FormFieldModel) -> Self {
        let options = decode_options(&model);
        Self {
            id: model.id,
            form_id: model.form_id,
            field_title: model.field_title,
            input_type: model.input_type,
            is_required: model.is_required,
            options,
            order: model.field_order,
        }
    }
}

pub fn decode_options(model: &FormFieldModel) -> Option<Vec<String>> {
    model
        .options_json
        .as_deref()
        .and_then(|raw| serde_json::from_str(raw).ok())
}

/// Choice types keep their option list; every other type stores none.
fn encode_options(input_type: InputType, options: Option<Vec<String>>) -> Option<String> {
    if !input_type.is_choice() {
        return None;
    }
    options.map(|o| serde_json::Value::from(o).to_string())
}

pub struct FormFieldRepository;

impl FormFieldRepository {
    pub async fn insert<C: ConnectionTrait>(
        db: &C,
        form_id: i32,
        new: NewFormField,
        order: i32,
    ) -> Result<FormFieldModel, sea_orm::DbErr> {
        let now = Utc::now().timestamp_millis();
        FormFieldActiveModel {
            form_id: Set(form_id),
            field_title: Set(new.field_title),
            input_type: Set(new.input_type),
            is_required: Set(new.is_required),
            options_json: Set(encode_options(new.input_type, new.options)),
            field_order: Set(order),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    pub async fn create(
        db: &DatabaseConnection,
        form_id: i32,
        new: NewFormField,
    ) -> Result<FormFieldModel, sea_orm::DbErr> {
        let order = match new.order {
            Some(o) => o,
            None => Self::max_order(db, form_id).await?.map_or(1, |m| m + 1),
        };
        Self::insert(db, form_id, new, order).await
    }

    pub async fn max_order<C: ConnectionTrait>(
        db: &C,
        form_id: i32,
    ) -> Result<Option<i32>, sea_orm::DbErr> {
        FormField::find()
            .select_only()
            .column_as(Expr::col(form_field::Column::FieldOrder).max(), "max_order")
            .filter(form_field::Column::FormId.eq(form_id))
            .into_tuple::<Option<i32>>()
            .one(db)
            .await
            .map(Option::flatten)
    }

    pub async fn find_by_id(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<Option<FormFieldModel>, sea_orm::DbErr> {
        FormField::find_by_id(id).one(db).await
    }

    /// Schema order: ascending `order`, ties broken by insertion id.
    pub async fn list_by_form<C: ConnectionTrait>(
        db: &C,
        form_id: i32,
    ) -> Result<Vec<FormFieldModel>, sea_orm::DbErr> {
        FormField::find()
            .filter(form_field::Column::FormId.eq(form_id))
            .order_by_asc(form_field::Column::FieldOrder)
            .order_by_asc(form_field::Column::Id)
            .all(db)
            .await
    }

    pub async fn update(
        db: &DatabaseConnection,
        model: FormFieldModel,
        patch: FormFieldPatch,
    ) -> Result<FormFieldModel, sea_orm::DbErr> {
        let input_type = patch.input_type.unwrap_or(model.input_type);
        let options = patch.options.or_else(|| decode_options(&model));
        let mut am: FormFieldActiveModel = model.into();
        if let Some(v) = patch.field_title {
            am.field_title = Set(v);
        }
        if let Some(v) = patch.is_required {
            am.is_required = Set(v);
        }
        if let Some(v) = patch.order {
            am.field_order = Set(v);
        }
        am.input_type = Set(input_type);
        am.options_json = Set(encode_options(input_type, options));
        am.updated_at = Set(Utc::now().timestamp_millis());
        am.update(db).await
    }

    pub async fn delete_cascade(db: &DatabaseConnection, id: i32) -> Result<u64, sea_orm::DbErr> {
        let txn = db.begin().await?;
        FieldResponse::delete_many()
            .filter(field_response::Column::FieldId.eq(id))
            .exec(&txn)
            .await?;
        let res = FormField::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(res.rows_affected)
    }

    /// Applies every `(field, order)` pair or none of them.
    pub async fn reorder(
        db: &DatabaseConnection,
        orders: &[FieldOrder],
    ) -> Result<(), sea_orm::DbErr> {
        let txn = db.begin().await?;
        let now = Utc::now().timestamp_millis();
        for fo in orders {
            FormField::update_many()
                .col_expr(form_field::Column::FieldOrder, Expr::value(fo.order))
                .col_expr(form_field::Column::UpdatedAt, Expr::value(now))
                .filter(form_field::Column::Id.eq(fo.field_id))
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;
        Ok(())
    }
}

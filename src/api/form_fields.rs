use crate::api::extract::{created, ok, ApiJson, ApiOk, ApiPath, Principal};
use crate::api::forms::load_form;
use crate::app_state::AppState;
use crate::error::{AppError, AppResult};
use crate::storage::entity::form_field::{InputType, Model as FormFieldModel};
use crate::storage::repository::form_field_repo::decode_options;
use crate::storage::repository::{
    FieldOrder, FormFieldDto, FormFieldPatch, FormFieldRepository, NewFormField,
};
use axum::extract::State;
use axum::routing::{patch, post, put};
use axum::Router;
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddField {
    pub form_id: i32,
    #[serde(flatten)]
    pub field: NewFormField,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderFields {
    pub form_id: i32,
    pub field_orders: Vec<FieldOrder>,
}

#[derive(Serialize)]
pub struct FieldBody {
    pub field: FormFieldDto,
}

#[derive(Serialize)]
pub struct FieldList {
    pub fields: Vec<FormFieldDto>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/form-fields", post(add_field))
        .route("/form-fields/reorder", patch(reorder_fields))
        .route("/form-fields/{id}", put(update_field).delete(delete_field))
}

fn check_shape(title: &str, input_type: InputType, options: Option<&[String]>) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::bad_request("fieldTitle is required"));
    }
    if input_type.is_choice() {
        let usable = options.is_some_and(|o| !o.is_empty() && o.iter().all(|v| !v.trim().is_empty()));
        if !usable {
            return Err(AppError::bad_request(format!(
                "{} fields need a non-empty options list",
                input_type.as_str()
            )));
        }
    }
    Ok(())
}

pub fn validate_new_field(field: &NewFormField) -> AppResult<()> {
    check_shape(&field.field_title, field.input_type, field.options.as_deref())
}

async fn load_field(state: &AppState, id: i32) -> AppResult<FormFieldModel> {
    FormFieldRepository::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Form field not found"))
}

async fn add_field(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(body): ApiJson<AddField>,
) -> AppResult<ApiOk<FieldBody>> {
    principal.require_staff()?;
    let form = load_form(&state.db, body.form_id).await?;
    validate_new_field(&body.field)?;
    let field = FormFieldRepository::create(&state.db, form.id, body.field).await?;
    info!("field {} added to form {}", field.id, form.id);
    Ok(created(FieldBody {
        field: field.into(),
    }))
}

async fn update_field(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
    ApiJson(patch): ApiJson<FormFieldPatch>,
) -> AppResult<ApiOk<FieldBody>> {
    principal.require_staff()?;
    let existing = load_field(&state, id).await?;

    let title = patch.field_title.as_deref().unwrap_or(&existing.field_title);
    let input_type = patch.input_type.unwrap_or(existing.input_type);
    let current_options = decode_options(&existing);
    let options = patch.options.as_deref().or(current_options.as_deref());
    check_shape(title, input_type, options)?;

    let field = FormFieldRepository::update(&state.db, existing, patch).await?;
    Ok(ok(FieldBody {
        field: field.into(),
    }))
}

async fn delete_field(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<ApiOk<Value>> {
    principal.require_staff()?;
    let field = load_field(&state, id).await?;
    FormFieldRepository::delete_cascade(&state.db, field.id).await?;
    info!("field {} removed from form {}", field.id, field.form_id);
    Ok(ok(json!({ "message": "Form field deleted successfully" })))
}

/// Every listed field must belong to the form; the new orders apply together.
async fn reorder_fields(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(body): ApiJson<ReorderFields>,
) -> AppResult<ApiOk<FieldList>> {
    principal.require_staff()?;
    let form = load_form(&state.db, body.form_id).await?;
    if body.field_orders.is_empty() {
        return Err(AppError::bad_request("fieldOrders must not be empty"));
    }

    let owned: HashSet<i32> = FormFieldRepository::list_by_form(state.db.as_ref(), form.id)
        .await?
        .into_iter()
        .map(|f| f.id)
        .collect();
    if let Some(stray) = body.field_orders.iter().find(|fo| !owned.contains(&fo.field_id)) {
        return Err(AppError::bad_request(format!(
            "Field {} does not belong to form {}",
            stray.field_id, form.id
        )));
    }

    FormFieldRepository::reorder(&state.db, &body.field_orders).await?;
    let fields = FormFieldRepository::list_by_form(state.db.as_ref(), form.id).await?;
    Ok(ok(FieldList {
        fields: fields.into_iter().map(FormFieldDto::from).collect(),
    }))
}

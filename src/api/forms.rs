use crate::analysis::resolve_form;
use crate::api::extract::{created, ok, ApiJson, ApiOk, ApiPath, Principal};
use crate::api::form_fields::validate_new_field;
use crate::api::openings::load_opening;
use crate::app_state::AppState;
use crate::error::{AppError, AppResult};
use crate::storage::entity::form::Model as FormModel;
use crate::storage::entity::form_field::Model as FormFieldModel;
use crate::storage::repository::{FormFieldDto, FormFieldRepository, FormRepository, NewFormField};
use axum::extract::State;
use axum::routing::{get, post};
use axum::Router;
use log::info;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A form with its custom fields in schema order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormWithFields {
    #[serde(flatten)]
    pub form: FormModel,
    pub custom_fields: Vec<FormFieldDto>,
}

impl FormWithFields {
    pub fn new(form: FormModel, fields: Vec<FormFieldModel>) -> Self {
        Self {
            form,
            custom_fields: fields.into_iter().map(FormFieldDto::from).collect(),
        }
    }
}

#[derive(Serialize)]
pub struct FormBody {
    pub form: FormWithFields,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateForm {
    pub opening_id: i32,
    #[serde(default)]
    pub has_prior_exp: bool,
    #[serde(default)]
    pub custom_fields: Vec<NewFormField>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateForm {
    pub has_prior_exp: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/forms", post(create_form))
        .route("/forms/opening/{opening_id}", get(form_for_opening))
        .route(
            "/forms/{id}",
            get(get_form).put(update_form).delete(delete_form),
        )
}

pub(crate) async fn load_form(db: &DatabaseConnection, id: i32) -> AppResult<FormModel> {
    FormRepository::find_by_id(db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Form not found"))
}

async fn form_for_opening(
    State(state): State<AppState>,
    ApiPath(opening_id): ApiPath<i32>,
) -> AppResult<ApiOk<FormBody>> {
    let schema = resolve_form(&state.db, opening_id).await?;
    Ok(ok(FormBody {
        form: FormWithFields::new(schema.form, schema.fields),
    }))
}

async fn create_form(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(body): ApiJson<CreateForm>,
) -> AppResult<ApiOk<FormBody>> {
    principal.require_staff()?;
    let opening = load_opening(&state.db, body.opening_id).await?;
    if FormRepository::find_by_opening(&state.db, opening.id).await?.is_some() {
        return Err(AppError::bad_request("Form already exists for this opening"));
    }
    for field in &body.custom_fields {
        validate_new_field(field)?;
    }

    let (form, fields) = FormRepository::create_with_fields(
        &state.db,
        opening.id,
        body.has_prior_exp,
        principal.id(),
        body.custom_fields,
    )
    .await?;
    info!(
        "form {} created for opening {} with {} fields",
        form.id,
        opening.id,
        fields.len()
    );
    Ok(created(FormBody {
        form: FormWithFields::new(form, fields),
    }))
}

async fn get_form(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<ApiOk<FormBody>> {
    principal.require_staff()?;
    let form = load_form(&state.db, id).await?;
    let fields = FormFieldRepository::list_by_form(state.db.as_ref(), form.id).await?;
    Ok(ok(FormBody {
        form: FormWithFields::new(form, fields),
    }))
}

async fn update_form(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
    ApiJson(body): ApiJson<UpdateForm>,
) -> AppResult<ApiOk<FormBody>> {
    principal.require_staff()?;
    let existing = load_form(&state.db, id).await?;
    principal.require_owner(existing.created_by_id)?;
    let form = FormRepository::set_has_prior_exp(&state.db, existing, body.has_prior_exp).await?;
    let fields = FormFieldRepository::list_by_form(state.db.as_ref(), form.id).await?;
    Ok(ok(FormBody {
        form: FormWithFields::new(form, fields),
    }))
}

async fn delete_form(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<ApiOk<Value>> {
    principal.require_staff()?;
    let existing = load_form(&state.db, id).await?;
    principal.require_owner(existing.created_by_id)?;
    FormRepository::delete_cascade(&state.db, id).await?;
    info!("form {} deleted by {}", id, principal.id());
    Ok(ok(json!({ "message": "Form deleted successfully" })))
}

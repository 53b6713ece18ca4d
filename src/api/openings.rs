use crate::api::extract::{created, ok, ApiJson, ApiOk, ApiPath, ApiQuery, Principal};
use crate::api::forms::FormWithFields;
use crate::app_state::AppState;
use crate::error::{AppError, AppResult};
use crate::storage::entity::opening::Model as OpeningModel;
use crate::storage::repository::{
    ApplicationRepository, FormFieldRepository, FormRepository, GroupCountRow, GroupKey, NewOpening,
    OpeningFilter, OpeningPatch, OpeningRepository,
};
use axum::extract::State;
use axum::routing::{get, patch};
use axum::Router;
use log::info;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

#[derive(Serialize)]
pub struct OpeningList {
    pub openings: Vec<OpeningModel>,
    pub total: usize,
}

#[derive(Serialize)]
pub struct OpeningBody {
    pub opening: OpeningModel,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningDetails {
    pub opening: OpeningModel,
    pub form: Option<FormWithFields>,
    pub total_applications: u64,
    pub total_views: i32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningStats {
    pub views: i32,
    pub total_applications: u64,
    pub applications_by_branch: BTreeMap<String, u64>,
    pub applications_by_year: BTreeMap<String, u64>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/openings", get(list_openings).post(create_opening))
        .route(
            "/openings/{id}",
            get(get_opening).put(update_opening).delete(delete_opening),
        )
        .route("/openings/{id}/details", get(opening_details))
        .route("/openings/{id}/stats", get(opening_stats))
        .route("/openings/{id}/toggle-status", patch(toggle_status))
}

pub(crate) async fn load_opening(db: &DatabaseConnection, id: i32) -> AppResult<OpeningModel> {
    OpeningRepository::find_by_id(db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Opening not found"))
}

fn validate_new(new: &NewOpening) -> AppResult<()> {
    let required = [
        &new.title,
        &new.domain,
        &new.pre_text,
        &new.about_role,
        &new.skills_required,
    ];
    if required.iter().any(|v| v.trim().is_empty()) || new.number_of_slots <= 0 {
        return Err(AppError::bad_request(
            "Missing required fields for opening creation",
        ));
    }
    Ok(())
}

fn distribution(rows: Vec<GroupCountRow>) -> BTreeMap<String, u64> {
    rows.into_iter()
        .map(|r| (r.value, r.count.max(0) as u64))
        .collect()
}

async fn list_openings(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<OpeningFilter>,
) -> AppResult<ApiOk<OpeningList>> {
    let openings = OpeningRepository::list(&state.db, &filter).await?;
    Ok(ok(OpeningList {
        total: openings.len(),
        openings,
    }))
}

async fn get_opening(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<ApiOk<OpeningBody>> {
    if OpeningRepository::increment_views(&state.db, id).await? == 0 {
        return Err(AppError::not_found("Opening not found"));
    }
    let opening = load_opening(&state.db, id).await?;
    Ok(ok(OpeningBody { opening }))
}

async fn opening_details(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<ApiOk<OpeningDetails>> {
    principal.require_staff()?;
    let opening = load_opening(&state.db, id).await?;
    let form = match FormRepository::find_by_opening(&state.db, id).await? {
        Some(form) => {
            let fields = FormFieldRepository::list_by_form(state.db.as_ref(), form.id).await?;
            Some(FormWithFields::new(form, fields))
        }
        None => None,
    };
    let total_applications = ApplicationRepository::count(&state.db, Some(id)).await?;
    Ok(ok(OpeningDetails {
        total_views: opening.views,
        opening,
        form,
        total_applications,
    }))
}

async fn opening_stats(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<ApiOk<OpeningStats>> {
    principal.require_staff()?;
    let opening = load_opening(&state.db, id).await?;
    let by_branch = ApplicationRepository::group_count(&state.db, id, GroupKey::Branch).await?;
    let by_year = ApplicationRepository::group_count(&state.db, id, GroupKey::YearOfStudy).await?;

    Ok(ok(OpeningStats {
        views: opening.views,
        total_applications: ApplicationRepository::count(&state.db, Some(id)).await?,
        applications_by_branch: distribution(by_branch),
        applications_by_year: distribution(by_year),
    }))
}

async fn create_opening(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(new): ApiJson<NewOpening>,
) -> AppResult<ApiOk<OpeningBody>> {
    principal.require_staff()?;
    validate_new(&new)?;
    let opening = OpeningRepository::create(&state.db, new, principal.id()).await?;
    info!("opening {} created by {}", opening.id, principal.id());
    Ok(created(OpeningBody { opening }))
}

async fn update_opening(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
    ApiJson(patch): ApiJson<OpeningPatch>,
) -> AppResult<ApiOk<OpeningBody>> {
    principal.require_staff()?;
    let existing = load_opening(&state.db, id).await?;
    principal.require_owner(existing.created_by_id)?;
    if patch.number_of_slots.is_some_and(|n| n <= 0) {
        return Err(AppError::bad_request("numberOfSlots must be positive"));
    }
    let opening = OpeningRepository::update(&state.db, existing, patch).await?;
    Ok(ok(OpeningBody { opening }))
}

async fn delete_opening(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<ApiOk<Value>> {
    principal.require_staff()?;
    let existing = load_opening(&state.db, id).await?;
    principal.require_owner(existing.created_by_id)?;
    OpeningRepository::delete_cascade(&state.db, id).await?;
    info!("opening {} deleted by {}", id, principal.id());
    Ok(ok(json!({ "message": "Opening deleted successfully" })))
}

async fn toggle_status(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<ApiOk<OpeningBody>> {
    principal.require_staff()?;
    let existing = load_opening(&state.db, id).await?;
    principal.require_owner(existing.created_by_id)?;
    let opening = OpeningRepository::toggle_status(&state.db, existing).await?;
    info!("opening {} is_active={}", opening.id, opening.is_active);
    Ok(ok(OpeningBody { opening }))
}

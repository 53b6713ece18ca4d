use crate::api::extract::{created, ok, ApiJson, ApiOk, ApiPath, ApiQuery, Principal};
use crate::api::openings::load_opening;
use crate::app_state::AppState;
use crate::error::{AppError, AppResult};
use crate::storage::entity::application::{Model as ApplicationModel, YearOfStudy};
use crate::storage::repository::{
    ApplicationFilter, ApplicationRepository, ApplicationWithResponses, NewApplication,
};
use axum::extract::State;
use axum::routing::get;
use axum::Router;
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Serialize)]
pub struct ApplicationList {
    pub applications: Vec<ApplicationModel>,
    pub total: usize,
}

#[derive(Serialize)]
pub struct ApplicationBody {
    pub application: ApplicationWithResponses,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningApplicationsQuery {
    pub year_of_study: Option<YearOfStudy>,
    pub branch: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/applications", get(list_applications).post(submit_application))
        .route(
            "/applications/{id}",
            get(get_application).delete(delete_application),
        )
        .route(
            "/applications/opening/{opening_id}",
            get(applications_for_opening),
        )
}

async fn submit_application(
    State(state): State<AppState>,
    ApiJson(new): ApiJson<NewApplication>,
) -> AppResult<ApiOk<ApplicationBody>> {
    let application = state.submissions.submit(new).await?;
    Ok(created(ApplicationBody { application }))
}

async fn list_applications(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(filter): ApiQuery<ApplicationFilter>,
) -> AppResult<ApiOk<ApplicationList>> {
    principal.require_staff()?;
    let applications = ApplicationRepository::list(&state.db, &filter).await?;
    Ok(ok(ApplicationList {
        total: applications.len(),
        applications,
    }))
}

async fn get_application(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<ApiOk<ApplicationBody>> {
    principal.require_staff()?;
    let application = ApplicationRepository::find_with_responses(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Application not found"))?;
    Ok(ok(ApplicationBody { application }))
}

async fn applications_for_opening(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(opening_id): ApiPath<i32>,
    ApiQuery(q): ApiQuery<OpeningApplicationsQuery>,
) -> AppResult<ApiOk<ApplicationList>> {
    principal.require_staff()?;
    let opening = load_opening(&state.db, opening_id).await?;
    let filter = ApplicationFilter {
        opening_id: Some(opening.id),
        year_of_study: q.year_of_study,
        branch: q.branch,
    };
    let applications = ApplicationRepository::list(&state.db, &filter).await?;
    Ok(ok(ApplicationList {
        total: applications.len(),
        applications,
    }))
}

async fn delete_application(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<ApiOk<Value>> {
    principal.require_admin()?;
    if ApplicationRepository::delete_cascade(&state.db, id).await? == 0 {
        return Err(AppError::not_found("Application not found"));
    }
    info!("application {} deleted by {}", id, principal.id());
    Ok(ok(json!({ "message": "Application deleted successfully" })))
}

use crate::analysis::{
    export_csv, individual_view, question_view, summary_view, IndividualView, QuestionView,
    SummaryView,
};
use crate::api::extract::{ok, ApiOk, ApiPath, ApiQuery, Principal};
use crate::app_service::{self, DashboardStats};
use crate::app_state::AppState;
use crate::error::AppResult;
use crate::storage::entity::opening::Model as OpeningModel;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use log::info;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionQuery {
    pub field_id: Option<i32>,
}

#[derive(Serialize)]
pub struct MyOpenings {
    pub openings: Vec<OpeningModel>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/applications/analysis/stats", get(stats))
        .route("/applications/analysis/my-openings", get(my_openings))
        .route("/applications/analysis/{opening_id}/summary", get(summary))
        .route("/applications/analysis/{opening_id}/questions", get(questions))
        .route(
            "/applications/analysis/{opening_id}/individual/{application_id}",
            get(individual),
        )
        .route("/applications/analysis/{opening_id}/export", get(export))
}

async fn stats(
    State(state): State<AppState>,
    principal: Principal,
) -> AppResult<ApiOk<DashboardStats>> {
    principal.require_staff()?;
    Ok(ok(app_service::dashboard_stats(&state.db).await?))
}

async fn my_openings(
    State(state): State<AppState>,
    principal: Principal,
) -> AppResult<ApiOk<MyOpenings>> {
    principal.require_staff()?;
    let openings = app_service::my_openings(&state.db, principal.id()).await?;
    Ok(ok(MyOpenings { openings }))
}

async fn summary(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(opening_id): ApiPath<i32>,
) -> AppResult<ApiOk<SummaryView>> {
    principal.require_staff()?;
    Ok(ok(summary_view(&state.db, opening_id).await?))
}

async fn questions(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(opening_id): ApiPath<i32>,
    ApiQuery(q): ApiQuery<QuestionQuery>,
) -> AppResult<ApiOk<QuestionView>> {
    principal.require_staff()?;
    Ok(ok(question_view(&state.db, opening_id, q.field_id).await?))
}

async fn individual(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath((opening_id, application_id)): ApiPath<(i32, i32)>,
) -> AppResult<ApiOk<IndividualView>> {
    principal.require_staff()?;
    Ok(ok(individual_view(&state.db, opening_id, application_id).await?))
}

async fn export(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(opening_id): ApiPath<i32>,
) -> AppResult<impl IntoResponse> {
    principal.require_staff()?;
    let csv = export_csv(&state.db, opening_id).await?;
    info!("exported {} for opening {}", csv.filename, opening_id);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", csv.filename),
            ),
        ],
        csv.body,
    ))
}

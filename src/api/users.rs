use crate::api::extract::{created, ok, ApiJson, ApiOk, ApiPath, ApiQuery, Principal};
use crate::app_state::AppState;
use crate::error::{AppError, AppResult};
use crate::storage::entity::user::{Model as UserModel, Role};
use crate::storage::repository::{NewUser, OpeningRepository, UserPatch, UserRepository};
use axum::extract::State;
use axum::routing::get;
use axum::Router;
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

#[derive(Serialize)]
pub struct UserList {
    pub users: Vec<UserModel>,
    pub total: usize,
}

#[derive(Serialize)]
pub struct UserBody {
    pub user: UserModel,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(me))
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

async fn me(principal: Principal) -> ApiOk<UserBody> {
    ok(UserBody {
        user: principal.user,
    })
}

async fn list_users(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(q): ApiQuery<UserQuery>,
) -> AppResult<ApiOk<UserList>> {
    principal.require_staff()?;
    let users = UserRepository::list(&state.db, q.role, q.is_active).await?;
    Ok(ok(UserList {
        total: users.len(),
        users,
    }))
}

async fn get_user(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<ApiOk<UserBody>> {
    principal.require_staff()?;
    let user = UserRepository::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(ok(UserBody { user }))
}

async fn ensure_email_free(state: &AppState, email: &str, except: Option<i32>) -> AppResult<()> {
    match UserRepository::find_by_email(&state.db, email).await? {
        Some(existing) if Some(existing.id) != except => Err(AppError::bad_request(
            "User with this email already exists",
        )),
        _ => Ok(()),
    }
}

async fn create_user(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(mut new): ApiJson<NewUser>,
) -> AppResult<ApiOk<UserBody>> {
    principal.require_admin()?;
    new.email = new.email.trim().to_lowercase();
    new.name = new.name.trim().to_string();
    if new.email.is_empty() || new.name.is_empty() {
        return Err(AppError::bad_request("Email and name are required"));
    }
    ensure_email_free(&state, &new.email, None).await?;

    let user = UserRepository::create(&state.db, new).await?;
    info!("user {} created by {}", user.id, principal.id());
    Ok(created(UserBody { user }))
}

async fn update_user(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
    ApiJson(mut patch): ApiJson<UserPatch>,
) -> AppResult<ApiOk<UserBody>> {
    principal.require_admin()?;
    let existing = UserRepository::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    if let Some(email) = patch.email.take() {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(AppError::bad_request("Email cannot be empty"));
        }
        ensure_email_free(&state, &email, Some(id)).await?;
        patch.email = Some(email);
    }

    let user = UserRepository::update(&state.db, existing, patch).await?;
    Ok(ok(UserBody { user }))
}

async fn delete_user(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<ApiOk<Value>> {
    principal.require_admin()?;
    if id == principal.id() {
        return Err(AppError::bad_request("You cannot delete your own account"));
    }
    if UserRepository::find_by_id(&state.db, id).await?.is_none() {
        return Err(AppError::not_found("User not found"));
    }
    if OpeningRepository::count_by_creator(&state.db, id).await? > 0 {
        return Err(AppError::bad_request(
            "User still owns openings; reassign or delete them first",
        ));
    }

    UserRepository::delete(&state.db, id).await?;
    info!("user {} deleted by {}", id, principal.id());
    Ok(ok(json!({ "message": "User deleted successfully" })))
}

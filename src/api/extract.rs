use crate::app_state::AppState;
use crate::error::{AppError, AppResult};
use crate::storage::entity::user::{Model as UserModel, Role};
use crate::storage::repository::UserRepository;
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Set by the authenticating gateway in front of the service.
pub const IDENTITY_HEADER: &str = "x-remote-user-identity";

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

#[derive(Serialize)]
struct Envelope<T> {
    success: bool,
    data: T,
}

pub struct ApiOk<T>(pub StatusCode, pub T);

pub fn ok<T: Serialize>(data: T) -> ApiOk<T> {
    ApiOk(StatusCode::OK, data)
}

pub fn created<T: Serialize>(data: T) -> ApiOk<T> {
    ApiOk(StatusCode::CREATED, data)
}

impl<T: Serialize> IntoResponse for ApiOk<T> {
    fn into_response(self) -> Response {
        let body = Envelope {
            success: true,
            data: self.1,
        };
        (self.0, Json(body)).into_response()
    }
}

/// The user the gateway authenticated, re-read from the store on every request
/// so role changes and deactivation apply immediately.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user: UserModel,
}

impl Principal {
    pub fn id(&self) -> i32 {
        self.user.id
    }

    pub fn is_admin(&self) -> bool {
        self.user.role == Role::Admin
    }

    pub fn require(&self, roles: &[Role]) -> AppResult<()> {
        if roles.contains(&self.user.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden("Access denied".into()))
        }
    }

    pub fn require_staff(&self) -> AppResult<()> {
        self.require(&[Role::Admin, Role::Leader])
    }

    pub fn require_admin(&self) -> AppResult<()> {
        self.require(&[Role::Admin])
    }

    /// Admins pass; anyone else must have created the resource.
    pub fn require_owner(&self, created_by_id: i32) -> AppResult<()> {
        if self.is_admin() || self.user.id == created_by_id {
            Ok(())
        } else {
            Err(AppError::Forbidden("Access denied (not owner)".into()))
        }
    }
}

impl FromRequestParts<AppState> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(raw) = parts.headers.get(IDENTITY_HEADER) else {
            return Err(AppError::Unauthenticated("Authentication required".into()));
        };
        let id: i32 = raw
            .to_str()
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .ok_or_else(|| AppError::Unauthenticated("Invalid user identity".into()))?;

        match UserRepository::find_by_id(&state.db, id).await? {
            Some(user) if user.is_active => Ok(Principal { user }),
            Some(_) => Err(AppError::Unauthenticated("User account is inactive".into())),
            None => Err(AppError::Unauthenticated("User not found".into())),
        }
    }
}

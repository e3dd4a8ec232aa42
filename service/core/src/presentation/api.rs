// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # HTTP API (Axum)
//!
//! | Route | Method | Use case | Success |
//! |-------|--------|----------|---------|
//! | `/` | GET | route index | 200 |
//! | `/users` | GET | `UserService::list` | 200 |
//! | `/users` | POST | `UserService::create` | 201 |
//! | `/users/{id}` | GET | `UserService::retrieve` | 200 |
//! | `/users/{id}` | PUT | `UserService::update` | 200 |
//! | `/users/{id}` | PATCH | `UserService::partial_update` | 200 |
//! | `/users/{id}` | DELETE | `UserService::destroy` | 204 |
//! | `/health` | GET | `HealthProbe::check` | 200, always |
//!
//! Handlers only translate between HTTP and the application layer. Access
//! decisions are made by the injected policy inside `UserService`.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, FromRequestParts, Path, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::application::auth::{AuthError, Authenticator};
use crate::application::health::{HealthProbe, UserStoreProbe, DB_COMPONENT};
use crate::application::users::{
    CreateUser, MalformedBody, RequestBody, StandardUserService, UserService, UserServiceError,
};
use crate::domain::access::{AccessDenied, Identity, SelfOrSuperuser};
use crate::domain::health::HealthStatus;
use crate::domain::repository::UserRepository;
use crate::domain::user::{User, UserChanges, UserId};

pub const EXPLORER_PATH: &str = "/api-explorer";

pub struct AppState {
    pub users: Arc<dyn UserService>,
    pub authenticator: Arc<Authenticator>,
    pub health: Arc<HealthProbe>,
}

impl AppState {
    /// Standard wiring over one user store: `SelfOrSuperuser` policy,
    /// Basic authentication and the `db` health probe.
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        let policy = Arc::new(SelfOrSuperuser::new());
        Self {
            users: Arc::new(StandardUserService::new(users.clone(), policy)),
            authenticator: Arc::new(Authenticator::new(users.clone())),
            health: Arc::new(
                HealthProbe::new().with_probe(DB_COMPONENT, Arc::new(UserStoreProbe::new(users))),
            ),
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(api_root))
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(retrieve_user)
                .put(update_user)
                .patch(partial_update_user)
                .delete(destroy_user),
        )
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Service(#[from] UserServiceError),
}

impl From<AccessDenied> for ApiError {
    fn from(denied: AccessDenied) -> Self {
        ApiError::Service(UserServiceError::Access(denied))
    }
}

fn detail(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "detail": message.into() }))).into_response()
}

fn internal(err: &dyn std::error::Error) -> Response {
    error!(error = %err, "request failed");
    detail(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.")
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Auth(AuthError::Repository(e)) => internal(&e),
            ApiError::Auth(e) => detail(StatusCode::FORBIDDEN, e.to_string()),
            ApiError::Service(UserServiceError::Access(denied)) => {
                detail(StatusCode::FORBIDDEN, denied.to_string())
            }
            ApiError::Service(UserServiceError::NotFound) => {
                detail(StatusCode::NOT_FOUND, "Not found.")
            }
            ApiError::Service(UserServiceError::Validation(errors)) => {
                (StatusCode::BAD_REQUEST, Json(errors)).into_response()
            }
            ApiError::Service(UserServiceError::MalformedBody(MalformedBody(message))) => {
                detail(StatusCode::BAD_REQUEST, message)
            }
            ApiError::Service(e) => internal(&e),
        }
    }
}

/// The authenticated caller, resolved from the `Authorization` header.
pub struct Caller(pub Identity);

impl FromRequestParts<Arc<AppState>> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let authorization = match parts.headers.get(AUTHORIZATION) {
            Some(value) => Some(value.to_str().map_err(|_| {
                AuthError::MalformedHeader("Credentials not correctly base64 encoded.")
            })?),
            None => None,
        };
        let identity = state.authenticator.identify(authorization).await?;
        Ok(Caller(identity))
    }
}

/// Defer a body rejection to the use case, which reports it only after the
/// caller has passed every access check.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> RequestBody<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| MalformedBody(rejection.body_text()))
}

/// Ids that are not integers can never match a row.
fn parse_id(raw: &str) -> Option<UserId> {
    raw.parse::<i64>().ok().map(UserId)
}

#[derive(Debug, Serialize)]
pub struct UserView {
    pub url: String,
    pub username: String,
    pub email: String,
    pub is_staff: bool,
    pub first_name: String,
    pub last_name: String,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            url: format!("/users/{}", user.id),
            username: user.username,
            email: user.email,
            is_staff: user.is_staff,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthLinks {
    explorer: &'static str,
}

#[derive(Debug, Serialize)]
struct HealthBody {
    data: HealthLinks,
    status: HealthStatus,
}

async fn api_root() -> Json<serde_json::Value> {
    Json(json!({ "users": "/users" }))
}

async fn list_users(
    State(state): State<Arc<AppState>>,
    Caller(identity): Caller,
) -> Result<Json<Vec<UserView>>, ApiError> {
    let users = state.users.list(&identity).await?;
    Ok(Json(users.into_iter().map(UserView::from).collect()))
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    Caller(identity): Caller,
    payload: Result<Json<CreateUser>, JsonRejection>,
) -> Result<(StatusCode, Json<UserView>), ApiError> {
    let user = state.users.create(&identity, body(payload)).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

async fn retrieve_user(
    State(state): State<Arc<AppState>>,
    Caller(identity): Caller,
    Path(raw_id): Path<String>,
) -> Result<Json<UserView>, ApiError> {
    let Some(id) = parse_id(&raw_id) else {
        return Err(not_found(&identity));
    };
    let user = state.users.retrieve(&identity, id).await?;
    Ok(Json(user.into()))
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    Caller(identity): Caller,
    Path(raw_id): Path<String>,
    payload: Result<Json<UserChanges>, JsonRejection>,
) -> Result<Json<UserView>, ApiError> {
    let Some(id) = parse_id(&raw_id) else {
        return Err(not_found(&identity));
    };
    let user = state.users.update(&identity, id, body(payload)).await?;
    Ok(Json(user.into()))
}

async fn partial_update_user(
    State(state): State<Arc<AppState>>,
    Caller(identity): Caller,
    Path(raw_id): Path<String>,
    payload: Result<Json<UserChanges>, JsonRejection>,
) -> Result<Json<UserView>, ApiError> {
    let Some(id) = parse_id(&raw_id) else {
        return Err(not_found(&identity));
    };
    let user = state.users.partial_update(&identity, id, body(payload)).await?;
    Ok(Json(user.into()))
}

async fn destroy_user(
    State(state): State<Arc<AppState>>,
    Caller(identity): Caller,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let Some(id) = parse_id(&raw_id) else {
        return Err(not_found(&identity));
    };
    state.users.destroy(&identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn not_found(identity: &Identity) -> ApiError {
    if identity.is_authenticated {
        UserServiceError::NotFound.into()
    } else {
        AccessDenied::AuthenticationMissing.into()
    }
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthBody> {
    let status = state.health.check().await;
    Json(HealthBody {
        data: HealthLinks {
            explorer: EXPLORER_PATH,
        },
        status,
    })
}

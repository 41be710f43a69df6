//! Users HTTP Routes
//!
//! One handler per route. Each validates its path, query and body, calls a
//! single repository operation and returns the result as JSON.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::debug;

use crate::users::validation::parse_id;
use crate::users::{
    CreateUserRequest, InMemoryUserRepository, Role, UpdateUserRequest, User, UserRepository,
};

use super::errors::{ApiError, ApiResult};

// ==================
// Shared State
// ==================

/// Users state shared across handlers
pub struct UsersState<R: UserRepository = InMemoryUserRepository> {
    pub repository: R,
}

impl<R: UserRepository> UsersState<R> {
    pub fn with_repository(repository: R) -> Self {
        Self { repository }
    }
}

impl UsersState<InMemoryUserRepository> {
    /// State backed by the seeded in-memory repository
    pub fn new() -> Self {
        Self::with_repository(InMemoryUserRepository::with_seed())
    }
}

impl Default for UsersState<InMemoryUserRepository> {
    fn default() -> Self {
        Self::new()
    }
}

type SharedState<R> = Arc<UsersState<R>>;

// ==================
// Request Types
// ==================

#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    #[serde(default)]
    pub role: Option<String>,
}

// ==================
// Users Routes
// ==================

/// Create users routes
pub fn users_routes<R: UserRepository + 'static>(state: SharedState<R>) -> Router {
    Router::new()
        .route("/", get(list_users::<R>).post(create_user::<R>))
        .route(
            "/:id",
            get(get_user::<R>)
                .patch(update_user::<R>)
                .delete(remove_user::<R>),
        )
        .with_state(state)
}

/// GET /users?role=
async fn list_users<R: UserRepository + 'static>(
    State(state): State<SharedState<R>>,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Json<Vec<User>>> {
    // An empty `role=` means no filter
    let users = match query.role.as_deref().filter(|raw| !raw.is_empty()) {
        None => state.repository.list(None)?,
        Some(raw) => match raw.parse::<Role>() {
            Ok(role) => state.repository.list(Some(role))?,
            // No record can carry an unknown role
            Err(_) => {
                debug!(role = raw, "unknown role filter");
                Vec::new()
            }
        },
    };

    Ok(Json(users))
}

/// GET /users/:id
async fn get_user<R: UserRepository + 'static>(
    State(state): State<SharedState<R>>,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    let id = parse_id(&id)?;
    Ok(Json(state.repository.get(id)?))
}

/// POST /users
async fn create_user<R: UserRepository + 'static>(
    State(state): State<SharedState<R>>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let Json(request) = body.map_err(invalid_body)?;
    let new_user = request.validate()?;

    let user = state.repository.create(new_user)?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// PATCH /users/:id
async fn update_user<R: UserRepository + 'static>(
    State(state): State<SharedState<R>>,
    Path(id): Path<String>,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let id = parse_id(&id)?;
    let Json(request) = body.map_err(invalid_body)?;
    let patch = request.validate()?;

    Ok(Json(state.repository.update(id, patch)?))
}

/// DELETE /users/:id
async fn remove_user<R: UserRepository + 'static>(
    State(state): State<SharedState<R>>,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    let id = parse_id(&id)?;
    Ok(Json(state.repository.remove(id)?))
}

fn invalid_body(rejection: JsonRejection) -> ApiError {
    ApiError::InvalidBody(rejection.body_text())
}

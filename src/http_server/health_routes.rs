//! Health HTTP Route

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::users::UserRepository;

use super::errors::ApiResult;
use super::users_routes::UsersState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub users: usize,
}

/// Health check route at `/health`
pub fn health_routes<R: UserRepository + 'static>(state: Arc<UsersState<R>>) -> Router {
    Router::new()
        .route("/health", get(health_handler::<R>))
        .with_state(state)
}

async fn health_handler<R: UserRepository + 'static>(
    State(state): State<Arc<UsersState<R>>>,
) -> ApiResult<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        users: state.repository.len()?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
            users: 5,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["users"], 5);
    }
}

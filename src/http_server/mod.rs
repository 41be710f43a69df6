//! # HTTP Server Module
//!
//! Transport layer for the users API: an Axum router with one handler per
//! route, boundary validation, structured JSON errors and rate limiting.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /users[?role=]` - List users
//! - `GET /users/:id` - Fetch one user
//! - `POST /users` - Create a user
//! - `PATCH /users/:id` - Partially update a user
//! - `DELETE /users/:id` - Remove a user

pub mod config;
pub mod errors;
pub mod health_routes;
pub mod rate_limit;
pub mod server;
pub mod users_routes;

pub use config::{ConfigError, HttpServerConfig};
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use rate_limit::{RateLimiter, ThrottleWindow, Throttled};
pub use server::HttpServer;
pub use users_routes::UsersState;

//! # HTTP Server
//!
//! Combines the users and health routers with CORS, tracing and rate
//! limiting layers.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::users::{InMemoryUserRepository, UserRepository};

use super::config::HttpServerConfig;
use super::health_routes::health_routes;
use super::rate_limit::{rate_limit_middleware, RateLimiter};
use super::users_routes::{users_routes, UsersState};

/// HTTP server for the users API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with default configuration
    pub fn new() -> Self {
        Self::with_config(HttpServerConfig::default())
    }

    /// Create a server over the seeded in-memory repository
    pub fn with_config(config: HttpServerConfig) -> Self {
        Self::with_state(config, Arc::new(UsersState::<InMemoryUserRepository>::new()))
    }

    /// Create a server over an existing repository state
    pub fn with_state<R: UserRepository + 'static>(
        config: HttpServerConfig,
        state: Arc<UsersState<R>>,
    ) -> Self {
        let router = Self::build_router(&config, state);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    fn build_router<R: UserRepository + 'static>(
        config: &HttpServerConfig,
        state: Arc<UsersState<R>>,
    ) -> Router {
        let limiter = Arc::new(RateLimiter::new(config.rate_limits.clone()));

        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| match s.parse() {
                    Ok(origin) => Some(origin),
                    Err(_) => {
                        warn!(origin = %s, "ignoring unparsable CORS origin");
                        None
                    }
                })
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        // Outermost first: trace, CORS, then throttling
        Router::new()
            .merge(health_routes(state.clone()))
            .nest("/users", users_routes(state))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(cors)
                    .layer(middleware::from_fn_with_state(limiter, rate_limit_middleware)),
            )
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until the process is stopped
    pub async fn start(self) -> Result<(), std::io::Error> {
        let listener = TcpListener::bind(self.socket_addr()).await?;
        let addr = listener.local_addr()?;

        info!(%addr, "users API listening");
        info!(rate_limits = ?self.config.rate_limits, "throttle windows");

        axum::serve(
            listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
    }
}

impl Default for HttpServer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_creation() {
        let server = HttpServer::new();
        assert_eq!(server.socket_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_server_with_custom_port() {
        let config = HttpServerConfig::with_port(8080);
        let server = HttpServer::with_config(config);
        assert_eq!(server.socket_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_router_builds_with_origins() {
        let config = HttpServerConfig {
            cors_origins: vec!["http://localhost:5173".to_string()],
            ..Default::default()
        };
        let _router = HttpServer::with_config(config).router();
    }
}

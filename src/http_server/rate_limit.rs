//! # Rate Limiting
//!
//! Fixed-window throttling keyed by client IP. Every configured window must
//! have quota left for a request to pass; a rejected request consumes none.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::errors::ApiError;

/// Key used when the peer address is unknown
const UNKNOWN_CLIENT: &str = "unknown";

/// Client entries beyond this count trigger a sweep of expired ones
const PRUNE_THRESHOLD: usize = 1024;

/// A named fixed window: at most `limit` requests per `ttl_ms`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleWindow {
    pub name: String,
    pub ttl_ms: u64,
    pub limit: u32,
}

impl ThrottleWindow {
    pub fn new(name: impl Into<String>, ttl_ms: u64, limit: u32) -> Self {
        Self {
            name: name.into(),
            ttl_ms,
            limit,
        }
    }

    /// 3 requests per second
    pub fn short() -> Self {
        Self::new("short", 1_000, 3)
    }

    /// 50 requests per minute
    pub fn long() -> Self {
        Self::new("long", 60_000, 50)
    }

    pub fn defaults() -> Vec<Self> {
        vec![Self::short(), Self::long()]
    }

    fn ttl(&self) -> Duration {
        Duration::milliseconds(i64::try_from(self.ttl_ms).unwrap_or(i64::MAX))
    }
}

/// Rejection produced when a window is exhausted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("throttle window '{window}' exhausted")]
pub struct Throttled {
    pub window: String,
    pub retry_after_ms: u64,
}

impl Throttled {
    /// Whole seconds until the window reopens, at least 1
    pub fn retry_after_secs(&self) -> u64 {
        self.retry_after_ms.div_ceil(1_000).max(1)
    }
}

#[derive(Debug, Clone, Copy)]
struct WindowState {
    count: u32,
    started_at: DateTime<Utc>,
}

/// Per-client fixed-window counters
#[derive(Debug)]
pub struct RateLimiter {
    windows: Vec<ThrottleWindow>,
    clients: Mutex<HashMap<String, Vec<WindowState>>>,
}

impl RateLimiter {
    pub fn new(windows: Vec<ThrottleWindow>) -> Self {
        Self {
            windows,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// True when no window is configured
    pub fn is_disabled(&self) -> bool {
        self.windows.is_empty()
    }

    /// Count a request from `client` now
    pub fn check(&self, client: &str) -> Result<(), Throttled> {
        self.check_at(client, Utc::now())
    }

    /// Count a request from `client` at `now`
    pub fn check_at(&self, client: &str, now: DateTime<Utc>) -> Result<(), Throttled> {
        if self.is_disabled() {
            return Ok(());
        }

        // Counters stay consistent under poisoning: each update is a plain store.
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);

        if clients.len() > PRUNE_THRESHOLD && !clients.contains_key(client) {
            self.prune(&mut clients, now);
        }

        let states = clients.entry(client.to_string()).or_insert_with(|| {
            vec![
                WindowState {
                    count: 0,
                    started_at: now,
                };
                self.windows.len()
            ]
        });

        for (window, state) in self.windows.iter().zip(states.iter_mut()) {
            if now - state.started_at >= window.ttl() {
                state.count = 0;
                state.started_at = now;
            }
        }

        for (window, state) in self.windows.iter().zip(states.iter()) {
            if state.count >= window.limit {
                let remaining = window.ttl() - (now - state.started_at);
                return Err(Throttled {
                    window: window.name.clone(),
                    retry_after_ms: u64::try_from(remaining.num_milliseconds()).unwrap_or(0),
                });
            }
        }

        for state in states.iter_mut() {
            state.count += 1;
        }

        Ok(())
    }

    /// Drop clients whose every window has expired
    fn prune(&self, clients: &mut HashMap<String, Vec<WindowState>>, now: DateTime<Utc>) {
        clients.retain(|_, states| {
            self.windows
                .iter()
                .zip(states.iter())
                .any(|(window, state)| now - state.started_at < window.ttl())
        });
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.clients
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(ThrottleWindow::defaults())
    }
}

/// Key for the requesting client
fn client_key(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Middleware rejecting requests over quota with 429
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_key(&request);

    match limiter.check(&client) {
        Ok(()) => next.run(request).await,
        Err(throttled) => {
            warn!(
                client = %client,
                window = %throttled.window,
                retry_after_ms = throttled.retry_after_ms,
                "request throttled"
            );
            ApiError::from(throttled).into_response()
        }
    }
}

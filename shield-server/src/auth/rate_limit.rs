//! Application-layer rate limiting for the login route

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::{AppError, ErrorCode};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::core::ServerState;
use crate::security_log;

struct IpEntry {
    count: u32,
    window_start: Instant,
}

#[derive(Clone, Default)]
pub struct RateLimiter {
    /// route name -> (IP -> entry)
    inner: Arc<Mutex<HashMap<&'static str, HashMap<String, IpEntry>>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the request is allowed, `false` if rate-limited.
    pub async fn check(
        &self,
        route: &'static str,
        ip: &str,
        max_requests: u32,
        window_secs: u64,
    ) -> bool {
        let mut map = self.inner.lock().await;
        let route_map = map.entry(route).or_default();
        let now = Instant::now();

        let entry = route_map.entry(ip.to_owned()).or_insert_with(|| IpEntry {
            count: 0,
            window_start: now,
        });

        // Reset window if expired
        if now.duration_since(entry.window_start).as_secs() >= window_secs {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;
        entry.count <= max_requests
    }

    /// Remove entries whose window started more than `max_age_secs` ago
    pub async fn cleanup(&self, max_age_secs: u64) {
        let mut map = self.inner.lock().await;
        let cutoff = std::time::Duration::from_secs(max_age_secs);
        let now = Instant::now();

        for route_map in map.values_mut() {
            route_map.retain(|_, entry| now.duration_since(entry.window_start) < cutoff);
        }

        // Remove empty route maps
        map.retain(|_, route_map| !route_map.is_empty());
    }
}

/// Client IP for rate limiting
///
/// The peer address (`ConnectInfo`) by default. With `trust_forwarded` set,
/// the first `X-Forwarded-For` entry wins; only enable that behind a proxy
/// that overwrites the header, since clients can put anything there.
pub fn extract_ip(request: &Request, trust_forwarded: bool) -> String {
    if trust_forwarded
        && let Some(forwarded) = request.headers().get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
    {
        // X-Forwarded-For can be comma-separated; first entry is the original client
        if let Some(first) = val.split(',').next() {
            let ip = first.trim();
            if !ip.is_empty() {
                return ip.to_owned();
            }
        }
    }

    request
        .extensions()
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

/// Rate limit middleware for login submissions
pub async fn login_rate_limit(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if request.method() != http::Method::POST {
        return Ok(next.run(request).await);
    }

    let ip = extract_ip(&request, state.config.trust_forwarded_for);
    let allowed = state
        .rate_limiter
        .check(
            "login",
            &ip,
            state.config.login_rate_limit,
            state.config.login_rate_window_secs,
        )
        .await;
    if !allowed {
        security_log!("WARN", "login_rate_limited", ip = ip.as_str());
        return Err(AppError::with_message(
            ErrorCode::TooManyAttempts,
            "Too many login attempts, try again later.",
        ));
    }
    Ok(next.run(request).await)
}

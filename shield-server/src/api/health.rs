//! Health check
//!
//! `GET /health` (public) returns service status with a database ping:
//!
//! ```json
//! { "code": 0, "message": "OK", "data": { "status": "ok", "version": "0.1.0", "database": "ok" } }
//! ```

use axum::{
    Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;

use crate::core::ServerState;
use crate::db::DbService;
use shared::error::ApiResponse;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    database: &'static str,
}

async fn health(State(state): State<ServerState>) -> Response {
    match DbService::ping(&state.pool).await {
        Ok(()) => ApiResponse::success(HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            database: "ok",
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            ApiResponse::<()>::error(&e).into_response()
        }
    }
}

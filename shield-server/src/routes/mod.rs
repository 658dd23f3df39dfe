use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::api;
use crate::auth::{require_auth, session_layer};
use crate::core::ServerState;
use crate::middleware;

/// Request ID generator (UUID v4)
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Build a router with all routes registered (no outer middleware, no state)
///
/// Admin routes sit behind [`require_auth`] as a route layer, so anonymous
/// requests are redirected before any handler or body extractor runs.
pub fn build_router(state: &ServerState) -> Router<ServerState> {
    let protected = Router::new()
        .merge(api::admin::router())
        .merge(api::shields::router())
        .merge(api::files::protected_router())
        .route_layer(axum_middleware::from_fn(require_auth));

    Router::new()
        .merge(protected)
        // Public routes
        .merge(api::auth::router(state))
        .merge(api::public::router())
        .merge(api::files::public_router())
        .merge(api::health::router())
}

/// Build a fully configured application with all middleware
///
/// Used by the HTTP server and by tests (`oneshot`)
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    build_router(state)
        // Body limit for multipart uploads
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        // Session - resolves the cookie and injects `Session`
        .layer(axum_middleware::from_fn_with_state(state.clone(), session_layer))
        // Compression - Gzip compress responses
        .layer(CompressionLayer::new())
        // Request logging
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        // Trace - Request tracing
        .layer(TraceLayer::new_for_http())
        // Propagate request ID to response
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
        // Request ID - outermost, so every inner layer sees it
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            XRequestId,
        ))
}

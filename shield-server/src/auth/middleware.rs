//! Session and authentication middleware

use axum::{
    extract::{Request, State},
    http::header::SET_COOKIE,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use http::HeaderValue;

use super::session::{SESSION_COOKIE, Session, cookie_value};
use crate::core::ServerState;
use crate::security_log;

/// Resolve the request's session and inject it as an extension
///
/// Emits `Set-Cookie` when the session was created or rotated while handling
/// the request.
pub async fn session_layer(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Response {
    let cookie = cookie_value(req.headers(), SESSION_COOKIE);
    let session = state.sessions.resolve(cookie.as_deref());
    req.extensions_mut().insert(session.clone());

    let mut response = next.run(req).await;

    if let Some(cookie) = session.set_cookie_header(state.config.is_production()) {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::error!(error = %e, "Session cookie is not a valid header value"),
        }
    }
    response
}

/// Authentication gate for admin routes
///
/// Anonymous requests are redirected (303) to `/login` before the handler
/// runs, so no body is read and nothing is written.
pub async fn require_auth(req: Request, next: Next) -> Response {
    let authenticated = req
        .extensions()
        .get::<Session>()
        .is_some_and(|s| s.is_authenticated());

    if !authenticated {
        security_log!(
            "WARN",
            "auth_required",
            method = req.method().as_str(),
            path = req.uri().path()
        );
        return Redirect::to("/login").into_response();
    }

    next.run(req).await
}

//! Shared extractors

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::core::ServerState;
use crate::utils::{AppError, ErrorCode};

/// Record id from the `{id}` path segment
///
/// A non-numeric id is answered like an unknown one: 404 page.
#[derive(Debug, Clone, Copy)]
pub struct ShieldId(pub i64);

impl FromRequestParts<ServerState> for ShieldId {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        match Path::<i64>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(Self(id)),
            Err(rejection) => Err(AppError::new(ErrorCode::NotFound)
                .with_detail("reason", rejection.body_text())),
        }
    }
}

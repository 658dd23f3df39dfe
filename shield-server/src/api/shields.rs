//! Record actions
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /toggle_paid/{id} | GET | yes |
//! | /delete_shield/{id} | POST | yes |

use axum::{
    Extension, Router,
    extract::State,
    response::Redirect,
    routing::{get, post},
};

use crate::auth::{FlashLevel, Session};
use super::extract::ShieldId;
use crate::core::ServerState;
use crate::db::repository::shield;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/toggle_paid/{id}", get(toggle_paid))
        .route("/delete_shield/{id}", post(delete_shield))
}

async fn toggle_paid(
    State(state): State<ServerState>,
    Extension(session): Extension<Session>,
    ShieldId(id): ShieldId,
) -> AppResult<Redirect> {
    let updated = shield::toggle_paid(&state.pool, id).await?;

    tracing::info!(shield_id = id, paid = updated.paid, "Payment status toggled");
    let status = if updated.paid { "paid" } else { "unpaid" };
    session.flash(FlashLevel::Success, format!("Status changed to {status}!"));

    Ok(Redirect::to("/admin"))
}

/// Delete the record, then its QR image and stored photo (best effort)
async fn delete_shield(
    State(state): State<ServerState>,
    Extension(session): Extension<Session>,
    ShieldId(id): ShieldId,
) -> AppResult<Redirect> {
    let removed = shield::delete(&state.pool, id).await?;
    tracing::info!(shield_id = id, "Shield deleted");

    if let Err(e) = state.qr.remove(id) {
        tracing::warn!(shield_id = id, error = %e, "QR image not removed");
    }
    if let Some(reference) = removed.photo_url.as_deref()
        && let Err(e) = state.storage.remove(reference).await
    {
        tracing::warn!(shield_id = id, photo = %reference, error = %e, "Photo not removed");
    }

    session.flash(FlashLevel::Success, "Shield deleted!");
    Ok(Redirect::to("/admin"))
}

//! Public record page (target of the QR codes)

use axum::{
    Router,
    extract::State,
    response::Html,
    routing::get,
};

use super::extract::ShieldId;
use crate::core::ServerState;
use crate::db::repository::shield;
use crate::utils::AppResult;
use crate::views;

pub fn router() -> Router<ServerState> {
    Router::new().route("/public/{id}", get(public_shield))
}

async fn public_shield(
    State(state): State<ServerState>,
    ShieldId(id): ShieldId,
) -> AppResult<Html<String>> {
    let shield = shield::get(&state.pool, id).await?;
    Ok(Html(views::public_page(&shield)))
}

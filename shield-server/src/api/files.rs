//! File serving
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /download_qr/{id} | GET | yes |
//! | /static/qrcodes/{filename} | GET | yes |
//! | /static/photos/{filename} | GET | no |

use axum::{
    Router,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use std::path::Path as FsPath;

use super::extract::ShieldId;
use crate::core::ServerState;
use crate::qr::qr_filename;
use crate::security_log;
use crate::utils::validation::is_safe_filename;
use crate::utils::{AppError, AppResult, ErrorCode};

/// Routes that need an authenticated session
pub fn protected_router() -> Router<ServerState> {
    Router::new()
        .route("/download_qr/{id}", get(download_qr))
        .route("/static/qrcodes/{filename}", get(serve_qr))
}

/// Routes open to everyone
pub fn public_router() -> Router<ServerState> {
    Router::new().route("/static/photos/{filename}", get(serve_photo))
}

async fn read_file(path: &FsPath) -> AppResult<Vec<u8>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::new(
            ErrorCode::FileNotFound,
        )
        .with_detail("path", path.display().to_string())),
        Err(e) => Err(AppError::internal(format!(
            "Failed to read {}: {e}",
            path.display()
        ))),
    }
}

fn checked_filename(filename: &str) -> AppResult<()> {
    if is_safe_filename(filename) {
        return Ok(());
    }
    security_log!("WARN", "unsafe_filename", filename = filename);
    Err(AppError::invalid_request("Invalid filename"))
}

fn file_response(filename: &str, bytes: Vec<u8>) -> Response {
    let mime = mime_guess::from_path(filename).first_or_octet_stream();
    ([(header::CONTENT_TYPE, mime.to_string())], bytes).into_response()
}

async fn download_qr(
    State(state): State<ServerState>,
    ShieldId(id): ShieldId,
) -> AppResult<Response> {
    let bytes = read_file(&state.qr.path_for(id)).await?;
    let disposition = format!("attachment; filename=\"{}\"", qr_filename(id));
    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

async fn serve_qr(
    State(state): State<ServerState>,
    Path(filename): Path<String>,
) -> AppResult<Response> {
    checked_filename(&filename)?;
    let bytes = read_file(&state.qr.dir().join(&filename)).await?;
    Ok(file_response(&filename, bytes))
}

async fn serve_photo(
    State(state): State<ServerState>,
    Path(filename): Path<String>,
) -> AppResult<Response> {
    let Some(dir) = state.storage.local_dir() else {
        return Err(AppError::new(ErrorCode::FileNotFound));
    };
    checked_filename(&filename)?;
    let bytes = read_file(&dir.join(&filename)).await?;
    Ok(file_response(&filename, bytes))
}

//! Admin dashboard: list and create
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /admin | GET | yes |
//! | /admin | POST (multipart) | yes |

use axum::{
    Extension, Router,
    extract::{Multipart, Query, State, multipart::MultipartError},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;

use crate::auth::{FlashLevel, Session};
use crate::core::ServerState;
use crate::db::repository::shield;
use crate::storage::{PhotoUpload, StorageError};
use crate::utils::validation::ShieldForm;
use crate::utils::{AppError, AppResult, ErrorCode};
use crate::views::{self, AdminView};
use shared::models::{PAGE_SIZE, SortDirection, SortField};

pub fn router() -> Router<ServerState> {
    Router::new().route("/admin", get(list).post(create))
}

/// Query string of the list page; every field is optional and parsed leniently
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
}

impl ListParams {
    pub fn page(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .unwrap_or(1)
            .max(1)
    }

    pub fn sort(&self) -> SortField {
        self.sort.as_deref().map(SortField::from_param).unwrap_or_default()
    }

    pub fn dir(&self) -> SortDirection {
        self.dir.as_deref().map(SortDirection::from_param).unwrap_or_default()
    }
}

async fn list(
    State(state): State<ServerState>,
    Extension(session): Extension<Session>,
    Query(params): Query<ListParams>,
) -> AppResult<Html<String>> {
    let (sort, dir) = (params.sort(), params.dir());
    let page = shield::list(&state.pool, sort, dir, params.page(), PAGE_SIZE).await?;
    let flashes = session.take_flashes();

    Ok(Html(views::admin_page(&AdminView {
        page: &page,
        sort,
        dir,
        flashes: &flashes,
    })))
}

/// Submitted multipart fields
#[derive(Debug, Default)]
struct CreateSubmission {
    form: ShieldForm,
    photo_name: String,
    photo_bytes: Vec<u8>,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::new(ErrorCode::FileTooLarge)
    } else {
        AppError::invalid_request(format!("Invalid multipart request: {e}"))
    }
}

async fn read_submission(multipart: &mut Multipart) -> AppResult<CreateSubmission> {
    let mut submission = CreateSubmission::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "street" => submission.form.street = field.text().await.map_err(multipart_error)?,
            "client" => submission.form.client = field.text().await.map_err(multipart_error)?,
            "amount" => submission.form.amount = field.text().await.map_err(multipart_error)?,
            "photo" => {
                submission.photo_name = field.file_name().unwrap_or_default().to_string();
                submission.photo_bytes = field.bytes().await.map_err(multipart_error)?.to_vec();
            }
            _ => {}
        }
    }

    Ok(submission)
}

fn back_to_admin() -> Response {
    Redirect::to("/admin").into_response()
}

async fn create(
    State(state): State<ServerState>,
    Extension(session): Extension<Session>,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let submission = read_submission(&mut multipart).await?;

    let mut data = match submission.form.validate() {
        Ok(data) => data,
        Err(e) => {
            session.flash(FlashLevel::Danger, e.public_message());
            return Ok(back_to_admin());
        }
    };

    let photo = match PhotoUpload::from_part(&submission.photo_name, submission.photo_bytes) {
        Ok(photo) => photo,
        Err(e) => {
            tracing::info!(filename = %submission.photo_name, error = %e, "Photo rejected");
            session.flash(FlashLevel::Danger, AppError::from(e).public_message());
            return Ok(back_to_admin());
        }
    };

    if let Some(photo) = photo {
        match state.storage.upload(photo).await {
            Ok(reference) => data.photo_url = Some(reference),
            Err(e @ StorageError::Io(_)) => return Err(e.into()),
            Err(e) => {
                tracing::warn!(error = %e, "Photo storage failed, shield not created");
                session.flash(FlashLevel::Danger, AppError::from(e).public_message());
                return Ok(back_to_admin());
            }
        }
    }

    let stored_photo = data.photo_url.clone();
    let created = match shield::create(&state.pool, data).await {
        Ok(created) => created,
        Err(e) => {
            if let Some(reference) = stored_photo
                && let Err(cleanup) = state.storage.remove(&reference).await
            {
                tracing::warn!(photo = %reference, error = %cleanup, "Orphaned photo not removed");
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        shield_id = created.id,
        street = %created.street,
        client = %created.client,
        amount = created.amount,
        "Shield created"
    );
    session.flash(FlashLevel::Success, "Shield added successfully!");

    // The record stays even if the QR image cannot be written
    if let Err(e) = state.qr.generate(created.id) {
        tracing::error!(shield_id = created.id, error = %e, "QR generation failed");
        session.flash(
            FlashLevel::Warning,
            format!("QR code for shield #{} could not be generated.", created.id),
        );
    }

    Ok(back_to_admin())
}

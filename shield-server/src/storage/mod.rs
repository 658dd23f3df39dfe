//! Photo storage
//!
//! One interface, two backends selected by configuration:
//! - [`LocalPhotoStorage`] writes files under a directory and returns the filename
//! - [`HostedPhotoStorage`] uploads to a Cloudinary-style image host and
//!   returns the issued URL

mod hosted;
mod local;

pub use hosted::{HostedPhotoStorage, sign_params};
pub use local::LocalPhotoStorage;

use async_trait::async_trait;
use shared::error::{AppError, ErrorCode};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Accepted photo extensions (lower-case)
pub const SUPPORTED_FORMATS: &[&str] = &["jpg", "jpeg", "png"];

/// Storage error types
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Unsupported file format '{0}'")]
    UnsupportedFormat(String),

    #[error("Empty file provided")]
    EmptyFile,

    #[error("Invalid image file: {0}")]
    InvalidImage(String),

    #[error("{0}")]
    Upload(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UnsupportedFormat(ext) => {
                AppError::new(ErrorCode::UnsupportedFileFormat).with_detail("extension", ext)
            }
            StorageError::EmptyFile => AppError::new(ErrorCode::EmptyFile),
            StorageError::InvalidImage(msg) => {
                AppError::new(ErrorCode::InvalidImageFile).with_detail("reason", msg)
            }
            StorageError::Upload(msg) => AppError::upload_failed(msg),
            StorageError::Io(e) => AppError::internal(format!("Photo storage I/O error: {e}")),
        }
    }
}

/// A validated photo ready to be stored
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    /// Original client filename
    pub filename: String,
    /// Lower-cased extension from [`SUPPORTED_FORMATS`]
    pub extension: String,
    pub bytes: Vec<u8>,
}

impl PhotoUpload {
    /// Validate a submitted file part
    ///
    /// Returns `Ok(None)` for a part without a filename, whatever its
    /// content; the photo is optional. Otherwise the extension must be supported and the content
    /// must sniff as PNG or JPEG.
    pub fn from_part(filename: &str, bytes: Vec<u8>) -> Result<Option<Self>, StorageError> {
        if filename.is_empty() {
            return Ok(None);
        }

        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .unwrap_or_default();
        if !SUPPORTED_FORMATS.contains(&extension.as_str()) {
            return Err(StorageError::UnsupportedFormat(extension));
        }

        if bytes.is_empty() {
            return Err(StorageError::EmptyFile);
        }

        // Verify it's actually an image of an accepted kind
        match image::guess_format(&bytes) {
            Ok(image::ImageFormat::Png) | Ok(image::ImageFormat::Jpeg) => {}
            Ok(other) => {
                return Err(StorageError::InvalidImage(format!(
                    "content is {other:?}, expected PNG or JPEG"
                )));
            }
            Err(e) => return Err(StorageError::InvalidImage(e.to_string())),
        }

        Ok(Some(Self {
            filename: filename.to_string(),
            extension,
            bytes,
        }))
    }

    /// MIME type matching the extension
    pub fn content_type(&self) -> &'static str {
        match self.extension.as_str() {
            "png" => "image/png",
            _ => "image/jpeg",
        }
    }
}

/// Photo storage backend
#[async_trait]
pub trait PhotoStorage: Send + Sync {
    /// Store the photo and return the reference saved on the record
    async fn upload(&self, photo: PhotoUpload) -> Result<String, StorageError>;

    /// Remove a previously stored photo (missing files are not an error)
    async fn remove(&self, reference: &str) -> Result<(), StorageError>;

    /// Directory served under `/static/photos`, if photos live on disk
    fn local_dir(&self) -> Option<&Path>;
}

/// Build the backend selected by `config`
pub fn from_config(
    config: &crate::core::Config,
) -> Result<std::sync::Arc<dyn PhotoStorage>, AppError> {
    use crate::core::config::PhotoStorageKind;

    match config.photo_storage {
        PhotoStorageKind::Local => Ok(std::sync::Arc::new(LocalPhotoStorage::new(
            PathBuf::from(&config.photos_dir),
        ))),
        PhotoStorageKind::Hosted => {
            let hosted = config.cloudinary.clone().ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::ConfigError,
                    "PHOTO_STORAGE=hosted requires CLOUDINARY_* settings",
                )
            })?;
            Ok(std::sync::Arc::new(HostedPhotoStorage::new(hosted)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F'];
    const GIF_MAGIC: &[u8] = b"GIF89a\x01\x00\x01\x00";

    #[test]
    fn test_no_file_is_not_an_error() {
        assert!(PhotoUpload::from_part("", Vec::new()).unwrap().is_none());
        // A nameless part is ignored even when it carries bytes
        assert!(PhotoUpload::from_part("", b"xx".to_vec()).unwrap().is_none());
    }

    #[test]
    fn test_extension_checked_case_insensitive() {
        let photo = PhotoUpload::from_part("Front.JPG", JPEG_MAGIC.to_vec())
            .unwrap()
            .unwrap();
        assert_eq!(photo.extension, "jpg");
        assert_eq!(photo.content_type(), "image/jpeg");

        let photo = PhotoUpload::from_part("front.png", PNG_MAGIC.to_vec())
            .unwrap()
            .unwrap();
        assert_eq!(photo.content_type(), "image/png");
    }

    #[test]
    fn test_gif_rejected() {
        let err = PhotoUpload::from_part("photo.gif", GIF_MAGIC.to_vec()).unwrap_err();
        assert!(matches!(err, StorageError::UnsupportedFormat(ref ext) if ext == "gif"));

        let app: AppError = err.into();
        assert_eq!(app.message, "Only JPG and PNG images are allowed.");
    }

    #[test]
    fn test_missing_extension_rejected() {
        let err = PhotoUpload::from_part("photo", PNG_MAGIC.to_vec()).unwrap_err();
        assert!(matches!(err, StorageError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_content_must_match() {
        let err = PhotoUpload::from_part("photo.png", GIF_MAGIC.to_vec()).unwrap_err();
        assert!(matches!(err, StorageError::InvalidImage(_)));

        let err = PhotoUpload::from_part("photo.png", b"not an image".to_vec()).unwrap_err();
        assert!(matches!(err, StorageError::InvalidImage(_)));

        let err = PhotoUpload::from_part("photo.png", Vec::new()).unwrap_err();
        assert!(matches!(err, StorageError::EmptyFile));
    }
}

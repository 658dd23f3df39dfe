//! Hosted photo storage (Cloudinary-style signed upload API)

use super::{PhotoStorage, PhotoUpload, StorageError};
use crate::core::config::CloudinaryConfig;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Folder all shield photos are uploaded into
pub const UPLOAD_FOLDER: &str = "shields";

/// Uploads photos to the image host and returns the issued `secure_url`
#[derive(Debug, Clone)]
pub struct HostedPhotoStorage {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

impl HostedPhotoStorage {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/{}/image/upload",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name
        )
    }
}

/// Signature over the sorted signed parameters followed by the API secret
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<_> = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// The host's `error.message`, or the bare status when the body has none
fn rejection_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| format!("Image host returned {status}"))
}

#[async_trait]
impl PhotoStorage for HostedPhotoStorage {
    async fn upload(&self, photo: PhotoUpload) -> Result<String, StorageError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[("folder", UPLOAD_FOLDER), ("timestamp", &timestamp)],
            &self.config.api_secret,
        );

        let size = photo.bytes.len();
        let content_type = photo.content_type();
        let file = reqwest::multipart::Part::bytes(photo.bytes)
            .file_name(photo.filename.clone())
            .mime_str(content_type)
            .map_err(|e| StorageError::Upload(format!("Invalid content type: {e}")))?;

        let form = reqwest::multipart::Form::new()
            .part("file", file)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", UPLOAD_FOLDER)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let resp = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| StorageError::Upload(format!("Image host unreachable: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            // Error bodies are not always JSON (proxy pages, gateway errors)
            let body = resp.text().await.unwrap_or_default();
            let message = rejection_message(status, &body);
            tracing::warn!(status = %status, message = %message, "Photo upload rejected");
            return Err(StorageError::Upload(message));
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| StorageError::Upload(format!("Malformed image host response: {e}")))?;

        let url = body["secure_url"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| StorageError::Upload("Image host response has no secure_url".into()))?;

        tracing::info!(original_name = %photo.filename, size, url = %url, "Photo uploaded to image host");
        Ok(url)
    }

    async fn remove(&self, reference: &str) -> Result<(), StorageError> {
        // Hosted photos are kept on the image host
        tracing::debug!(reference = %reference, "Skipping removal of hosted photo");
        Ok(())
    }

    fn local_dir(&self) -> Option<&Path> {
        None
    }
}

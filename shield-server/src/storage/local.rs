//! Local disk photo storage

use super::{PhotoStorage, PhotoUpload, StorageError};
use crate::utils::validation::is_safe_filename;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Writes photos to `{dir}/shield_{YYYYmmdd_HHMMSS_mmm}.{ext}`
#[derive(Debug, Clone)]
pub struct LocalPhotoStorage {
    dir: PathBuf,
}

impl LocalPhotoStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn stamp() -> String {
        chrono::Utc::now().format("%Y%m%d_%H%M%S_%3f").to_string()
    }
}

#[async_trait]
impl PhotoStorage for LocalPhotoStorage {
    async fn upload(&self, photo: PhotoUpload) -> Result<String, StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let stamp = Self::stamp();
        let mut attempt = 0u32;
        loop {
            let filename = if attempt == 0 {
                format!("shield_{stamp}.{}", photo.extension)
            } else {
                format!("shield_{stamp}_{attempt}.{}", photo.extension)
            };
            let path = self.dir.join(&filename);

            // create_new: two uploads in the same millisecond must not clobber each other
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    use tokio::io::AsyncWriteExt;
                    file.write_all(&photo.bytes).await?;
                    file.flush().await?;
                    tracing::info!(
                        original_name = %photo.filename,
                        stored_as = %filename,
                        size = photo.bytes.len(),
                        "Photo stored locally"
                    );
                    return Ok(filename);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && attempt < 16 => {
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn remove(&self, reference: &str) -> Result<(), StorageError> {
        if !is_safe_filename(reference) {
            tracing::warn!(reference = %reference, "Refusing to remove photo outside storage dir");
            return Ok(());
        }
        match tokio::fs::remove_file(self.dir.join(reference)).await {
            Ok(()) => {
                tracing::info!(file = %reference, "Photo removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn local_dir(&self) -> Option<&Path> {
        Some(&self.dir)
    }
}

//! QR code generation
//!
//! Each record gets `shield_{id}.png` in the QR directory, encoding the
//! public page URL `{base}/public/{id}`.

use image::{GrayImage, ImageFormat, Luma};
use qrcode::{Color, EcLevel, QrCode};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Pixels per module
pub const BOX_SIZE: u32 = 10;

/// Quiet zone width in modules
pub const BORDER: u32 = 5;

/// QR error types
#[derive(Debug, Error)]
pub enum QrError {
    #[error("QR encoding failed: {0}")]
    Encode(#[from] qrcode::types::QrError),

    #[error("QR image write failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Public page URL for a record; trailing slashes on `base` are dropped
pub fn qr_url(base: &str, id: i64) -> String {
    format!("{}/public/{id}", base.trim_end_matches('/'))
}

/// Filename of a record's QR image
pub fn qr_filename(id: i64) -> String {
    format!("shield_{id}.png")
}

/// Renders QR images into a directory
#[derive(Debug, Clone)]
pub struct QrGenerator {
    dir: PathBuf,
    base_url: String,
}

impl QrGenerator {
    pub fn new(dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            base_url: base_url.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn url_for(&self, id: i64) -> String {
        qr_url(&self.base_url, id)
    }

    pub fn path_for(&self, id: i64) -> PathBuf {
        self.dir.join(qr_filename(id))
    }

    /// Encode the record URL and write the PNG, replacing any previous file
    pub fn generate(&self, id: i64) -> Result<PathBuf, QrError> {
        let url = self.url_for(id);
        let img = render(&url)?;

        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(id);
        img.save_with_format(&path, ImageFormat::Png)?;

        tracing::info!(shield_id = id, url = %url, path = %path.display(), "QR code generated");
        Ok(path)
    }

    /// Delete the record's QR image if present
    pub fn remove(&self, id: i64) -> Result<(), QrError> {
        match std::fs::remove_file(self.path_for(id)) {
            Ok(()) => {
                tracing::info!(shield_id = id, "QR code removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Smallest symbol that fits at level M, black modules on white
pub fn render(data: &str) -> Result<GrayImage, QrError> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::M)?;
    let modules = code.width() as u32;
    let colors = code.to_colors();

    let side = (modules + 2 * BORDER) * BOX_SIZE;
    let mut img = GrayImage::from_pixel(side, side, Luma([255u8]));

    for (i, color) in colors.iter().enumerate() {
        if *color != Color::Dark {
            continue;
        }
        let mx = i as u32 % modules;
        let my = i as u32 / modules;
        let x0 = (mx + BORDER) * BOX_SIZE;
        let y0 = (my + BORDER) * BOX_SIZE;
        for y in y0..y0 + BOX_SIZE {
            for x in x0..x0 + BOX_SIZE {
                img.put_pixel(x, y, Luma([0u8]));
            }
        }
    }

    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qr_url() {
        assert_eq!(qr_url("https://example.com", 7), "https://example.com/public/7");
        assert_eq!(qr_url("https://example.com//", 7), "https://example.com/public/7");
    }

    #[test]
    fn test_render_dimensions() {
        let url = "https://example.com/public/7";
        let img = render(url).unwrap();
        let modules = QrCode::with_error_correction_level(url, EcLevel::M)
            .unwrap()
            .width() as u32;
        assert!(modules >= 21);
        let expected = (modules + 2 * BORDER) * BOX_SIZE;
        assert_eq!(img.width(), expected);
        assert_eq!(img.height(), expected);

        // Quiet zone is white, finder pattern corner is black
        assert_eq!(img.get_pixel(0, 0), &Luma([255u8]));
        let corner = BORDER * BOX_SIZE;
        assert_eq!(img.get_pixel(corner, corner), &Luma([0u8]));
    }

    #[test]
    fn test_generate_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let qr = QrGenerator::new(dir.path().join("qrcodes"), "https://example.com/");

        let path = qr.generate(7).unwrap();
        assert_eq!(path.file_name().unwrap(), "shield_7.png");
        let decoded = image::open(&path).unwrap();
        let rendered = render(&qr.url_for(7)).unwrap();
        assert_eq!(decoded.width(), rendered.width());

        // Regenerating overwrites in place
        qr.generate(7).unwrap();

        qr.remove(7).unwrap();
        assert!(!path.exists());
        qr.remove(7).unwrap();
    }
}

//! Server configuration
//!
//! # Environment variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | ENVIRONMENT | development | development \| staging \| production |
//! | HTTP_HOST | 0.0.0.0 | bind host |
//! | HTTP_PORT | 8080 | bind port |
//! | SECRET_KEY | dev placeholder | session cookie signing key |
//! | DATABASE_URL | sqlite:shields.db | SQLite connection string |
//! | ADMIN_PASSWORD | dev placeholder | admin secret |
//! | ADMIN_PASSWORD_HASH | - | Argon2 PHC hash, takes precedence |
//! | PUBLIC_BASE_URL | http://localhost:8080 | base of QR links |
//! | PHOTO_STORAGE | local | local \| hosted |
//! | PHOTOS_DIR | static/photos | local photo directory |
//! | QRCODES_DIR | static/qrcodes | QR image directory |
//! | CLOUDINARY_CLOUD_NAME / _API_KEY / _API_SECRET | - | hosted storage credentials |
//! | CLOUDINARY_API_BASE | https://api.cloudinary.com/v1_1 | image host API base |
//! | SESSION_TTL_SECS | 86400 | idle session lifetime |
//! | MAX_UPLOAD_BYTES | 16777216 | request body limit |
//! | LOGIN_RATE_LIMIT | 5 | login attempts per window per IP |
//! | LOGIN_RATE_WINDOW_SECS | 60 | login rate window |
//! | TRUST_FORWARDED_FOR | false | key the login limit on `X-Forwarded-For` (only behind a proxy) |
//! | LOG_LEVEL | info | log level |
//! | LOG_DIR | - | daily rolling log directory |
//! | LOG_JSON | false | JSON log lines |
//!
//! Outside `development`, secrets must be set and non-empty.

use shared::error::{AppError, AppResult, ErrorCode};
use std::path::{Path, PathBuf};

/// Where uploaded photos go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoStorageKind {
    Local,
    Hosted,
}

impl std::str::FromStr for PhotoStorageKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "hosted" | "cloudinary" => Ok(Self::Hosted),
            other => Err(config_error(format!(
                "PHOTO_STORAGE must be 'local' or 'hosted', got '{other}'"
            ))),
        }
    }
}

/// Image host credentials
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// API base, e.g. `https://api.cloudinary.com/v1_1`
    pub api_base: String,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    pub http_host: String,
    pub http_port: u16,
    /// Session cookie signing key
    pub secret_key: String,
    pub database_url: String,
    /// Plaintext admin secret (ignored when a hash is configured)
    pub admin_password: Option<String>,
    /// Argon2 PHC string for the admin secret
    pub admin_password_hash: Option<String>,
    /// Base of the public links encoded in QR codes
    pub public_base_url: String,
    pub photo_storage: PhotoStorageKind,
    pub photos_dir: PathBuf,
    pub qrcodes_dir: PathBuf,
    /// Required when `photo_storage` is hosted
    pub cloudinary: Option<CloudinaryConfig>,
    pub session_ttl_secs: u64,
    pub max_upload_bytes: usize,
    pub login_rate_limit: u32,
    pub login_rate_window_secs: u64,
    /// Take the client IP from `X-Forwarded-For` instead of the peer address
    pub trust_forwarded_for: bool,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub log_json: bool,
}

fn config_error(msg: impl Into<String>) -> AppError {
    AppError::with_message(ErrorCode::ConfigError, msg)
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.into())
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Read a secret; outside development it must be present and non-empty
    fn require_secret(name: &str, environment: &str) -> AppResult<String> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(config_error(format!(
                        "{name} must be set in {environment} environment"
                    )));
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(config_error(format!(
                "{name} must not be empty in {environment} environment"
            )));
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        let environment = env_or("ENVIRONMENT", "development");

        let admin_password_hash = env_opt("ADMIN_PASSWORD_HASH");
        let admin_password = if admin_password_hash.is_some() {
            env_opt("ADMIN_PASSWORD")
        } else {
            Some(Self::require_secret("ADMIN_PASSWORD", &environment)?)
        };

        let photo_storage: PhotoStorageKind = env_or("PHOTO_STORAGE", "local").parse()?;
        let cloudinary = match photo_storage {
            PhotoStorageKind::Local => None,
            PhotoStorageKind::Hosted => {
                let required = |name: &str| {
                    env_opt(name).ok_or_else(|| {
                        config_error(format!("{name} must be set when PHOTO_STORAGE=hosted"))
                    })
                };
                Some(CloudinaryConfig {
                    cloud_name: required("CLOUDINARY_CLOUD_NAME")?,
                    api_key: required("CLOUDINARY_API_KEY")?,
                    api_secret: required("CLOUDINARY_API_SECRET")?,
                    api_base: env_or("CLOUDINARY_API_BASE", "https://api.cloudinary.com/v1_1"),
                })
            }
        };

        Ok(Self {
            http_host: env_or("HTTP_HOST", "0.0.0.0"),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            secret_key: Self::require_secret("SECRET_KEY", &environment)?,
            database_url: env_or("DATABASE_URL", "sqlite:shields.db"),
            admin_password,
            admin_password_hash,
            public_base_url: env_or("PUBLIC_BASE_URL", "http://localhost:8080"),
            photo_storage,
            photos_dir: PathBuf::from(env_or("PHOTOS_DIR", "static/photos")),
            qrcodes_dir: PathBuf::from(env_or("QRCODES_DIR", "static/qrcodes")),
            cloudinary,
            session_ttl_secs: std::env::var("SESSION_TTL_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(86_400),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(16 * 1024 * 1024),
            login_rate_limit: std::env::var("LOGIN_RATE_LIMIT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5),
            login_rate_window_secs: std::env::var("LOGIN_RATE_WINDOW_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(60),
            trust_forwarded_for: std::env::var("TRUST_FORWARDED_FOR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_level: env_or("LOG_LEVEL", "info"),
            log_dir: env_opt("LOG_DIR"),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            environment,
        })
    }

    /// Development configuration rooted at `root`, without reading the environment
    ///
    /// Local photo storage, in-tree photo/QR directories, admin secret `admin`.
    /// Used by tests.
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            environment: "development".into(),
            http_host: "127.0.0.1".into(),
            http_port: 0,
            secret_key: "dev-SECRET_KEY-not-for-production".into(),
            database_url: "sqlite::memory:".into(),
            admin_password: Some("admin".into()),
            admin_password_hash: None,
            public_base_url: "http://localhost:8080".into(),
            photo_storage: PhotoStorageKind::Local,
            photos_dir: root.join("photos"),
            qrcodes_dir: root.join("qrcodes"),
            cloudinary: None,
            session_ttl_secs: 86_400,
            max_upload_bytes: 16 * 1024 * 1024,
            login_rate_limit: 5,
            login_rate_window_secs: 60,
            trust_forwarded_for: false,
            log_level: "info".into(),
            log_dir: None,
            log_json: false,
        }
    }

    /// Socket address string to bind
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

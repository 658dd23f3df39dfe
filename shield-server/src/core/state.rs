use std::sync::Arc;
use std::time::Duration;

use shared::error::{AppError, AppResult};
use sqlx::SqlitePool;

use crate::auth::{AdminCredential, RateLimiter, SessionStore};
use crate::core::Config;
use crate::core::config::PhotoStorageKind;
use crate::db::DbService;
use crate::qr::QrGenerator;
use crate::storage::{self, PhotoStorage};

/// Interval of the session / rate-limiter housekeeping task
const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Server state - shared references to every service
///
/// Cloning is cheap (pool handles and `Arc`s).
///
/// | Field | Purpose |
/// |-------|---------|
/// | config | immutable configuration |
/// | pool | SQLite pool |
/// | storage | photo storage backend |
/// | qr | QR image generator |
/// | sessions | admin sessions |
/// | credential | admin secret |
/// | rate_limiter | login throttling |
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub pool: SqlitePool,
    pub storage: Arc<dyn PhotoStorage>,
    pub qr: QrGenerator,
    pub sessions: SessionStore,
    pub credential: AdminCredential,
    pub rate_limiter: RateLimiter,
}

impl ServerState {
    /// Assemble state from already-opened parts
    ///
    /// Usually [`initialize()`](Self::initialize) is used instead; tests pass
    /// an in-memory pool and their own storage backend here.
    pub fn new(config: Config, pool: SqlitePool, storage: Arc<dyn PhotoStorage>) -> AppResult<Self> {
        let sessions = SessionStore::new(
            &config.secret_key,
            Duration::from_secs(config.session_ttl_secs),
        )?;
        let credential = AdminCredential::new(
            config.admin_password.clone(),
            config.admin_password_hash.clone(),
        );
        let qr = QrGenerator::new(&config.qrcodes_dir, &config.public_base_url);

        Ok(Self {
            config: Arc::new(config),
            pool,
            storage,
            qr,
            sessions,
            credential,
            rate_limiter: RateLimiter::new(),
        })
    }

    /// Create directories, open the database and pick the storage backend
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        if config.photo_storage == PhotoStorageKind::Local {
            create_dir(&config.photos_dir)?;
        }
        create_dir(&config.qrcodes_dir)?;

        let db = DbService::new(&config.database_url).await?;
        let storage = storage::from_config(config)?;

        tracing::info!(
            environment = %config.environment,
            photo_storage = ?config.photo_storage,
            public_base_url = %config.public_base_url,
            "Server state initialized"
        );

        Self::new(config.clone(), db.pool, storage)
    }

    /// Periodically purge expired sessions and stale rate-limiter entries
    pub fn start_background_tasks(&self) {
        let sessions = self.sessions.clone();
        let rate_limiter = self.rate_limiter.clone();
        let window = self.config.login_rate_window_secs;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
            loop {
                interval.tick().await;
                let purged = sessions.purge_expired();
                if purged > 0 {
                    tracing::debug!(purged, "Expired sessions purged");
                }
                rate_limiter.cleanup(window.max(CLEANUP_INTERVAL.as_secs())).await;
            }
        });
    }
}

fn create_dir(dir: &std::path::Path) -> AppResult<()> {
    std::fs::create_dir_all(dir).map_err(|e| {
        AppError::internal(format!("Failed to create directory {}: {e}", dir.display()))
    })
}

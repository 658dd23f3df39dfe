//! Server-side sessions
//!
//! The cookie carries `{id}.{hmac}` where the HMAC-SHA256 tag is computed
//! over the id with the configured secret key. Session data (authentication
//! flag and pending flash messages) lives in memory, keyed by id. A session
//! is stored only once something is written to it.

use dashmap::DashMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::{Arc, Mutex, PoisonError};
use shared::error::{AppError, AppResult, ErrorCode};
use std::time::Duration;
use tokio::time::Instant;

type HmacSha256 = Hmac<Sha256>;

/// Session cookie name
pub const SESSION_COOKIE: &str = "shield_session";

/// Flash message category (maps to an alert style)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Danger,
    Info,
    Warning,
}

impl FlashLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Danger => "danger",
            Self::Info => "info",
            Self::Warning => "warning",
        }
    }
}

/// One-shot message shown on the next rendered page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

#[derive(Debug, Clone)]
struct SessionData {
    authenticated: bool,
    flashes: Vec<Flash>,
    expires_at: Instant,
}

/// In-memory session store
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<DashMap<String, SessionData>>,
    /// Keyed MAC, cloned per signature
    mac: HmacSha256,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(secret_key: &str, ttl: Duration) -> AppResult<Self> {
        let mac = HmacSha256::new_from_slice(secret_key.as_bytes()).map_err(|e| {
            AppError::with_message(ErrorCode::ConfigError, format!("Invalid SECRET_KEY: {e}"))
        })?;
        Ok(Self {
            inner: Arc::new(DashMap::new()),
            mac,
            ttl,
        })
    }

    fn mac(&self) -> HmacSha256 {
        self.mac.clone()
    }

    /// Signed cookie value for a session id
    pub fn sign(&self, id: &str) -> String {
        let mut mac = self.mac();
        mac.update(id.as_bytes());
        format!("{id}.{}", hex::encode(mac.finalize().into_bytes()))
    }

    /// Session id from a signed cookie value, if the tag verifies
    pub fn verify(&self, cookie_value: &str) -> Option<String> {
        let (id, tag) = cookie_value.rsplit_once('.')?;
        let tag = hex::decode(tag).ok()?;
        let mut mac = self.mac();
        mac.update(id.as_bytes());
        // constant-time comparison
        mac.verify_slice(&tag).ok()?;
        Some(id.to_string())
    }

    /// Session for a request, given its cookie value
    ///
    /// A bad signature, an unknown id or an expired entry all yield a fresh
    /// anonymous session that is not stored until written. Known sessions
    /// get their idle expiry pushed back.
    pub fn resolve(&self, cookie_value: Option<&str>) -> Session {
        let now = Instant::now();
        if let Some(id) = cookie_value.and_then(|v| self.verify(v)) {
            let live = match self.inner.get_mut(&id) {
                Some(mut data) if data.expires_at > now => {
                    data.expires_at = now + self.ttl;
                    true
                }
                Some(_) => false,
                None => false,
            };
            if live {
                return Session::new(self.clone(), id, false);
            }
            self.inner.remove(&id);
        }
        Session::new(self.clone(), uuid::Uuid::new_v4().to_string(), false)
    }

    /// Drop expired sessions, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.inner.len();
        self.inner.retain(|_, data| data.expires_at > now);
        before - self.inner.len()
    }

    /// Number of stored sessions
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Run `f` on the stored data for `id`, creating it if needed.
    /// Returns whether the entry was created.
    fn write<R>(&self, id: &str, f: impl FnOnce(&mut SessionData) -> R) -> (R, bool) {
        let expires_at = Instant::now() + self.ttl;
        let mut created = false;
        let mut entry = self.inner.entry(id.to_string()).or_insert_with(|| {
            created = true;
            SessionData {
                authenticated: false,
                flashes: Vec::new(),
                expires_at,
            }
        });
        entry.expires_at = expires_at;
        (f(entry.value_mut()), created)
    }

    fn read<R>(&self, id: &str, f: impl FnOnce(&SessionData) -> R) -> Option<R> {
        self.inner.get(id).map(|data| f(data.value()))
    }
}

#[derive(Debug)]
struct Handle {
    id: String,
    /// Cookie must be (re)sent with this response
    set_cookie: bool,
}

/// Per-request session handle, inserted into request extensions
#[derive(Clone)]
pub struct Session {
    store: SessionStore,
    handle: Arc<Mutex<Handle>>,
}

impl Session {
    fn new(store: SessionStore, id: String, set_cookie: bool) -> Self {
        Self {
            store,
            handle: Arc::new(Mutex::new(Handle { id, set_cookie })),
        }
    }

    fn handle(&self) -> std::sync::MutexGuard<'_, Handle> {
        self.handle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn id(&self) -> String {
        self.handle().id.clone()
    }

    fn write<R>(&self, f: impl FnOnce(&mut SessionData) -> R) -> R {
        let mut handle = self.handle();
        let (result, created) = self.store.write(&handle.id, f);
        if created {
            handle.set_cookie = true;
        }
        result
    }

    pub fn is_authenticated(&self) -> bool {
        let id = self.id();
        self.store.read(&id, |d| d.authenticated).unwrap_or(false)
    }

    /// Mark the session authenticated under a fresh id
    ///
    /// Pending flashes carry over; the old id stops working.
    pub fn login(&self) {
        let mut handle = self.handle();
        let carried = self
            .store
            .inner
            .remove(&handle.id)
            .map(|(_, data)| data.flashes)
            .unwrap_or_default();

        handle.id = uuid::Uuid::new_v4().to_string();
        handle.set_cookie = true;
        self.store.write(&handle.id, |data| {
            data.authenticated = true;
            data.flashes = carried;
        });
    }

    /// Clear the authentication flag
    pub fn logout(&self) {
        let id = self.id();
        if let Some(mut data) = self.store.inner.get_mut(&id) {
            data.authenticated = false;
        }
    }

    /// Queue a one-shot message for the next rendered page
    pub fn flash(&self, level: FlashLevel, message: impl Into<String>) {
        let message = message.into();
        self.write(|data| data.flashes.push(Flash { level, message }));
    }

    /// Take and clear pending flashes
    pub fn take_flashes(&self) -> Vec<Flash> {
        let id = self.id();
        self.store
            .inner
            .get_mut(&id)
            .map(|mut data| std::mem::take(&mut data.flashes))
            .unwrap_or_default()
    }

    /// `Set-Cookie` value to attach to the response, if one is due
    pub fn set_cookie_header(&self, secure: bool) -> Option<String> {
        let handle = self.handle();
        if !handle.set_cookie {
            return None;
        }
        let mut cookie = format!(
            "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.store.sign(&handle.id),
            self.store.ttl.as_secs()
        );
        if secure {
            cookie.push_str("; Secure");
        }
        Some(cookie)
    }
}

/// Value of the named cookie from a `Cookie` header map
pub fn cookie_value(headers: &http::HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(http::header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
}

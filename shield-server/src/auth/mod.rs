//! Admin authentication
//!
//! - [`AdminCredential`] - the shared admin secret (Argon2 hash or plaintext)
//! - [`SessionStore`] / [`Session`] - signed-cookie server-side sessions
//! - [`require_auth`] - gate for admin routes
//! - [`RateLimiter`] - per-IP login throttling

pub mod middleware;
pub mod password;
pub mod rate_limit;
pub mod session;

pub use middleware::{require_auth, session_layer};
pub use password::{AdminCredential, hash_password};
pub use rate_limit::RateLimiter;
pub use session::{Flash, FlashLevel, Session, SessionStore};

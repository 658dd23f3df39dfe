//! Admin credential check

use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Hash a password into an Argon2 PHC string (for `ADMIN_PASSWORD_HASH`)
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    use argon2::password_hash::SaltString;
    use argon2::password_hash::rand_core::OsRng;
    use argon2::{Argon2, PasswordHasher};
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Constant-time equality via HMAC tags under a per-process key
fn constant_time_eq(key: &[u8], a: &str, b: &str) -> bool {
    let Ok(mut expected) = Hmac::<Sha256>::new_from_slice(key) else {
        return false;
    };
    expected.update(b.as_bytes());
    let expected = expected.finalize().into_bytes();

    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(key) else {
        return false;
    };
    mac.update(a.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

/// The single shared admin secret
#[derive(Clone)]
pub struct AdminCredential {
    plain: Option<String>,
    hash: Option<String>,
    key: Vec<u8>,
}

impl std::fmt::Debug for AdminCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredential")
            .field("plain", &self.plain.as_ref().map(|_| "***"))
            .field("hash", &self.hash.is_some())
            .finish()
    }
}

impl AdminCredential {
    /// `hash` (Argon2 PHC) takes precedence over `plain` when both are set
    pub fn new(plain: Option<String>, hash: Option<String>) -> Self {
        Self {
            plain,
            hash,
            key: uuid::Uuid::new_v4().as_bytes().to_vec(),
        }
    }

    /// Check a submitted password
    pub fn verify(&self, candidate: &str) -> bool {
        if let Some(hash) = &self.hash {
            return verify_password(candidate, hash);
        }
        match &self.plain {
            Some(plain) if !plain.is_empty() => constant_time_eq(&self.key, candidate, plain),
            _ => false,
        }
    }
}

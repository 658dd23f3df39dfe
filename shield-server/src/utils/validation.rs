//! Input validation helpers
//!
//! Text length constants and the admin form checks. SQLite TEXT has no
//! built-in length enforcement, so limits live here.

use shared::error::{AppError, ErrorCode};
use shared::models::ShieldCreate;

// ── Text length limits ──────────────────────────────────────────────

/// Street names
pub const MAX_STREET_LEN: usize = 100;

/// Client names
pub const MAX_CLIENT_LEN: usize = 100;

/// Admin password as typed (before comparison)
pub const MAX_PASSWORD_LEN: usize = 128;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
///
/// Length is counted in characters, not bytes.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::new(ErrorCode::RequiredField).with_detail("field", field));
    }
    let len = value.chars().count();
    if len > max_len {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("{field} is too long ({len} chars, max {max_len})"),
        )
        .with_detail("field", field));
    }
    Ok(())
}

/// A bare filename: non-empty, no `..`, no path separators
pub fn is_safe_filename(name: &str) -> bool {
    !name.is_empty() && !name.contains("..") && !name.contains('/') && !name.contains('\\')
}

/// Parse a positive, finite amount
pub fn parse_amount(raw: &str) -> Result<f64, AppError> {
    let amount: f64 = raw
        .trim()
        .parse()
        .map_err(|_| AppError::new(ErrorCode::ShieldInvalidAmount).with_detail("value", raw))?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::new(ErrorCode::ShieldInvalidAmount).with_detail("value", raw));
    }
    Ok(amount)
}

/// Raw text fields of the create form
#[derive(Debug, Clone, Default)]
pub struct ShieldForm {
    pub street: String,
    pub client: String,
    pub amount: String,
}

impl ShieldForm {
    /// Validate the text fields
    ///
    /// Missing fields are reported before a malformed amount.
    pub fn validate(&self) -> Result<ShieldCreate, AppError> {
        if self.street.trim().is_empty()
            || self.client.trim().is_empty()
            || self.amount.trim().is_empty()
        {
            return Err(AppError::new(ErrorCode::RequiredField));
        }
        validate_required_text(&self.street, "street", MAX_STREET_LEN)?;
        validate_required_text(&self.client, "client", MAX_CLIENT_LEN)?;
        let amount = parse_amount(&self.amount)?;

        Ok(ShieldCreate {
            street: self.street.trim().to_string(),
            client: self.client.trim().to_string(),
            amount,
            photo_url: None,
        })
    }
}

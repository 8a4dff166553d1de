//! Input validation helpers
//!
//! Centralized text length limits and validation functions for handlers.

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use validator::ValidateEmail;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: food, category, table, store, user
pub const MAX_NAME_LEN: usize = 200;

/// Notes, descriptions
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone, color codes, locations
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

pub const MIN_PASSWORD_LEN: usize = 8;
/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

/// URLs / image paths
pub const MAX_URL_LEN: usize = 2048;

pub const MAX_ADDRESS_LEN: usize = 500;

/// Tags and allergens per food
pub const MAX_TAGS: usize = 20;

pub use shared::order::MAX_PRICE;

// ── Validation helpers ──────────────────────────────────────────────

/// Required string: non-empty after trim and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            format!("{field} must not be empty"),
        ));
    }
    if value.chars().count() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.chars().count()
        )));
    }
    Ok(())
}

/// Optional string: within the length limit when present.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.chars().count() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.chars().count()
        )));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    if email.len() > MAX_EMAIL_LEN || !email.validate_email() {
        return Err(AppError::with_message(
            ErrorCode::InvalidFormat,
            format!("'{email}' is not a valid email address"),
        ));
    }
    Ok(())
}

/// Lowercased, trimmed email used for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::with_message(
            ErrorCode::PasswordTooShort,
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at most {MAX_PASSWORD_LEN} bytes"
        )));
    }
    Ok(())
}

pub fn validate_price(price: Decimal) -> Result<(), AppError> {
    if price < Decimal::ZERO || price > MAX_PRICE || price.scale() > 2 {
        return Err(AppError::with_message(
            ErrorCode::FoodInvalidPrice,
            format!("price must be between 0 and {MAX_PRICE} with at most 2 decimals"),
        ));
    }
    Ok(())
}

pub fn validate_tags(tags: &[String], field: &str) -> Result<(), AppError> {
    if tags.len() > MAX_TAGS {
        return Err(AppError::validation(format!(
            "{field} may contain at most {MAX_TAGS} entries"
        )));
    }
    for tag in tags {
        validate_required_text(tag, field, MAX_SHORT_TEXT_LEN)?;
    }
    Ok(())
}

/// Contact fields shared by store creation, admin edits and store settings
pub fn validate_store_contact(
    description: &Option<String>,
    phone: &Option<String>,
    email: &Option<String>,
    address: &Option<String>,
) -> Result<(), AppError> {
    validate_optional_text(description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(address, "address", MAX_ADDRESS_LEN)?;
    if let Some(email) = email.as_deref().map(str::trim)
        && !email.is_empty()
    {
        validate_email(email)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Margherita", "name", MAX_NAME_LEN).is_ok());
        let err = validate_required_text("   ", "name", MAX_NAME_LEN).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
        assert!(validate_required_text(&"x".repeat(201), "name", MAX_NAME_LEN).is_err());
        // multi-byte chars count once
        assert!(validate_required_text(&"é".repeat(200), "name", MAX_NAME_LEN).is_ok());
    }

    #[test]
    fn test_optional_text() {
        assert!(validate_optional_text(&None, "notes", 5).is_ok());
        assert!(validate_optional_text(&Some("abcdef".into()), "notes", 5).is_err());
    }

    #[test]
    fn test_email() {
        assert!(validate_email("chef@tavola.app").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert_eq!(normalize_email("  Chef@Tavola.APP "), "chef@tavola.app");
    }

    #[test]
    fn test_password() {
        assert_eq!(
            validate_password("short").unwrap_err().code,
            ErrorCode::PasswordTooShort
        );
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn test_price() {
        assert!(validate_price(Decimal::from_str("12.50").unwrap()).is_ok());
        assert!(validate_price(Decimal::ZERO).is_ok());
        let err = validate_price(Decimal::from_str("-1").unwrap()).unwrap_err();
        assert_eq!(err.code, ErrorCode::FoodInvalidPrice);
        assert!(validate_price(Decimal::from_str("1.999").unwrap()).is_err());
    }

    #[test]
    fn test_store_contact() {
        let none = None;
        assert!(validate_store_contact(&none, &none, &Some("  ".into()), &none).is_ok());
        let err = validate_store_contact(&none, &none, &Some("nope".into()), &none).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
        assert!(validate_store_contact(&none, &Some("1".repeat(101)), &none, &none).is_err());
    }
}

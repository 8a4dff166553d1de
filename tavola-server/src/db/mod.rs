//! Database access layer
//!
//! Free functions over `&PgPool` (or any `PgExecutor` when they take part in
//! a transaction). Tenant-owned reads take `Option<i64>` store filters bound as
//! `($1::BIGINT IS NULL OR store_id = $1)`; writes always take a concrete
//! store id.

pub mod banners;
pub mod categories;
pub mod foods;
pub mod orders;
pub mod stats;
pub mod stores;
pub mod tables;
pub mod users;

use crate::BoxError;

/// Decode a TEXT enum column, failing loudly on values the schema forbids
pub(crate) fn decode_enum<T>(
    value: &str,
    column: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<T, BoxError> {
    parse(value).ok_or_else(|| format!("invalid {column} value '{value}'").into())
}

/// `%term%` pattern for ILIKE searches, with LIKE wildcards escaped
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" pizza "), "%pizza%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_decode_enum() {
        use shared::models::OrderStatus;
        assert_eq!(
            decode_enum("ready", "status", OrderStatus::from_db).unwrap(),
            OrderStatus::Ready
        );
        assert!(decode_enum("done", "status", OrderStatus::from_db).is_err());
    }
}

/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a Snowflake-style i64 for use as resource ID.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: random (4096 values per ms)
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;
    let now = now_millis();
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    let rand_bits: i64 = rand::thread_rng().gen_range(0..0x1000); // 12 bits
    (ts << 12) | rand_bits
}

/// Opaque token printed in table QR codes (32 lowercase alphanumerics)
pub fn qr_token() -> String {
    use rand::Rng;
    use rand::distributions::Alphanumeric;
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(|c| (c as char).to_ascii_lowercase())
        .collect()
}

pub const SLUG_MIN_LEN: usize = 3;
pub const SLUG_MAX_LEN: usize = 50;

/// Slug rules: 3..=50 chars of `[a-z0-9-]`, no leading/trailing hyphen, not
/// all digits (a numeric `X-Store-ID` is read as a store id)
pub fn is_valid_slug(slug: &str) -> bool {
    (SLUG_MIN_LEN..=SLUG_MAX_LEN).contains(&slug.len())
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.bytes().all(|b| b.is_ascii_digit())
}

/// Derive a slug from a display name: lowercase, runs of other chars collapse to one hyphen
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug.truncate(SLUG_MAX_LEN);
    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snowflake_is_positive_and_safe_for_js() {
        let id = snowflake_id();
        assert!(id > 0);
        assert!(id < (1_i64 << 53));
    }

    #[test]
    fn test_qr_token_shape() {
        let token = qr_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert_ne!(token, qr_token());
    }

    #[test]
    fn test_slug_validation() {
        assert!(is_valid_slug("pizza-luigi"));
        assert!(is_valid_slug("abc"));
        assert!(!is_valid_slug("ab"));
        assert!(!is_valid_slug("Pizza"));
        assert!(!is_valid_slug("-pizza"));
        assert!(!is_valid_slug("pizza_luigi"));
        assert!(!is_valid_slug(&"a".repeat(51)));
        assert!(!is_valid_slug("123"));
        assert!(is_valid_slug("route-66"));
        assert!(is_valid_slug("1984-bistro"));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Pizza Luigi"), "pizza-luigi");
        assert_eq!(slugify("  Café  & Bar!! "), "caf-bar");
        assert_eq!(slugify("Burger--King 2"), "burger-king-2");
    }
}

//! Store resolution
//!
//! A request names its store through one of four signals, checked in order:
//! subdomain, `X-Store-ID` header, `/api/public/stores/{slug}` path segment,
//! JWT `store_id` claim. The first signal present decides.

use std::net::IpAddr;

use shared::error::{AppError, ErrorCode};
use shared::models::Store;
use sqlx::PgPool;

use crate::db;
use crate::error::ServiceResult;

/// Header carrying a store id or slug
pub const STORE_HEADER: &str = "x-store-id";

/// Subdomain labels that never name a store
const RESERVED_LABELS: &[&str] = &["www", "api", "admin", "app"];

const PUBLIC_STORES_PREFIX: &str = "/api/public/stores/";

/// How a candidate identifies its store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreRef {
    Id(i64),
    Slug(String),
    /// Matched against `subdomain`, then `slug`
    Subdomain(String),
}

/// Where a candidate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreSignal {
    Subdomain,
    Header,
    PathSlug,
    Claim,
}

impl StoreSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subdomain => "subdomain",
            Self::Header => "header",
            Self::PathSlug => "path",
            Self::Claim => "token",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCandidate {
    pub signal: StoreSignal,
    pub target: StoreRef,
}

/// Labels that never name a store (`www`, `api`, ...)
pub fn is_reserved_label(label: &str) -> bool {
    RESERVED_LABELS.contains(&label)
}

/// Subdomain label of `host` under `base_domain`, port stripped.
///
/// IP literals, reserved labels, nested labels and foreign hosts yield `None`.
pub fn subdomain_of(host: &str, base_domain: &str) -> Option<String> {
    let host = host.trim().to_ascii_lowercase();
    if host.is_empty() || host.starts_with('[') {
        return None;
    }

    let host = match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) && !name.contains(':') => {
            name.to_string()
        }
        Some(_) => return None,
        None => host,
    };
    let host = host.trim_end_matches('.');

    if host.parse::<IpAddr>().is_ok() {
        return None;
    }

    let base = base_domain.trim().trim_matches('.').to_ascii_lowercase();
    if base.is_empty() {
        return None;
    }
    let label = host.strip_suffix(&base)?.strip_suffix('.')?;

    let valid = !label.is_empty()
        && !label.contains('.')
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !valid || is_reserved_label(label) {
        return None;
    }
    Some(label.to_string())
}

/// Interpret an `X-Store-ID` value: numeric → id, otherwise slug.
pub fn header_ref(value: &str) -> Option<StoreRef> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match value.parse::<i64>() {
        Ok(id) => Some(StoreRef::Id(id)),
        Err(_) => Some(StoreRef::Slug(value.to_ascii_lowercase())),
    }
}

/// `{slug}` of `/api/public/stores/{slug}[/...]`
pub fn slug_from_path(path: &str) -> Option<String> {
    let rest = path.strip_prefix(PUBLIC_STORES_PREFIX)?;
    let slug = rest.split('/').next()?.trim();
    if slug.is_empty() {
        None
    } else {
        Some(slug.to_ascii_lowercase())
    }
}

/// All signals present on a request, highest precedence first.
pub fn store_candidates(
    host: Option<&str>,
    base_domain: &str,
    header: Option<&str>,
    path: &str,
    claim: Option<i64>,
) -> Vec<StoreCandidate> {
    let mut candidates = Vec::with_capacity(4);

    if let Some(label) = host.and_then(|h| subdomain_of(h, base_domain)) {
        candidates.push(StoreCandidate {
            signal: StoreSignal::Subdomain,
            target: StoreRef::Subdomain(label),
        });
    }
    if let Some(target) = header.and_then(header_ref) {
        candidates.push(StoreCandidate {
            signal: StoreSignal::Header,
            target,
        });
    }
    if let Some(slug) = slug_from_path(path) {
        candidates.push(StoreCandidate {
            signal: StoreSignal::PathSlug,
            target: StoreRef::Slug(slug),
        });
    }
    if let Some(id) = claim {
        candidates.push(StoreCandidate {
            signal: StoreSignal::Claim,
            target: StoreRef::Id(id),
        });
    }

    candidates
}

/// Look up the store named by the first candidate.
///
/// No candidates → `Ok(None)`. A first candidate naming no store is
/// `StoreNotFound`; later candidates are not consulted.
pub async fn resolve_store(
    pool: &PgPool,
    candidates: &[StoreCandidate],
) -> ServiceResult<Option<Store>> {
    let Some(first) = candidates.first() else {
        return Ok(None);
    };

    let store = match &first.target {
        StoreRef::Id(id) => db::stores::find_by_id(pool, *id).await?,
        StoreRef::Slug(slug) => db::stores::find_by_slug(pool, slug).await?,
        StoreRef::Subdomain(label) => db::stores::find_by_subdomain(pool, label).await?,
    };

    match store {
        Some(store) => Ok(Some(store)),
        None => {
            tracing::debug!(
                signal = first.signal.as_str(),
                target = ?first.target,
                "Store not found"
            );
            Err(AppError::with_message(
                ErrorCode::StoreNotFound,
                format!("Store not found (from {})", first.signal.as_str()),
            )
            .into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subdomain_of() {
        assert_eq!(subdomain_of("pizza.tavola.app", "tavola.app").as_deref(), Some("pizza"));
        assert_eq!(subdomain_of("Pizza.Tavola.App:8080", "tavola.app").as_deref(), Some("pizza"));
        assert_eq!(subdomain_of("pizza.localhost:3000", "localhost").as_deref(), Some("pizza"));
        assert_eq!(subdomain_of("tavola.app", "tavola.app"), None);
        assert_eq!(subdomain_of("www.tavola.app", "tavola.app"), None);
        assert_eq!(subdomain_of("api.tavola.app", "tavola.app"), None);
        assert_eq!(subdomain_of("a.b.tavola.app", "tavola.app"), None);
        assert_eq!(subdomain_of("pizza.other.com", "tavola.app"), None);
        assert_eq!(subdomain_of("pizzatavola.app", "tavola.app"), None);
    }

    #[test]
    fn test_subdomain_rejects_ip_and_malformed_hosts() {
        assert_eq!(subdomain_of("127.0.0.1:8080", "0.0.1"), None);
        assert_eq!(subdomain_of("[::1]:8080", "tavola.app"), None);
        assert_eq!(subdomain_of("::1", "tavola.app"), None);
        assert_eq!(subdomain_of("pizza.tavola.app:http", "tavola.app"), None);
        assert_eq!(subdomain_of("", "tavola.app"), None);
        assert_eq!(subdomain_of("pi_zza.tavola.app", "tavola.app"), None);
    }

    #[test]
    fn test_header_ref() {
        assert_eq!(header_ref("42"), Some(StoreRef::Id(42)));
        assert_eq!(header_ref(" Luigi-Pizza "), Some(StoreRef::Slug("luigi-pizza".into())));
        assert_eq!(header_ref("   "), None);
    }

    #[test]
    fn test_slug_from_path() {
        assert_eq!(slug_from_path("/api/public/stores/luigi/menu").as_deref(), Some("luigi"));
        assert_eq!(slug_from_path("/api/public/stores/luigi").as_deref(), Some("luigi"));
        assert_eq!(slug_from_path("/api/public/stores/"), None);
        assert_eq!(slug_from_path("/api/public/menu"), None);
        assert_eq!(slug_from_path("/api/store/foods"), None);
    }

    #[test]
    fn test_candidates_are_ordered_by_precedence() {
        let candidates = store_candidates(
            Some("luigi.tavola.app"),
            "tavola.app",
            Some("7"),
            "/api/public/stores/mario/menu",
            Some(9),
        );
        let signals: Vec<_> = candidates.iter().map(|c| c.signal).collect();
        assert_eq!(
            signals,
            vec![
                StoreSignal::Subdomain,
                StoreSignal::Header,
                StoreSignal::PathSlug,
                StoreSignal::Claim
            ]
        );
        assert_eq!(candidates[0].target, StoreRef::Subdomain("luigi".into()));
    }

    #[test]
    fn test_candidates_skip_absent_signals() {
        let candidates = store_candidates(
            Some("api.tavola.app"),
            "tavola.app",
            Some(""),
            "/api/store/foods",
            Some(3),
        );
        assert_eq!(
            candidates,
            vec![StoreCandidate {
                signal: StoreSignal::Claim,
                target: StoreRef::Id(3)
            }]
        );

        assert!(store_candidates(None, "tavola.app", None, "/health", None).is_empty());
    }
}

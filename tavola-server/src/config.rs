//! Server configuration

use std::net::IpAddr;
use std::path::PathBuf;

use crate::BoxError;
use crate::auth::JwtConfig;

/// Minimum JWT secret length outside development
const MIN_SECRET_LEN: usize = 32;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// JWT signing secret
    pub jwt_secret: String,
    pub jwt_expiration_minutes: i64,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    /// Domain under which stores get `<sub>.<base_domain>` hosts
    pub base_domain: String,
    /// Customer app origin encoded into table QR URLs
    pub customer_app_url: String,
    /// Root directory for uploaded images
    pub uploads_dir: PathBuf,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub log_json: bool,
    /// Reverse proxies whose `X-Forwarded-For` is believed
    pub trusted_proxies: Vec<IpAddr>,
    /// Bootstrap super admin (created on start when none exists)
    pub super_admin_email: Option<String>,
    pub super_admin_password: Option<String>,
}

impl Config {
    /// Required secret env var; outside development it must also be long enough.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production-use-only")
            }
        };
        if environment != "development" && val.len() < MIN_SECRET_LEN {
            return Err(
                format!("{name} must be at least {MIN_SECRET_LEN} characters in {environment} environment")
                    .into(),
            );
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            jwt_expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1440),
            jwt_issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "tavola-server".into()),
            jwt_audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "tavola-clients".into()),
            base_domain: std::env::var("BASE_DOMAIN")
                .map(|d| d.trim().to_ascii_lowercase())
                .unwrap_or_else(|_| "localhost".into()),
            customer_app_url: std::env::var("CUSTOMER_APP_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            uploads_dir: std::env::var("UPLOADS_DIR")
                .unwrap_or_else(|_| "uploads".into())
                .into(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
            log_json: std::env::var("LOG_JSON").is_ok_and(|v| v == "1" || v == "true"),
            trusted_proxies: parse_proxies(&std::env::var("TRUSTED_PROXIES").unwrap_or_default())?,
            super_admin_email: std::env::var("SUPER_ADMIN_EMAIL")
                .ok()
                .filter(|s| !s.is_empty()),
            super_admin_password: std::env::var("SUPER_ADMIN_PASSWORD")
                .ok()
                .filter(|s| !s.is_empty()),
            environment,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig {
            secret: self.jwt_secret.clone(),
            expiration_minutes: self.jwt_expiration_minutes,
            issuer: self.jwt_issuer.clone(),
            audience: self.jwt_audience.clone(),
        }
    }

    /// Table QR target: `{customer_app_url}/{store_slug}?table={qr_token}`
    pub fn table_qr_url(&self, store_slug: &str, qr_token: &str) -> String {
        format!("{}/{store_slug}?table={qr_token}", self.customer_app_url)
    }

    /// Development defaults (local database, fixed secret)
    pub fn development(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            http_port: 8080,
            environment: "development".into(),
            jwt_secret: "dev-JWT_SECRET-not-for-production-use-only".into(),
            jwt_expiration_minutes: 1440,
            jwt_issuer: "tavola-server".into(),
            jwt_audience: "tavola-clients".into(),
            base_domain: "localhost".into(),
            customer_app_url: "http://localhost:3000".into(),
            uploads_dir: "uploads".into(),
            log_level: "info".into(),
            log_dir: None,
            log_json: false,
            trusted_proxies: Vec::new(),
            super_admin_email: None,
            super_admin_password: None,
        }
    }
}

/// Comma-separated IP list; blanks are skipped
fn parse_proxies(raw: &str) -> Result<Vec<IpAddr>, BoxError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<IpAddr>()
                .map_err(|e| -> BoxError { format!("TRUSTED_PROXIES entry '{s}': {e}").into() })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_secret_length_outside_development() {
        let name = "TAVOLA_TEST_SHORT_SECRET";
        unsafe { std::env::set_var(name, "short") };
        assert!(Config::require_secret(name, "production").is_err());
        assert!(Config::require_secret(name, "development").is_ok());
        unsafe { std::env::remove_var(name) };
    }

    #[test]
    fn test_missing_secret_defaults_only_in_development() {
        let name = "TAVOLA_TEST_MISSING_SECRET";
        assert!(Config::require_secret(name, "production").is_err());
        let dev = Config::require_secret(name, "development").unwrap();
        assert!(dev.starts_with("dev-"));
    }

    #[test]
    fn test_table_qr_url() {
        let config = Config::development("postgres://localhost/tavola");
        assert_eq!(
            config.table_qr_url("pizza-luigi", "abc123"),
            "http://localhost:3000/pizza-luigi?table=abc123"
        );
    }

    #[test]
    fn test_parse_trusted_proxies() {
        assert!(parse_proxies("").unwrap().is_empty());
        let proxies = parse_proxies("10.0.0.1, ::1,").unwrap();
        assert_eq!(proxies.len(), 2);
        assert_eq!(proxies[0], "10.0.0.1".parse::<IpAddr>().unwrap());
        assert!(parse_proxies("10.0.0.1,nginx").is_err());
    }
}

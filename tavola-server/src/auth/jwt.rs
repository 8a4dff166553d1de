//! JWT token service
//!
//! Issues and validates the bearer tokens carried by every authenticated request.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use shared::models::{User, UserRole};
use thiserror::Error;

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Signing secret (at least 32 bytes outside development)
    pub secret: String,
    /// Token lifetime in minutes
    pub expiration_minutes: i64,
    pub issuer: String,
    pub audience: String,
}

/// Claims stored in the token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID (Subject)
    pub sub: String,
    pub email: String,
    /// `super_admin` | `store_admin` | `customer`
    pub role: String,
    /// Store of a store admin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<i64>,
    /// Comma-separated permissions
    #[serde(default)]
    pub permissions: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),

    #[error("Malformed claims: {0}")]
    MalformedClaims(String),
}

/// JWT token service
#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Generate a new token for a user
    pub fn generate_token(&self, user: &User) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.expiration_minutes);

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.as_db().to_string(),
            store_id: user.store_id,
            permissions: user.permissions.join(","),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidToken => JwtError::InvalidToken(e.to_string()),
                _ => JwtError::InvalidToken(format!("Token validation failed: {}", e)),
            }
        })?;

        Ok(token_data.claims)
    }

    /// Extract the token from an `Authorization` header value
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Authenticated caller, decoded from JWT claims
///
/// Inserted into request extensions by [`require_auth`](super::require_auth)
/// and [`optional_auth`](super::optional_auth).
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
    pub role: UserRole,
    /// Store of a store admin; `None` for other roles
    pub store_id: Option<i64>,
    pub permissions: Vec<String>,
}

impl TryFrom<Claims> for CurrentUser {
    type Error = JwtError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| JwtError::MalformedClaims(format!("sub '{}' is not an id", claims.sub)))?;
        let role = UserRole::from_db(&claims.role)
            .ok_or_else(|| JwtError::MalformedClaims(format!("unknown role '{}'", claims.role)))?;
        let permissions = if claims.permissions.is_empty() {
            vec![]
        } else {
            claims
                .permissions
                .split(',')
                .map(|s| s.to_string())
                .collect()
        };

        Ok(Self {
            id,
            email: claims.email,
            role,
            store_id: claims.store_id,
            permissions,
        })
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            store_id: user.store_id,
            permissions: user.permissions.clone(),
        }
    }
}

impl CurrentUser {
    pub fn is_super_admin(&self) -> bool {
        self.role == UserRole::SuperAdmin
    }

    /// Check a permission.
    ///
    /// 1. Super admins hold every permission
    /// 2. Customers hold none
    /// 3. `"all"` grants everything
    /// 4. Exact match, or prefix match for `"menu:*"` style wildcards
    pub fn has_permission(&self, permission: &str) -> bool {
        match self.role {
            UserRole::SuperAdmin => return true,
            UserRole::Customer => return false,
            UserRole::StoreAdmin => {}
        }

        if self.permissions.iter().any(|p| p == "all") {
            return true;
        }

        self.permissions.iter().any(|p| {
            if p == permission {
                return true;
            }
            if let Some(prefix) = p.strip_suffix(":*") {
                permission
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with(':'))
            } else {
                false
            }
        })
    }

    pub fn has_any_permission(&self, permissions: &[&str]) -> bool {
        permissions.iter().any(|p| self.has_permission(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::with_config(JwtConfig {
            secret: "test-secret-that-is-at-least-32-bytes-long".into(),
            expiration_minutes: 60,
            issuer: "tavola-test".into(),
            audience: "tavola-test-clients".into(),
        })
    }

    fn user(role: UserRole, store_id: Option<i64>, permissions: &[&str]) -> User {
        User {
            id: 42,
            name: "Ada".into(),
            email: "ada@example.com".into(),
            phone: None,
            role,
            store_id,
            permissions: permissions.iter().map(|s| s.to_string()).collect(),
            is_active: true,
            last_login_at: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn current(role: UserRole, permissions: &[&str]) -> CurrentUser {
        CurrentUser {
            id: 1,
            email: "x@example.com".into(),
            role,
            store_id: Some(7),
            permissions: permissions.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_jwt_generation_and_validation() {
        let service = service();
        let token = service
            .generate_token(&user(UserRole::StoreAdmin, Some(7), &["menu:manage", "orders:manage"]))
            .expect("Failed to generate test token");

        let claims = service
            .validate_token(&token)
            .expect("Failed to validate test token");
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.role, "store_admin");
        assert_eq!(claims.store_id, Some(7));
        assert_eq!(claims.permissions, "menu:manage,orders:manage");

        let current = CurrentUser::try_from(claims).unwrap();
        assert_eq!(current.id, 42);
        assert_eq!(current.role, UserRole::StoreAdmin);
        assert_eq!(current.permissions.len(), 2);
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let token = service()
            .generate_token(&user(UserRole::Customer, None, &[]))
            .unwrap();
        let other = JwtService::with_config(JwtConfig {
            secret: "another-secret-that-is-at-least-32-bytes".into(),
            ..service().config
        });
        assert!(matches!(
            other.validate_token(&token),
            Err(JwtError::InvalidSignature)
        ));
    }

    #[test]
    fn test_expired_token() {
        let service = JwtService::with_config(JwtConfig {
            expiration_minutes: -10,
            ..service().config
        });
        let token = service
            .generate_token(&user(UserRole::Customer, None, &[]))
            .unwrap();
        assert!(matches!(
            service.validate_token(&token),
            Err(JwtError::ExpiredToken)
        ));
    }

    #[test]
    fn test_extract_from_header() {
        assert_eq!(JwtService::extract_from_header("Bearer abc"), Some("abc"));
        assert_eq!(JwtService::extract_from_header("Bearer "), None);
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
    }

    #[test]
    fn test_store_admin_permissions() {
        let admin = current(UserRole::StoreAdmin, &["orders:manage", "menu:*"]);
        assert!(admin.has_permission("orders:manage"));
        assert!(admin.has_permission("menu:manage"));
        assert!(!admin.has_permission("menus:manage"));
        assert!(!admin.has_permission("stats:view"));
        assert!(admin.has_any_permission(&["stats:view", "menu:manage"]));
    }

    #[test]
    fn test_all_and_super_admin() {
        assert!(current(UserRole::StoreAdmin, &["all"]).has_permission("settings:manage"));
        assert!(current(UserRole::SuperAdmin, &[]).has_permission("stats:view"));
        assert!(!current(UserRole::Customer, &["all"]).has_permission("menu:manage"));
    }

    #[test]
    fn test_malformed_claims() {
        let claims = Claims {
            sub: "not-a-number".into(),
            email: "x@example.com".into(),
            role: "customer".into(),
            store_id: None,
            permissions: String::new(),
            exp: 0,
            iat: 0,
            iss: String::new(),
            aud: String::new(),
        };
        assert!(matches!(
            CurrentUser::try_from(claims),
            Err(JwtError::MalformedClaims(_))
        ));
    }
}

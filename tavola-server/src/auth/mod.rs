//! Authentication and authorization
//!
//! - [`JwtService`] - token issue/validation
//! - [`CurrentUser`] - caller decoded from the token
//! - [`require_auth`] / [`optional_auth`] - token middleware
//! - [`require_role`] / [`require_super_admin`] - role gate
//! - [`require_permission`] - store admin permission gate
//! - [`rate_limit`] - per-IP limits for login and registration

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod permissions;
pub mod rate_limit;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{
    optional_auth, require_any_permission, require_auth, require_permission, require_role,
    require_super_admin,
};
pub use extractor::MaybeUser;
pub use rate_limit::RateLimiter;

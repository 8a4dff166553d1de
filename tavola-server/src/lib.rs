//! Tavola Server - multi-tenant restaurant ordering API
//!
//! # Module layout
//!
//! ```text
//! tavola-server/src/
//! ├── config.rs      # Environment configuration
//! ├── state.rs       # Shared application state
//! ├── error.rs       # ServiceError (db → AppError bridge)
//! ├── auth/          # JWT, role gate, permissions, rate limiting
//! ├── tenant/        # Store resolution and store scoping
//! ├── db/            # PostgreSQL access (sqlx)
//! ├── services/      # Order placement
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # Logger, validation, password hashing
//! ```
//!
//! Every tenant-owned row carries a `store_id`. A request first passes the
//! role gate, then the store resolver attaches a [`tenant::StoreScope`] that
//! handlers bind into their queries.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod services;
pub mod state;
pub mod tenant;
pub mod utils;

pub use api::build_app;
pub use auth::{CurrentUser, JwtService};
pub use config::Config;
pub use error::{ServiceError, ServiceResult};
pub use state::AppState;
pub use tenant::{StoreContext, StoreScope};

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};

pub use utils::logger::init_logger;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// Security logging macro - supports tracing format specifiers
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

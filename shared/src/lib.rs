//! Shared types for the Tavola platform
//!
//! Error codes, API response envelope, domain models and the pure order
//! rules (pricing, status transitions) used by the server and its clients.

pub mod error;
pub mod models;
pub mod order;
pub mod pagination;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use pagination::{PageQuery, PaginatedResponse};

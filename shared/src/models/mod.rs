//! Data models
//!
//! Shared between the server and API clients.
//! Simple row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`;
//! rows with enum columns are mapped by the server's db layer.
//! All IDs are `i64` snowflakes, timestamps are Unix millis.

pub mod banner;
pub mod category;
pub mod dining_table;
pub mod food;
pub mod order;
pub mod stats;
pub mod store;
pub mod user;

// Re-exports
pub use banner::*;
pub use category::*;
pub use dining_table::*;
pub use food::*;
pub use order::*;
pub use stats::*;
pub use store::*;
pub use user::*;

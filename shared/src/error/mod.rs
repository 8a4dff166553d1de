//! Error model shared by the Tavola server and its clients
//!
//! Handlers fail with an [`AppError`]: an [`ErrorCode`] plus a message and
//! optional details. It renders as
//! `{ "code": 3002, "message": "Store not found", "details": { "id": 7 } }`
//! with the HTTP status the code maps to.
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::TableNotFound).with_detail("id", 12);
//! assert_eq!(err.http_status().as_u16(), 404);
//! ```

mod category;
mod codes;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};

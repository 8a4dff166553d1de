//! `AppError` and the JSON envelope it is rendered into

use std::collections::HashMap;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::category::ErrorCategory;
use super::codes::ErrorCode;

/// Error returned by every API operation.
///
/// `message` defaults to the code's canned text; `details` carries
/// structured context such as the offending field or the missing id.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    pub fn new(code: ErrorCode) -> Self {
        Self::with_message(code, code.message())
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Attach one key of structured context
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    pub fn not_authenticated() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials)
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }

    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::PermissionDenied, msg)
    }

    pub fn role_required(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::RoleRequired, msg)
    }

    /// Store-scoped write attempted without a resolved store
    pub fn store_not_selected() -> Self {
        Self::new(ErrorCode::StoreNotSelected)
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Envelope for error payloads and non-resource replies.
///
/// Errors render as `{ "code", "message", "details"? }`; a successful
/// envelope has code `0` and carries `data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: ErrorCode::Success.code(),
            message: "OK".to_string(),
            data: Some(data),
            details: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == ErrorCode::Success.code()
    }
}

impl<T> From<AppError> for ApiResponse<T> {
    fn from(err: AppError) -> Self {
        Self {
            code: err.code.code(),
            message: err.message,
            data: None,
            details: err.details,
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.http_status();
        if self.code.category() == ErrorCategory::System {
            tracing::error!(code = %self.code, message = %self.message, "System error");
        }
        (status, axum::Json(ApiResponse::<()>::from(self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_message_comes_from_code() {
        let err = AppError::new(ErrorCode::FoodNotFound);
        assert_eq!(err.message, ErrorCode::FoodNotFound.message());
        assert_eq!(err.http_status(), StatusCode::NOT_FOUND);
        assert!(err.details.is_none());
    }

    #[test]
    fn test_details_accumulate() {
        let err = AppError::new(ErrorCode::FoodUnavailable)
            .with_detail("food_id", 17)
            .with_detail("name", "Margherita");
        let details = err.details.unwrap();
        assert_eq!(details["food_id"], 17);
        assert_eq!(details["name"], "Margherita");
    }

    #[test]
    fn test_shortcut_constructors() {
        assert_eq!(AppError::validation("bad").code, ErrorCode::ValidationFailed);
        assert_eq!(
            AppError::store_not_selected().http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::role_required("staff only").http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::token_expired().http_status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_error_envelope_shape() {
        let err = AppError::with_message(ErrorCode::TableNotFound, "Table 4 not found")
            .with_detail("id", 4);
        let body = serde_json::to_value(ApiResponse::<()>::from(err)).unwrap();
        assert_eq!(body["code"], ErrorCode::TableNotFound.code());
        assert_eq!(body["message"], "Table 4 not found");
        assert_eq!(body["details"]["id"], 4);
        assert!(body.get("data").is_none());
    }

    #[test]
    fn test_success_envelope() {
        let response = ApiResponse::success(vec![1, 2]);
        assert!(response.is_success());
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"code":0,"message":"OK","data":[1,2]}"#);
    }
}

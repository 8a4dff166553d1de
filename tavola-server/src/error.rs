//! Unified service-layer error type
//!
//! `ServiceError` bridges DB-layer errors (`sqlx::Error`, `BoxError`) and the
//! API-layer error (`AppError`) so repositories and handlers can use `?`.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

use crate::BoxError;

/// Service-layer error
///
/// - `Db`: Database/infrastructure errors (logged, mapped to InternalError)
/// - `App`: Business-rule errors (passed through to the client)
#[derive(Debug)]
pub enum ServiceError {
    Db(BoxError),
    App(AppError),
}

impl ServiceError {
    /// PostgreSQL unique-violation (23505) on the named constraint
    pub fn is_unique_violation(&self, constraint: &str) -> bool {
        match self {
            ServiceError::Db(e) => e
                .downcast_ref::<sqlx::Error>()
                .is_some_and(|e| is_unique_violation(e, constraint)),
            ServiceError::App(_) => false,
        }
    }

    /// Replace a unique violation on `constraint` with a domain error
    pub fn on_conflict(self, constraint: &str, err: impl FnOnce() -> AppError) -> Self {
        if self.is_unique_violation(constraint) {
            ServiceError::App(err())
        } else {
            self
        }
    }
}

pub fn is_unique_violation(e: &sqlx::Error, constraint: &str) -> bool {
    match e {
        sqlx::Error::Database(db) => {
            db.code().as_deref() == Some("23505") && db.constraint() == Some(constraint)
        }
        _ => false,
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::InternalError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_passes_through() {
        let err: AppError = ServiceError::from(AppError::new(ErrorCode::TableNotFound)).into();
        assert_eq!(err.code, ErrorCode::TableNotFound);
    }

    #[test]
    fn test_db_error_is_masked() {
        let err: AppError = ServiceError::from(sqlx::Error::RowNotFound).into();
        assert_eq!(err.code, ErrorCode::InternalError);
    }

    #[test]
    fn test_on_conflict_ignores_other_errors() {
        let err = ServiceError::from(sqlx::Error::RowNotFound)
            .on_conflict("stores_slug_key", || AppError::new(ErrorCode::StoreSlugExists));
        assert!(matches!(err, ServiceError::Db(_)));
    }
}

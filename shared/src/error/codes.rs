//! Numeric error codes shared by the API and its clients
//!
//! The thousands digit names the domain, see [`ErrorCategory`](super::ErrorCategory).
//! Every code is declared once below together with its HTTP status and
//! default message.

use std::fmt;

use http::StatusCode;
use serde::{Deserialize, Serialize};

macro_rules! error_codes {
    ($( $(#[$meta:meta])* $name:ident = $value:literal => $status:ident, $message:literal; )+) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(into = "u16", try_from = "u16")]
        #[repr(u16)]
        pub enum ErrorCode {
            $( $(#[$meta])* $name = $value, )+
        }

        impl ErrorCode {
            /// Default human-readable message
            pub const fn message(&self) -> &'static str {
                match self {
                    $( Self::$name => $message, )+
                }
            }

            pub const fn http_status(&self) -> StatusCode {
                match self {
                    $( Self::$name => StatusCode::$status, )+
                }
            }
        }

        impl TryFrom<u16> for ErrorCode {
            type Error = InvalidErrorCode;

            fn try_from(value: u16) -> Result<Self, Self::Error> {
                match value {
                    $( $value => Ok(Self::$name), )+
                    _ => Err(InvalidErrorCode(value)),
                }
            }
        }
    };
}

error_codes! {
    Success = 0 => OK, "OK";
    ValidationFailed = 2 => BAD_REQUEST, "Validation failed";
    InvalidRequest = 5 => BAD_REQUEST, "Invalid request";
    InvalidFormat = 6 => BAD_REQUEST, "Invalid format";
    RequiredField = 7 => BAD_REQUEST, "Required field is missing";
    ValueOutOfRange = 8 => BAD_REQUEST, "Value is out of range";
    TooManyRequests = 9 => TOO_MANY_REQUESTS, "Too many requests, try again later";

    NotAuthenticated = 1001 => UNAUTHORIZED, "Authentication required";
    InvalidCredentials = 1002 => UNAUTHORIZED, "Invalid email or password";
    TokenExpired = 1003 => UNAUTHORIZED, "Session has expired, sign in again";
    TokenInvalid = 1004 => UNAUTHORIZED, "Session token is invalid";
    AccountDisabled = 1007 => UNAUTHORIZED, "Account is disabled";
    PasswordTooShort = 1008 => BAD_REQUEST, "Password must be at least 8 characters";

    PermissionDenied = 2001 => FORBIDDEN, "Permission denied";
    /// Caller's role may not use this surface (customers on staff routes)
    RoleRequired = 2002 => FORBIDDEN, "Staff role required";
    SuperAdminRequired = 2003 => FORBIDDEN, "Super administrator role required";

    /// No tenant signal on a store-scoped write
    StoreNotSelected = 3001 => BAD_REQUEST, "No store selected";
    StoreNotFound = 3002 => NOT_FOUND, "Store not found";
    /// Deactivated, or the subscription is no longer active or trialing
    StoreInactive = 3003 => FORBIDDEN, "Store is not active";
    StoreSlugExists = 3004 => CONFLICT, "Store slug or subdomain already taken";
    StoreSlugInvalid = 3005 => BAD_REQUEST, "Store slug is invalid";

    OrderNotFound = 4001 => NOT_FOUND, "Order not found";
    OrderAlreadyPaid = 4002 => CONFLICT, "Order has already been paid";
    OrderAlreadyCompleted = 4003 => CONFLICT, "Order has already been completed";
    OrderAlreadyCancelled = 4004 => CONFLICT, "Order has already been cancelled";
    OrderEmpty = 4007 => BAD_REQUEST, "Order has no items";
    InvalidStatusTransition = 4008 => CONFLICT, "Order status change is not allowed";
    OrderBelowMinimum = 4009 => BAD_REQUEST, "Order total is below the delivery minimum";

    PaymentInvalidMethod = 5003 => BAD_REQUEST, "Payment method not accepted by this store";
    PaymentAlreadyRefunded = 5004 => CONFLICT, "Payment has already been refunded";
    InvalidPaymentTransition = 5006 => CONFLICT, "Payment status change is not allowed";

    FoodNotFound = 6001 => NOT_FOUND, "Food not found";
    FoodInvalidPrice = 6002 => BAD_REQUEST, "Food price is invalid";
    FoodUnavailable = 6003 => BAD_REQUEST, "Food is currently unavailable";
    CategoryNotFound = 6101 => NOT_FOUND, "Category not found";
    CategoryHasFoods = 6102 => CONFLICT, "Category still has foods";
    CategoryNameExists = 6103 => CONFLICT, "Category name already exists";
    BannerNotFound = 6201 => NOT_FOUND, "Banner not found";
    FileTooLarge = 6501 => PAYLOAD_TOO_LARGE, "File too large";
    UnsupportedFileFormat = 6502 => BAD_REQUEST, "Unsupported file format";
    InvalidImageFile = 6503 => BAD_REQUEST, "File is not a readable image";
    NoFileProvided = 6504 => BAD_REQUEST, "No file provided";
    EmptyFile = 6505 => BAD_REQUEST, "File is empty";
    NoFilename = 6506 => BAD_REQUEST, "No filename provided";
    ImageProcessingFailed = 6508 => INTERNAL_SERVER_ERROR, "Image processing failed";
    FileStorageFailed = 6509 => INTERNAL_SERVER_ERROR, "Could not store file";

    TableNotFound = 7001 => NOT_FOUND, "Table not found";
    TableNameExists = 7002 => CONFLICT, "Table name already exists";
    TableHasOrders = 7104 => CONFLICT, "Table has open orders";

    UserNotFound = 8001 => NOT_FOUND, "User not found";
    EmailExists = 8002 => CONFLICT, "Email is already registered";
    CannotDeleteSelf = 8003 => FORBIDDEN, "You cannot delete your own account";
    InvalidRoleAssignment = 8004 => BAD_REQUEST, "Role and store assignment do not match";

    InternalError = 9001 => INTERNAL_SERVER_ERROR, "Internal server error";
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A number that is not a known [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid error code: {0}")]
pub struct InvalidErrorCode(pub u16);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrips_through_u16() {
        for code in [
            ErrorCode::Success,
            ErrorCode::StoreInactive,
            ErrorCode::OrderBelowMinimum,
            ErrorCode::CategoryHasFoods,
            ErrorCode::TableHasOrders,
            ErrorCode::InternalError,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
        assert_eq!(ErrorCode::try_from(4242), Err(InvalidErrorCode(4242)));
    }

    #[test]
    fn test_serializes_as_number() {
        assert_eq!(serde_json::to_string(&ErrorCode::StoreInactive).unwrap(), "3003");
        let code: ErrorCode = serde_json::from_str("7104").unwrap();
        assert_eq!(code, ErrorCode::TableHasOrders);
        assert!(serde_json::from_str::<ErrorCode>("31337").is_err());
    }

    #[test]
    fn test_status_per_family() {
        assert_eq!(ErrorCode::TableNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::StoreSlugExists.http_status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::InvalidStatusTransition.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(ErrorCode::TokenExpired.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::StoreInactive.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::StoreNotSelected.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::FileTooLarge.http_status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ErrorCode::TooManyRequests.http_status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_display_is_numeric() {
        assert_eq!(ErrorCode::OrderNotFound.to_string(), "4001");
        assert_eq!(InvalidErrorCode(1).to_string(), "invalid error code: 1");
    }
}

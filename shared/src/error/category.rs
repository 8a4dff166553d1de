//! Grouping of error codes by domain

use serde::{Deserialize, Serialize};

use super::codes::ErrorCode;

/// Domain of an [`ErrorCode`], taken from its thousands digit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    General,
    Auth,
    Permission,
    Store,
    Order,
    Payment,
    Menu,
    Table,
    User,
    System,
}

impl ErrorCategory {
    pub fn from_code(code: u16) -> Self {
        match code / 1000 {
            0 => Self::General,
            1 => Self::Auth,
            2 => Self::Permission,
            3 => Self::Store,
            4 => Self::Order,
            5 => Self::Payment,
            6 => Self::Menu,
            7 => Self::Table,
            8 => Self::User,
            _ => Self::System,
        }
    }
}

impl ErrorCode {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_boundaries() {
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1000), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(6501), ErrorCategory::Menu);
        assert_eq!(ErrorCategory::from_code(8999), ErrorCategory::User);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(12000), ErrorCategory::System);
    }

    #[test]
    fn test_codes_fall_in_their_domain() {
        assert_eq!(ErrorCode::StoreNotSelected.category(), ErrorCategory::Store);
        assert_eq!(ErrorCode::FileTooLarge.category(), ErrorCategory::Menu);
        assert_eq!(
            ErrorCode::InvalidPaymentTransition.category(),
            ErrorCategory::Payment
        );
        assert_eq!(ErrorCode::InternalError.category(), ErrorCategory::System);
        assert_eq!(
            serde_json::to_string(&ErrorCategory::Table).unwrap(),
            "\"table\""
        );
    }
}

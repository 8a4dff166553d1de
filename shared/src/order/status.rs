//! Order and payment state machines

use crate::error::{AppError, ErrorCode};
use crate::models::{OrderStatus, PaymentStatus};

impl OrderStatus {
    /// No transition leaves a terminal status
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Orders that still occupy a table
    pub fn is_open(self) -> bool {
        !self.is_terminal()
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Preparing)
                | (Confirmed, Cancelled)
                | (Preparing, Ready)
                | (Ready, Served)
                | (Ready, Completed)
                | (Served, Completed)
        )
    }
}

impl PaymentStatus {
    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Paid) | (Self::Paid, Self::Refunded)
        )
    }
}

/// Validate a status change, mapping each refusal to its error code
pub fn check_status_change(
    current: OrderStatus,
    payment: PaymentStatus,
    next: OrderStatus,
) -> Result<(), AppError> {
    match current {
        OrderStatus::Completed => return Err(AppError::new(ErrorCode::OrderAlreadyCompleted)),
        OrderStatus::Cancelled => return Err(AppError::new(ErrorCode::OrderAlreadyCancelled)),
        _ => {}
    }
    if next == OrderStatus::Cancelled && payment == PaymentStatus::Paid {
        return Err(AppError::with_message(
            ErrorCode::OrderAlreadyPaid,
            "A paid order must be refunded before it can be cancelled",
        ));
    }
    if !current.can_transition_to(next) {
        return Err(AppError::with_message(
            ErrorCode::InvalidStatusTransition,
            format!("Cannot move order from {} to {}", current.as_db(), next.as_db()),
        ));
    }
    Ok(())
}

/// Validate a payment status change
pub fn check_payment_change(
    status: OrderStatus,
    current: PaymentStatus,
    next: PaymentStatus,
) -> Result<(), AppError> {
    if current == PaymentStatus::Refunded {
        return Err(AppError::new(ErrorCode::PaymentAlreadyRefunded));
    }
    if next == PaymentStatus::Paid && status == OrderStatus::Cancelled {
        return Err(AppError::new(ErrorCode::OrderAlreadyCancelled));
    }
    if !current.can_transition_to(next) {
        return Err(AppError::with_message(
            ErrorCode::InvalidPaymentTransition,
            format!("Cannot move payment from {} to {}", current.as_db(), next.as_db()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_paths() {
        use OrderStatus::*;
        let dine_in = [Pending, Confirmed, Preparing, Ready, Served, Completed];
        for pair in dine_in.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{:?}", pair);
        }
        assert!(Ready.can_transition_to(Completed));
    }

    #[test]
    fn test_illegal_transitions() {
        use OrderStatus::*;
        assert!(!Pending.can_transition_to(Preparing));
        assert!(!Preparing.can_transition_to(Cancelled));
        assert!(!Served.can_transition_to(Ready));
        assert!(!Pending.can_transition_to(Pending));
        for next in OrderStatus::ALL {
            assert!(!Completed.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn test_check_status_change_codes() {
        use OrderStatus::*;
        let err = check_status_change(Completed, PaymentStatus::Paid, Cancelled).unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderAlreadyCompleted);

        let err = check_status_change(Cancelled, PaymentStatus::Pending, Confirmed).unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderAlreadyCancelled);

        let err = check_status_change(Confirmed, PaymentStatus::Paid, Cancelled).unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderAlreadyPaid);

        let err = check_status_change(Pending, PaymentStatus::Pending, Served).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStatusTransition);

        assert!(check_status_change(Pending, PaymentStatus::Pending, Cancelled).is_ok());
        assert!(check_status_change(Ready, PaymentStatus::Paid, Completed).is_ok());
    }

    #[test]
    fn test_check_payment_change_codes() {
        use PaymentStatus::*;
        assert!(check_payment_change(OrderStatus::Served, Pending, Paid).is_ok());
        assert!(check_payment_change(OrderStatus::Completed, Paid, Refunded).is_ok());

        let err = check_payment_change(OrderStatus::Completed, Refunded, Paid).unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentAlreadyRefunded);

        let err = check_payment_change(OrderStatus::Pending, Pending, Refunded).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPaymentTransition);

        let err = check_payment_change(OrderStatus::Cancelled, Pending, Paid).unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderAlreadyCancelled);
    }
}

//! Store scope: which store's rows a request may touch

use shared::error::{AppError, ErrorCode};
use shared::models::{Store, UserRole};

use crate::auth::CurrentUser;
use crate::security_log;

/// Store filter bound into tenant-owned queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreScope {
    /// Super admin without a selected store
    AllStores,
    Store(i64),
}

impl StoreScope {
    /// Value for `WHERE ($1::BIGINT IS NULL OR store_id = $1)`
    pub fn store_id(&self) -> Option<i64> {
        match self {
            Self::AllStores => None,
            Self::Store(id) => Some(*id),
        }
    }

    /// Writes need a concrete store
    pub fn require_store(&self) -> Result<i64, AppError> {
        match self {
            Self::AllStores => Err(AppError::with_message(
                ErrorCode::StoreNotSelected,
                "Select a store with the X-Store-ID header",
            )),
            Self::Store(id) => Ok(*id),
        }
    }
}

/// Compute the scope for `user` acting on `store` at `now` (Unix millis).
pub fn compute_scope(
    user: Option<&CurrentUser>,
    store: Option<&Store>,
    now: i64,
) -> Result<StoreScope, AppError> {
    match user {
        Some(user) if user.role == UserRole::SuperAdmin => {
            Ok(store.map_or(StoreScope::AllStores, |s| StoreScope::Store(s.id)))
        }
        Some(user) if user.role == UserRole::StoreAdmin => {
            let (Some(own), Some(store)) = (user.store_id, store) else {
                return Err(AppError::store_not_selected());
            };
            if store.id != own {
                security_log!(
                    "WARN",
                    "cross_store_access",
                    user_id = user.id,
                    own_store = own,
                    requested_store = store.id
                );
                return Err(AppError::permission_denied(
                    "Store admins may only access their own store",
                ));
            }
            operational(store, now)
        }
        _ => {
            let Some(store) = store else {
                return Err(AppError::store_not_selected());
            };
            operational(store, now)
        }
    }
}

fn operational(store: &Store, now: i64) -> Result<StoreScope, AppError> {
    if store.is_operational(now) {
        Ok(StoreScope::Store(store.id))
    } else {
        Err(AppError::with_message(
            ErrorCode::StoreInactive,
            format!("Store '{}' is not currently operating", store.slug),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{
        StoreCustomization, StoreSettings, SubscriptionPlan, SubscriptionStatus,
    };

    const NOW: i64 = 1_700_000_000_000;

    fn store(id: i64, status: SubscriptionStatus, is_active: bool) -> Store {
        Store {
            id,
            name: format!("Store {id}"),
            slug: format!("store-{id}"),
            subdomain: None,
            owner_id: None,
            description: None,
            phone: None,
            email: None,
            address: None,
            plan: SubscriptionPlan::Free,
            subscription_status: status,
            subscription_expires_at: None,
            settings: StoreSettings::default(),
            customization: StoreCustomization::default(),
            is_active,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn user(role: UserRole, store_id: Option<i64>) -> CurrentUser {
        CurrentUser {
            id: 1,
            email: "u@tavola.app".into(),
            role,
            store_id,
            permissions: vec!["all".into()],
        }
    }

    fn code(result: Result<StoreScope, AppError>) -> ErrorCode {
        result.unwrap_err().code
    }

    #[test]
    fn test_anonymous_and_customer() {
        let open = store(5, SubscriptionStatus::Active, true);
        let closed = store(5, SubscriptionStatus::Suspended, true);
        let customer = user(UserRole::Customer, None);

        assert_eq!(code(compute_scope(None, None, NOW)), ErrorCode::StoreNotSelected);
        assert_eq!(compute_scope(None, Some(&open), NOW).unwrap(), StoreScope::Store(5));
        assert_eq!(
            compute_scope(Some(&customer), Some(&open), NOW).unwrap(),
            StoreScope::Store(5)
        );
        assert_eq!(code(compute_scope(None, Some(&closed), NOW)), ErrorCode::StoreInactive);
        let deactivated = store(5, SubscriptionStatus::Active, false);
        assert_eq!(
            code(compute_scope(Some(&customer), Some(&deactivated), NOW)),
            ErrorCode::StoreInactive
        );
    }

    #[test]
    fn test_super_admin() {
        let admin = user(UserRole::SuperAdmin, None);
        assert_eq!(compute_scope(Some(&admin), None, NOW).unwrap(), StoreScope::AllStores);
        let cancelled = store(8, SubscriptionStatus::Cancelled, false);
        assert_eq!(
            compute_scope(Some(&admin), Some(&cancelled), NOW).unwrap(),
            StoreScope::Store(8)
        );
    }

    #[test]
    fn test_store_admin() {
        let admin = user(UserRole::StoreAdmin, Some(5));
        let own = store(5, SubscriptionStatus::Trial, true);
        let other = store(6, SubscriptionStatus::Active, true);

        assert_eq!(
            compute_scope(Some(&admin), Some(&own), NOW).unwrap(),
            StoreScope::Store(5)
        );
        assert_eq!(
            code(compute_scope(Some(&admin), Some(&other), NOW)),
            ErrorCode::PermissionDenied
        );
        assert_eq!(
            code(compute_scope(Some(&admin), None, NOW)),
            ErrorCode::StoreNotSelected
        );

        let without_claim = user(UserRole::StoreAdmin, None);
        assert_eq!(
            code(compute_scope(Some(&without_claim), Some(&own), NOW)),
            ErrorCode::StoreNotSelected
        );

        let mut expired = store(5, SubscriptionStatus::Trial, true);
        expired.subscription_expires_at = Some(NOW - 1);
        assert_eq!(
            code(compute_scope(Some(&admin), Some(&expired), NOW)),
            ErrorCode::StoreInactive
        );
    }

    #[test]
    fn test_scope_helpers() {
        assert_eq!(StoreScope::AllStores.store_id(), None);
        assert_eq!(StoreScope::Store(3).store_id(), Some(3));
        assert_eq!(StoreScope::Store(3).require_store().unwrap(), 3);
        assert_eq!(
            StoreScope::AllStores.require_store().unwrap_err().code,
            ErrorCode::StoreNotSelected
        );
    }
}

//! Statistics views

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::order::{OrderStatus, PaymentMethod};
use super::store::SubscriptionStatus;
use super::user::UserRole;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMethodStat {
    pub method: PaymentMethod,
    pub orders: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: i64,
}

/// Revenue for one UTC day (`YYYY-MM-DD`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRevenue {
    pub date: String,
    pub orders: i64,
    pub revenue: Decimal,
}

/// Store payment statistics over the last `days`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub store_id: i64,
    pub days: u32,
    pub since: i64,
    /// Paid, non-cancelled orders
    pub paid_orders: i64,
    pub revenue: Decimal,
    pub average_order_value: Decimal,
    pub by_payment_method: Vec<PaymentMethodStat>,
    pub by_status: Vec<StatusCount>,
    pub daily: Vec<DailyRevenue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionCount {
    pub status: SubscriptionStatus,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleCount {
    pub role: UserRole,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopStore {
    pub store_id: i64,
    pub name: String,
    pub orders: i64,
    pub revenue: Decimal,
}

/// Platform-wide overview (super admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformOverview {
    pub total_stores: i64,
    pub active_stores: i64,
    pub stores_by_status: Vec<SubscriptionCount>,
    pub users_by_role: Vec<RoleCount>,
    pub total_orders: i64,
    pub total_revenue: Decimal,
    pub top_stores: Vec<TopStore>,
}

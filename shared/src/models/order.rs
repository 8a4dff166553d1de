//! Order Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How the order is fulfilled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    DineIn,
    Takeaway,
    Delivery,
}

impl OrderType {
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "dine_in" => Some(Self::DineIn),
            "takeaway" => Some(Self::Takeaway),
            "delivery" => Some(Self::Delivery),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::DineIn => "dine_in",
            Self::Takeaway => "takeaway",
            Self::Delivery => "delivery",
        }
    }
}

/// Kitchen/service progress of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Served,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        Self::Pending,
        Self::Confirmed,
        Self::Preparing,
        Self::Ready,
        Self::Served,
        Self::Completed,
        Self::Cancelled,
    ];

    pub fn from_db(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|st| st.as_db() == s)
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Served => "served",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Online,
}

impl PaymentMethod {
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(Self::Cash),
            "card" => Some(Self::Card),
            "online" => Some(Self::Online),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Online => "online",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            "refunded" => Some(Self::Refunded),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Refunded => "refunded",
        }
    }
}

/// Cart line snapshot; name and price are frozen at order time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub food_id: i64,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub line_total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub store_id: i64,
    /// Per-store sequence, starts at 1
    pub order_number: i64,
    pub customer_id: Option<i64>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub order_type: OrderType,
    pub table_id: Option<i64>,
    pub table_name: Option<String>,
    pub delivery_address: Option<String>,
    pub delivery_zone: Option<String>,
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    pub notes: Option<String>,
    /// Staff member who entered the order at the counter
    pub created_by: Option<i64>,
    pub paid_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Requested cart line; only id and quantity are trusted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemInput {
    pub food_id: i64,
    pub quantity: i32,
    pub notes: Option<String>,
}

/// Place order payload (customer or counter)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub order_type: OrderType,
    pub items: Vec<OrderItemInput>,
    pub payment_method: PaymentMethod,
    pub table_id: Option<i64>,
    /// QR token scanned at the table; alternative to `table_id`
    pub table_token: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub delivery_address: Option<String>,
    pub delivery_zone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PaymentStatusUpdate {
    pub payment_status: PaymentStatus,
}

/// List filters for store orders; `from`/`to` are Unix millis
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub order_type: Option<OrderType>,
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_db_strings_match_serde() {
        for status in OrderStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_db()));
            assert_eq!(OrderStatus::from_db(status.as_db()), Some(status));
        }
        assert_eq!(OrderType::from_db("dine_in"), Some(OrderType::DineIn));
        assert_eq!(PaymentMethod::from_db("online"), Some(PaymentMethod::Online));
        assert_eq!(PaymentStatus::from_db("refunded"), Some(PaymentStatus::Refunded));
        assert_eq!(OrderStatus::from_db("done"), None);
    }

    #[test]
    fn test_order_create_from_json() {
        let body = r#"{
            "order_type": "dine_in",
            "payment_method": "cash",
            "table_token": "abc",
            "items": [{"food_id": 7, "quantity": 2}]
        }"#;
        let req: OrderCreate = serde_json::from_str(body).unwrap();
        assert_eq!(req.order_type, OrderType::DineIn);
        assert_eq!(req.items.len(), 1);
        assert!(req.items[0].notes.is_none());
        assert!(req.table_id.is_none());
    }
}

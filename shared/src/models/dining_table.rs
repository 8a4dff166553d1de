//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Dining table with its QR token
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DiningTable {
    pub id: i64,
    pub store_id: i64,
    pub name: String,
    pub capacity: i32,
    /// Area label, e.g. "Terrace"
    pub location: Option<String>,
    pub qr_token: String,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Table plus the URL encoded in its QR code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableView {
    #[serde(flatten)]
    pub table: DiningTable,
    pub qr_url: String,
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableCreate {
    pub name: String,
    pub capacity: Option<i32>,
    pub location: Option<String>,
    pub is_active: Option<bool>,
}

/// Update dining table payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiningTableUpdate {
    pub name: Option<String>,
    pub capacity: Option<i32>,
    pub location: Option<String>,
    pub is_active: Option<bool>,
}

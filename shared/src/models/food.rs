//! Food (menu item) Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Menu item, scoped to one store and one category of that store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Food {
    pub id: i64,
    pub store_id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image: Option<String>,
    pub is_available: bool,
    pub is_featured: bool,
    pub preparation_minutes: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub allergens: Vec<String>,
    pub sort_order: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create food payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodCreate {
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image: Option<String>,
    pub is_available: Option<bool>,
    pub is_featured: Option<bool>,
    pub preparation_minutes: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub allergens: Vec<String>,
    pub sort_order: Option<i32>,
}

/// Update food payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoodUpdate {
    pub category_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub image: Option<String>,
    pub is_available: Option<bool>,
    pub is_featured: Option<bool>,
    pub preparation_minutes: Option<i32>,
    pub tags: Option<Vec<String>>,
    pub allergens: Option<Vec<String>>,
    pub sort_order: Option<i32>,
}

/// List filters for `GET /foods`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoodQuery {
    pub category_id: Option<i64>,
    #[serde(alias = "available")]
    pub is_available: Option<bool>,
    pub is_featured: Option<bool>,
    /// Case-insensitive name match
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

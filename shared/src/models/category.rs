//! Category Model

use serde::{Deserialize, Serialize};

/// Menu category, scoped to one store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub store_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,

    /// Number of foods in this category (populated by list queries)
    #[cfg_attr(feature = "db", sqlx(default))]
    #[serde(default)]
    pub food_count: i64,
}

/// Create category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// Update category payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// One entry of a batch reorder
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SortOrderEntry {
    pub id: i64,
    pub sort_order: i32,
}

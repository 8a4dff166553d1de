//! Banner Model

use serde::{Deserialize, Serialize};

/// Promotional banner on the customer menu
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Banner {
    pub id: i64,
    pub store_id: i64,
    pub title: String,
    pub subtitle: Option<String>,
    pub image: String,
    /// Optional deep link (e.g. a food or category)
    pub link: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub starts_at: Option<i64>,
    pub ends_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Banner {
    /// Active and inside its optional display window
    pub fn is_visible(&self, now: i64) -> bool {
        self.is_active
            && self.starts_at.is_none_or(|s| s <= now)
            && self.ends_at.is_none_or(|e| e > now)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BannerCreate {
    pub title: String,
    pub subtitle: Option<String>,
    pub image: String,
    pub link: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
    pub starts_at: Option<i64>,
    pub ends_at: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BannerUpdate {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub image: Option<String>,
    pub link: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
    pub starts_at: Option<i64>,
    pub ends_at: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_window() {
        let mut banner = Banner {
            id: 1,
            store_id: 1,
            title: "Happy hour".into(),
            subtitle: None,
            image: "/uploads/1/a.jpg".into(),
            link: None,
            sort_order: 0,
            is_active: true,
            starts_at: Some(100),
            ends_at: Some(200),
            created_at: 0,
            updated_at: 0,
        };
        assert!(!banner.is_visible(50));
        assert!(banner.is_visible(100));
        assert!(!banner.is_visible(200));

        banner.starts_at = None;
        banner.ends_at = None;
        assert!(banner.is_visible(0));

        banner.is_active = false;
        assert!(!banner.is_visible(0));
    }
}

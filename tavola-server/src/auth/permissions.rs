//! Permission Definitions
//!
//! Store admins are granted module permissions; super admins implicitly hold all of them.

pub const MENU_MANAGE: &str = "menu:manage";
pub const BANNERS_MANAGE: &str = "banners:manage";
pub const TABLES_MANAGE: &str = "tables:manage";
pub const ORDERS_MANAGE: &str = "orders:manage";
pub const STATS_VIEW: &str = "stats:view";
pub const SETTINGS_MANAGE: &str = "settings:manage";

/// Grants every permission
pub const ALL: &str = "all";

/// Assignable permissions
pub const ALL_PERMISSIONS: &[&str] = &[
    MENU_MANAGE,
    BANNERS_MANAGE,
    TABLES_MANAGE,
    ORDERS_MANAGE,
    STATS_VIEW,
    SETTINGS_MANAGE,
];

/// Default for a newly created store admin (store owner)
pub const DEFAULT_STORE_ADMIN_PERMISSIONS: &[&str] = &[ALL];

pub fn default_store_admin_permissions() -> Vec<String> {
    DEFAULT_STORE_ADMIN_PERMISSIONS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Accepts `all`, a known permission, or a `module:*` wildcard of a known module
pub fn is_valid_permission(permission: &str) -> bool {
    if permission == ALL || ALL_PERMISSIONS.contains(&permission) {
        return true;
    }
    permission.strip_suffix(":*").is_some_and(|module| {
        ALL_PERMISSIONS
            .iter()
            .any(|p| p.split(':').next() == Some(module))
    })
}

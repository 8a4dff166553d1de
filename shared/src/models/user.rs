//! User Model

use serde::{Deserialize, Serialize};

/// Platform role; a user has exactly one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Platform operator, sees every store
    SuperAdmin,
    /// Manages exactly one store
    StoreAdmin,
    /// Orders from any store
    Customer,
}

impl UserRole {
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "super_admin" => Some(Self::SuperAdmin),
            "store_admin" => Some(Self::StoreAdmin),
            "customer" => Some(Self::Customer),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::StoreAdmin => "store_admin",
            Self::Customer => "customer",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_db())
    }
}

/// User entity (password hash never leaves the server)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: UserRole,
    /// Set only for store admins
    pub store_id: Option<i64>,
    /// Store admin permissions, e.g. `menu:manage`, `all`
    #[serde(default)]
    pub permissions: Vec<String>,
    pub is_active: bool,
    pub last_login_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Self-registration payload (always creates a customer)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Profile update for the signed-in user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// Create user payload (super admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub store_id: Option<i64>,
    /// Defaults to `["all"]` for store admins
    pub permissions: Option<Vec<String>>,
}

/// Update user payload (super admin)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<UserRole>,
    pub store_id: Option<i64>,
    pub permissions: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serde_matches_db() {
        for role in [UserRole::SuperAdmin, UserRole::StoreAdmin, UserRole::Customer] {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_db()));
            assert_eq!(UserRole::from_db(role.as_db()), Some(role));
        }
        assert_eq!(UserRole::from_db("admin"), None);
    }
}

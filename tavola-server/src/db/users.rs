//! User account queries

use shared::error::{AppError, ErrorCode};
use shared::models::{User, UserRole};
use sqlx::{PgExecutor, PgPool};

use super::decode_enum;
use crate::BoxError;
use crate::error::{ServiceError, ServiceResult};

const COLUMNS: &str = "id, name, email, phone, password_hash, role, store_id, permissions, \
     is_active, last_login_at, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    phone: Option<String>,
    password_hash: String,
    role: String,
    store_id: Option<i64>,
    permissions: Vec<String>,
    is_active: bool,
    last_login_at: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl UserRow {
    fn into_parts(self) -> Result<(User, String), BoxError> {
        let user = User {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            role: decode_enum(&self.role, "role", UserRole::from_db)?,
            store_id: self.store_id,
            permissions: self.permissions,
            is_active: self.is_active,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        Ok((user, self.password_hash))
    }

    fn into_user(self) -> Result<User, BoxError> {
        self.into_parts().map(|(user, _)| user)
    }
}

fn map_conflict(e: ServiceError) -> ServiceError {
    e.on_conflict("users_email_key", || {
        AppError::with_message(ErrorCode::EmailExists, "Email is already registered")
    })
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> ServiceResult<Option<User>> {
    let row: Option<UserRow> = sqlx::query_as(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(UserRow::into_user).transpose()?)
}

/// User plus password hash, for credential checks
pub async fn find_credentials_by_email(
    pool: &PgPool,
    email: &str,
) -> ServiceResult<Option<(User, String)>> {
    let row: Option<UserRow> =
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(UserRow::into_parts).transpose()?)
}

pub async fn find_password_hash(pool: &PgPool, id: i64) -> ServiceResult<Option<String>> {
    let hash = sqlx::query_scalar("SELECT password_hash FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(hash)
}

pub async fn count_super_admins(pool: &PgPool) -> ServiceResult<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'super_admin'")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn list(
    pool: &PgPool,
    role: Option<UserRole>,
    store_id: Option<i64>,
    limit: u32,
    offset: i64,
) -> ServiceResult<(Vec<User>, u64)> {
    let role = role.map(|r| r.as_db());
    let filter = "($1::TEXT IS NULL OR role = $1) AND ($2::BIGINT IS NULL OR store_id = $2)";

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM users WHERE {filter}"))
        .bind(role)
        .bind(store_id)
        .fetch_one(pool)
        .await?;

    let rows: Vec<UserRow> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM users WHERE {filter}
         ORDER BY created_at DESC, id DESC
         LIMIT $3 OFFSET $4"
    ))
    .bind(role)
    .bind(store_id)
    .bind(i64::from(limit))
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let users = rows
        .into_iter()
        .map(UserRow::into_user)
        .collect::<Result<Vec<_>, _>>()?;
    Ok((users, total.max(0) as u64))
}

pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub password_hash: &'a str,
    pub role: UserRole,
    pub store_id: Option<i64>,
    pub permissions: &'a [String],
}

pub async fn insert(db: impl PgExecutor<'_>, user: &NewUser<'_>) -> ServiceResult<User> {
    let now = shared::util::now_millis();
    let row: UserRow = sqlx::query_as(&format!(
        "INSERT INTO users (id, name, email, phone, password_hash, role, store_id, permissions,
             is_active, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE, $9, $9)
         RETURNING {COLUMNS}"
    ))
    .bind(shared::util::snowflake_id())
    .bind(user.name)
    .bind(user.email)
    .bind(user.phone)
    .bind(user.password_hash)
    .bind(user.role.as_db())
    .bind(user.store_id)
    .bind(user.permissions)
    .bind(now)
    .fetch_one(db)
    .await
    .map_err(|e| map_conflict(e.into()))?;
    Ok(row.into_user()?)
}

/// Full replacement of the admin-editable fields (the caller merges the patch)
pub struct UserChanges<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub role: UserRole,
    pub store_id: Option<i64>,
    pub permissions: &'a [String],
    pub is_active: bool,
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    changes: &UserChanges<'_>,
    now: i64,
) -> ServiceResult<Option<User>> {
    let row: Option<UserRow> = sqlx::query_as(&format!(
        "UPDATE users SET name = $2, email = $3, phone = $4, role = $5, store_id = $6,
             permissions = $7, is_active = $8, updated_at = $9
         WHERE id = $1
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(changes.name)
    .bind(changes.email)
    .bind(changes.phone)
    .bind(changes.role.as_db())
    .bind(changes.store_id)
    .bind(changes.permissions)
    .bind(changes.is_active)
    .bind(now)
    .fetch_optional(pool)
    .await
    .map_err(|e| map_conflict(e.into()))?;
    Ok(row.map(UserRow::into_user).transpose()?)
}

pub async fn update_profile(
    pool: &PgPool,
    id: i64,
    name: Option<&str>,
    phone: Option<&str>,
    now: i64,
) -> ServiceResult<Option<User>> {
    let row: Option<UserRow> = sqlx::query_as(&format!(
        "UPDATE users SET name = COALESCE($2, name), phone = COALESCE($3, phone), updated_at = $4
         WHERE id = $1
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(name)
    .bind(phone)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(UserRow::into_user).transpose()?)
}

pub async fn update_password(
    pool: &PgPool,
    id: i64,
    password_hash: &str,
    now: i64,
) -> ServiceResult<bool> {
    let result = sqlx::query("UPDATE users SET password_hash = $2, updated_at = $3 WHERE id = $1")
        .bind(id)
        .bind(password_hash)
        .bind(now)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn touch_login(pool: &PgPool, id: i64, now: i64) -> ServiceResult<()> {
    sqlx::query("UPDATE users SET last_login_at = $2 WHERE id = $1")
        .bind(id)
        .bind(now)
        .execute(pool)
        .await?;
    Ok(())
}

/// Make a customer the admin of `store_id`.
///
/// Returns `false` when the user does not exist or is not a customer.
pub async fn promote_to_store_admin(
    db: impl PgExecutor<'_>,
    id: i64,
    store_id: i64,
    permissions: &[String],
    now: i64,
) -> ServiceResult<bool> {
    let result = sqlx::query(
        "UPDATE users SET role = 'store_admin', store_id = $2, permissions = $3, updated_at = $4
         WHERE id = $1 AND role = 'customer'",
    )
    .bind(id)
    .bind(store_id)
    .bind(permissions)
    .bind(now)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete(pool: &PgPool, id: i64) -> ServiceResult<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

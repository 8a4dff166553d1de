//! Store (tenant) queries

use shared::error::{AppError, ErrorCode};
use shared::models::{
    Store, StoreCustomization, StoreSettings, StoreSettingsUpdate, StoreUpdate, SubscriptionPlan,
    SubscriptionStatus,
};
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};

use super::{decode_enum, like_pattern};
use crate::BoxError;
use crate::error::{ServiceError, ServiceResult};

const COLUMNS: &str = "id, name, slug, subdomain, owner_id, description, phone, email, address, \
     plan, subscription_status, subscription_expires_at, settings, customization, is_active, \
     created_at, updated_at";

#[derive(sqlx::FromRow)]
struct StoreRow {
    id: i64,
    name: String,
    slug: String,
    subdomain: Option<String>,
    owner_id: Option<i64>,
    description: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
    plan: String,
    subscription_status: String,
    subscription_expires_at: Option<i64>,
    settings: Json<StoreSettings>,
    customization: Json<StoreCustomization>,
    is_active: bool,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<StoreRow> for Store {
    type Error = BoxError;

    fn try_from(row: StoreRow) -> Result<Self, Self::Error> {
        Ok(Store {
            id: row.id,
            name: row.name,
            slug: row.slug,
            subdomain: row.subdomain,
            owner_id: row.owner_id,
            description: row.description,
            phone: row.phone,
            email: row.email,
            address: row.address,
            plan: decode_enum(&row.plan, "plan", SubscriptionPlan::from_db)?,
            subscription_status: decode_enum(
                &row.subscription_status,
                "subscription_status",
                SubscriptionStatus::from_db,
            )?,
            subscription_expires_at: row.subscription_expires_at,
            settings: row.settings.0,
            customization: row.customization.0,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_store(row: Option<StoreRow>) -> ServiceResult<Option<Store>> {
    Ok(row.map(Store::try_from).transpose()?)
}

/// Map slug/subdomain unique violations to `StoreSlugExists`
fn map_conflict(e: ServiceError) -> ServiceError {
    e.on_conflict("stores_slug_key", || {
        AppError::with_message(ErrorCode::StoreSlugExists, "Store slug is already taken")
    })
    .on_conflict("stores_subdomain_key", || {
        AppError::with_message(ErrorCode::StoreSlugExists, "Store subdomain is already taken")
    })
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> ServiceResult<Option<Store>> {
    let row: Option<StoreRow> =
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM stores WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    into_store(row)
}

pub async fn find_by_slug(pool: &PgPool, slug: &str) -> ServiceResult<Option<Store>> {
    let row: Option<StoreRow> =
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM stores WHERE slug = $1"))
            .bind(slug)
            .fetch_optional(pool)
            .await?;
    into_store(row)
}

/// Match a host label against `subdomain`, falling back to `slug`
pub async fn find_by_subdomain(pool: &PgPool, label: &str) -> ServiceResult<Option<Store>> {
    let row: Option<StoreRow> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM stores
         WHERE subdomain = $1 OR slug = $1
         ORDER BY COALESCE(subdomain = $1, FALSE) DESC
         LIMIT 1"
    ))
    .bind(label)
    .fetch_optional(pool)
    .await?;
    into_store(row)
}

pub async fn exists(pool: &PgPool, id: i64) -> ServiceResult<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM stores WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

/// Paginated listing with optional status filter and name/slug search
pub async fn list(
    pool: &PgPool,
    status: Option<SubscriptionStatus>,
    search: Option<&str>,
    limit: u32,
    offset: i64,
) -> ServiceResult<(Vec<Store>, u64)> {
    let status = status.map(|s| s.as_db());
    let pattern = search
        .filter(|s| !s.trim().is_empty())
        .map(like_pattern);
    let filter = "($1::TEXT IS NULL OR subscription_status = $1)
         AND ($2::TEXT IS NULL OR name ILIKE $2 OR slug ILIKE $2)";

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM stores WHERE {filter}"))
        .bind(status)
        .bind(pattern.as_deref())
        .fetch_one(pool)
        .await?;

    let rows: Vec<StoreRow> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM stores WHERE {filter}
         ORDER BY created_at DESC, id DESC
         LIMIT $3 OFFSET $4"
    ))
    .bind(status)
    .bind(pattern.as_deref())
    .bind(i64::from(limit))
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let stores = rows
        .into_iter()
        .map(Store::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok((stores, total.max(0) as u64))
}

pub struct NewStore<'a> {
    pub id: i64,
    pub name: &'a str,
    pub slug: &'a str,
    pub subdomain: Option<&'a str>,
    pub owner_id: Option<i64>,
    pub description: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub email: Option<&'a str>,
    pub address: Option<&'a str>,
    pub plan: SubscriptionPlan,
    pub subscription_status: SubscriptionStatus,
    pub subscription_expires_at: Option<i64>,
    pub settings: &'a StoreSettings,
    pub customization: &'a StoreCustomization,
    pub now: i64,
}

pub async fn insert(db: impl PgExecutor<'_>, store: &NewStore<'_>) -> ServiceResult<Store> {
    let row: StoreRow = sqlx::query_as(&format!(
        "INSERT INTO stores (id, name, slug, subdomain, owner_id, description, phone, email,
             address, plan, subscription_status, subscription_expires_at, settings, customization,
             is_active, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, TRUE, $15, $15)
         RETURNING {COLUMNS}"
    ))
    .bind(store.id)
    .bind(store.name)
    .bind(store.slug)
    .bind(store.subdomain)
    .bind(store.owner_id)
    .bind(store.description)
    .bind(store.phone)
    .bind(store.email)
    .bind(store.address)
    .bind(store.plan.as_db())
    .bind(store.subscription_status.as_db())
    .bind(store.subscription_expires_at)
    .bind(Json(store.settings))
    .bind(Json(store.customization))
    .bind(store.now)
    .fetch_one(db)
    .await
    .map_err(|e| map_conflict(e.into()))?;
    Ok(Store::try_from(row)?)
}

/// Super admin update; absent fields keep their value
pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &StoreUpdate,
    now: i64,
) -> ServiceResult<Option<Store>> {
    let row: Option<StoreRow> = sqlx::query_as(&format!(
        "UPDATE stores SET
             name = COALESCE($2, name),
             slug = COALESCE($3, slug),
             subdomain = COALESCE($4, subdomain),
             description = COALESCE($5, description),
             phone = COALESCE($6, phone),
             email = COALESCE($7, email),
             address = COALESCE($8, address),
             settings = COALESCE($9, settings),
             customization = COALESCE($10, customization),
             updated_at = $11
         WHERE id = $1
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(data.name.as_deref())
    .bind(data.slug.as_deref())
    .bind(data.subdomain.as_deref())
    .bind(data.description.as_deref())
    .bind(data.phone.as_deref())
    .bind(data.email.as_deref())
    .bind(data.address.as_deref())
    .bind(data.settings.as_ref().map(Json))
    .bind(data.customization.as_ref().map(Json))
    .bind(now)
    .fetch_optional(pool)
    .await
    .map_err(|e| map_conflict(e.into()))?;
    into_store(row)
}

/// Store admin update of the own store's profile, settings and branding
pub async fn update_profile(
    pool: &PgPool,
    id: i64,
    data: &StoreSettingsUpdate,
    now: i64,
) -> ServiceResult<Option<Store>> {
    let row: Option<StoreRow> = sqlx::query_as(&format!(
        "UPDATE stores SET
             name = COALESCE($2, name),
             description = COALESCE($3, description),
             phone = COALESCE($4, phone),
             email = COALESCE($5, email),
             address = COALESCE($6, address),
             settings = COALESCE($7, settings),
             customization = COALESCE($8, customization),
             updated_at = $9
         WHERE id = $1
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(data.name.as_deref())
    .bind(data.description.as_deref())
    .bind(data.phone.as_deref())
    .bind(data.email.as_deref())
    .bind(data.address.as_deref())
    .bind(data.settings.as_ref().map(Json))
    .bind(data.customization.as_ref().map(Json))
    .bind(now)
    .fetch_optional(pool)
    .await?;
    into_store(row)
}

pub async fn update_subscription(
    pool: &PgPool,
    id: i64,
    plan: Option<SubscriptionPlan>,
    status: Option<SubscriptionStatus>,
    expires_at: Option<i64>,
    clear_expiry: bool,
    now: i64,
) -> ServiceResult<Option<Store>> {
    let row: Option<StoreRow> = sqlx::query_as(&format!(
        "UPDATE stores SET
             plan = COALESCE($2, plan),
             subscription_status = COALESCE($3, subscription_status),
             subscription_expires_at = CASE WHEN $5 THEN NULL
                                            ELSE COALESCE($4, subscription_expires_at) END,
             updated_at = $6
         WHERE id = $1
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(plan.map(|p| p.as_db()))
    .bind(status.map(|s| s.as_db()))
    .bind(expires_at)
    .bind(clear_expiry)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    into_store(row)
}

pub async fn set_active(
    pool: &PgPool,
    id: i64,
    is_active: bool,
    now: i64,
) -> ServiceResult<Option<Store>> {
    let row: Option<StoreRow> = sqlx::query_as(&format!(
        "UPDATE stores SET is_active = $2, updated_at = $3 WHERE id = $1 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(is_active)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    into_store(row)
}

pub async fn set_owner(
    db: impl PgExecutor<'_>,
    id: i64,
    owner_id: i64,
    now: i64,
) -> ServiceResult<Store> {
    let row: StoreRow = sqlx::query_as(&format!(
        "UPDATE stores SET owner_id = $2, updated_at = $3 WHERE id = $1 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(owner_id)
    .bind(now)
    .fetch_one(db)
    .await?;
    Ok(Store::try_from(row)?)
}

/// Delete a store; menu, tables, orders and its admins cascade
pub async fn delete(pool: &PgPool, id: i64) -> ServiceResult<bool> {
    let result = sqlx::query("DELETE FROM stores WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

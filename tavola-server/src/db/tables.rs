//! Dining table queries
//!
//! Reads return the owning store's slug alongside each table so callers can
//! build the QR URL without another lookup.

use shared::error::{AppError, ErrorCode};
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate};
use sqlx::PgPool;

use crate::error::{ServiceError, ServiceResult};

const COLUMNS: &str = "id, store_id, name, capacity, location, qr_token, is_active, created_at, updated_at";

const SELECT_WITH_SLUG: &str = "SELECT t.id, t.store_id, t.name, t.capacity, t.location, t.qr_token,
         t.is_active, t.created_at, t.updated_at, s.slug AS store_slug
     FROM dining_tables t
     JOIN stores s ON s.id = t.store_id";

#[derive(sqlx::FromRow)]
struct TableWithSlug {
    #[sqlx(flatten)]
    table: DiningTable,
    store_slug: String,
}

impl From<TableWithSlug> for (DiningTable, String) {
    fn from(row: TableWithSlug) -> Self {
        (row.table, row.store_slug)
    }
}

fn map_conflict(e: ServiceError) -> ServiceError {
    e.on_conflict("dining_tables_store_name_key", || {
        AppError::with_message(ErrorCode::TableNameExists, "A table with this name already exists")
    })
}

pub async fn list(
    pool: &PgPool,
    store_id: Option<i64>,
) -> ServiceResult<Vec<(DiningTable, String)>> {
    let rows: Vec<TableWithSlug> = sqlx::query_as(&format!(
        "{SELECT_WITH_SLUG} WHERE ($1::BIGINT IS NULL OR t.store_id = $1)
         ORDER BY t.store_id, t.name"
    ))
    .bind(store_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn find(
    pool: &PgPool,
    store_id: Option<i64>,
    id: i64,
) -> ServiceResult<Option<(DiningTable, String)>> {
    let row: Option<TableWithSlug> = sqlx::query_as(&format!(
        "{SELECT_WITH_SLUG} WHERE t.id = $1 AND ($2::BIGINT IS NULL OR t.store_id = $2)"
    ))
    .bind(id)
    .bind(store_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Into::into))
}

pub async fn find_by_token(
    pool: &PgPool,
    store_id: i64,
    qr_token: &str,
) -> ServiceResult<Option<DiningTable>> {
    let table = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM dining_tables WHERE qr_token = $1 AND store_id = $2"
    ))
    .bind(qr_token)
    .bind(store_id)
    .fetch_optional(pool)
    .await?;
    Ok(table)
}

pub async fn find_in_store(
    pool: &PgPool,
    store_id: i64,
    id: i64,
) -> ServiceResult<Option<DiningTable>> {
    let table = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM dining_tables WHERE id = $1 AND store_id = $2"
    ))
    .bind(id)
    .bind(store_id)
    .fetch_optional(pool)
    .await?;
    Ok(table)
}

pub async fn insert(
    pool: &PgPool,
    store_id: i64,
    data: &DiningTableCreate,
    qr_token: &str,
    now: i64,
) -> ServiceResult<DiningTable> {
    let table = sqlx::query_as(&format!(
        "INSERT INTO dining_tables (id, store_id, name, capacity, location, qr_token, is_active,
             created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
         RETURNING {COLUMNS}"
    ))
    .bind(shared::util::snowflake_id())
    .bind(store_id)
    .bind(data.name.trim())
    .bind(data.capacity.unwrap_or(4))
    .bind(data.location.as_deref())
    .bind(qr_token)
    .bind(data.is_active.unwrap_or(true))
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| map_conflict(e.into()))?;
    Ok(table)
}

pub async fn update(
    pool: &PgPool,
    store_id: i64,
    id: i64,
    data: &DiningTableUpdate,
    now: i64,
) -> ServiceResult<Option<DiningTable>> {
    let table = sqlx::query_as(&format!(
        "UPDATE dining_tables SET
             name = COALESCE($3, name),
             capacity = COALESCE($4, capacity),
             location = COALESCE($5, location),
             is_active = COALESCE($6, is_active),
             updated_at = $7
         WHERE id = $1 AND store_id = $2
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(store_id)
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.capacity)
    .bind(data.location.as_deref())
    .bind(data.is_active)
    .bind(now)
    .fetch_optional(pool)
    .await
    .map_err(|e| map_conflict(e.into()))?;
    Ok(table)
}

pub async fn set_token(
    pool: &PgPool,
    store_id: i64,
    id: i64,
    qr_token: &str,
    now: i64,
) -> ServiceResult<Option<DiningTable>> {
    let table = sqlx::query_as(&format!(
        "UPDATE dining_tables SET qr_token = $3, updated_at = $4
         WHERE id = $1 AND store_id = $2
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(store_id)
    .bind(qr_token)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    Ok(table)
}

/// Delete a table without open orders; `TableHasOrders` otherwise
pub async fn delete(pool: &PgPool, store_id: i64, id: i64) -> ServiceResult<bool> {
    let open = super::orders::count_open_for_table(pool, store_id, id).await?;
    if open > 0 {
        return Err(AppError::new(ErrorCode::TableHasOrders)
            .with_detail("open_orders", open)
            .into());
    }

    let result = sqlx::query("DELETE FROM dining_tables WHERE id = $1 AND store_id = $2")
        .bind(id)
        .bind(store_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

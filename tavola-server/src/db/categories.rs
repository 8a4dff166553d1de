//! Category queries

use shared::error::{AppError, ErrorCode};
use shared::models::{Category, CategoryCreate, CategoryUpdate, SortOrderEntry};
use sqlx::PgPool;

use crate::error::{ServiceError, ServiceResult};

const SELECT: &str = "SELECT c.id, c.store_id, c.name, c.description, c.image, c.sort_order,
         c.is_active, c.created_at, c.updated_at,
         (SELECT COUNT(*) FROM foods f WHERE f.category_id = c.id) AS food_count
     FROM categories c";

const RETURNING: &str = "RETURNING id, store_id, name, description, image, sort_order, is_active, \
     created_at, updated_at";

fn map_conflict(e: ServiceError) -> ServiceError {
    e.on_conflict("categories_store_name_key", || {
        AppError::with_message(
            ErrorCode::CategoryNameExists,
            "A category with this name already exists",
        )
    })
}

pub async fn list(pool: &PgPool, store_id: Option<i64>) -> ServiceResult<Vec<Category>> {
    let rows = sqlx::query_as(&format!(
        "{SELECT} WHERE ($1::BIGINT IS NULL OR c.store_id = $1)
         ORDER BY c.store_id, c.sort_order, c.name"
    ))
    .bind(store_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Active categories of a store, for the public menu
pub async fn list_active(pool: &PgPool, store_id: i64) -> ServiceResult<Vec<Category>> {
    let rows = sqlx::query_as(&format!(
        "{SELECT} WHERE c.store_id = $1 AND c.is_active ORDER BY c.sort_order, c.name"
    ))
    .bind(store_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find(
    pool: &PgPool,
    store_id: Option<i64>,
    id: i64,
) -> ServiceResult<Option<Category>> {
    let row = sqlx::query_as(&format!(
        "{SELECT} WHERE c.id = $1 AND ($2::BIGINT IS NULL OR c.store_id = $2)"
    ))
    .bind(id)
    .bind(store_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn exists_in_store(pool: &PgPool, store_id: i64, id: i64) -> ServiceResult<bool> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT id FROM categories WHERE id = $1 AND store_id = $2")
            .bind(id)
            .bind(store_id)
            .fetch_optional(pool)
            .await?;
    Ok(found.is_some())
}

pub async fn insert(
    pool: &PgPool,
    store_id: i64,
    data: &CategoryCreate,
    now: i64,
) -> ServiceResult<Category> {
    let row = sqlx::query_as(&format!(
        "INSERT INTO categories (id, store_id, name, description, image, sort_order, is_active,
             created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
         {RETURNING}"
    ))
    .bind(shared::util::snowflake_id())
    .bind(store_id)
    .bind(data.name.trim())
    .bind(data.description.as_deref())
    .bind(data.image.as_deref())
    .bind(data.sort_order.unwrap_or(0))
    .bind(data.is_active.unwrap_or(true))
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| map_conflict(e.into()))?;
    Ok(row)
}

pub async fn update(
    pool: &PgPool,
    store_id: i64,
    id: i64,
    data: &CategoryUpdate,
    now: i64,
) -> ServiceResult<Option<Category>> {
    let row = sqlx::query_as(&format!(
        "UPDATE categories SET
             name = COALESCE($3, name),
             description = COALESCE($4, description),
             image = COALESCE($5, image),
             sort_order = COALESCE($6, sort_order),
             is_active = COALESCE($7, is_active),
             updated_at = $8
         WHERE id = $1 AND store_id = $2
         {RETURNING}"
    ))
    .bind(id)
    .bind(store_id)
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.description.as_deref())
    .bind(data.image.as_deref())
    .bind(data.sort_order)
    .bind(data.is_active)
    .bind(now)
    .fetch_optional(pool)
    .await
    .map_err(|e| map_conflict(e.into()))?;
    Ok(row)
}

/// Delete an empty category; `CategoryHasFoods` while foods reference it
pub async fn delete(pool: &PgPool, store_id: i64, id: i64) -> ServiceResult<bool> {
    let foods: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM foods WHERE category_id = $1 AND store_id = $2",
    )
    .bind(id)
    .bind(store_id)
    .fetch_one(pool)
    .await?;
    if foods > 0 {
        return Err(AppError::new(ErrorCode::CategoryHasFoods)
            .with_detail("food_count", foods)
            .into());
    }

    let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND store_id = $2")
        .bind(id)
        .bind(store_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Apply a batch reorder atomically; ids of other stores are ignored.
///
/// Returns the number of categories updated.
pub async fn batch_sort(
    pool: &PgPool,
    store_id: i64,
    entries: &[SortOrderEntry],
    now: i64,
) -> ServiceResult<u64> {
    let mut tx = pool.begin().await?;
    let mut updated = 0;
    for entry in entries {
        let result = sqlx::query(
            "UPDATE categories SET sort_order = $3, updated_at = $4 WHERE id = $1 AND store_id = $2",
        )
        .bind(entry.id)
        .bind(store_id)
        .bind(entry.sort_order)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        updated += result.rows_affected();
    }
    tx.commit().await?;
    Ok(updated)
}

//! Food (menu item) queries

use std::collections::HashMap;

use shared::models::{Food, FoodCreate, FoodQuery, FoodUpdate};
use shared::order::MenuPrice;
use sqlx::PgPool;

use super::like_pattern;
use crate::error::ServiceResult;

const COLUMNS: &str = "id, store_id, category_id, name, description, price, image, is_available, \
     is_featured, preparation_minutes, tags, allergens, sort_order, created_at, updated_at";

const FILTER: &str = "($1::BIGINT IS NULL OR store_id = $1)
     AND ($2::BIGINT IS NULL OR category_id = $2)
     AND ($3::BOOLEAN IS NULL OR is_available = $3)
     AND ($4::BOOLEAN IS NULL OR is_featured = $4)
     AND ($5::TEXT IS NULL OR name ILIKE $5)";

pub async fn list(
    pool: &PgPool,
    store_id: Option<i64>,
    query: &FoodQuery,
    limit: u32,
    offset: i64,
) -> ServiceResult<(Vec<Food>, u64)> {
    let pattern = query
        .search
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(like_pattern);

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM foods WHERE {FILTER}"))
        .bind(store_id)
        .bind(query.category_id)
        .bind(query.is_available)
        .bind(query.is_featured)
        .bind(pattern.as_deref())
        .fetch_one(pool)
        .await?;

    let foods = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM foods WHERE {FILTER}
         ORDER BY sort_order, name, id
         LIMIT $6 OFFSET $7"
    ))
    .bind(store_id)
    .bind(query.category_id)
    .bind(query.is_available)
    .bind(query.is_featured)
    .bind(pattern.as_deref())
    .bind(i64::from(limit))
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok((foods, total.max(0) as u64))
}

/// Available foods in active categories, for the public menu
pub async fn list_menu(pool: &PgPool, store_id: i64) -> ServiceResult<Vec<Food>> {
    let foods = sqlx::query_as(
        "SELECT f.id, f.store_id, f.category_id, f.name, f.description, f.price, f.image,
             f.is_available, f.is_featured, f.preparation_minutes, f.tags, f.allergens,
             f.sort_order, f.created_at, f.updated_at
         FROM foods f
         JOIN categories c ON c.id = f.category_id
         WHERE f.store_id = $1 AND f.is_available AND c.is_active
         ORDER BY f.sort_order, f.name",
    )
    .bind(store_id)
    .fetch_all(pool)
    .await?;
    Ok(foods)
}

pub async fn find(pool: &PgPool, store_id: Option<i64>, id: i64) -> ServiceResult<Option<Food>> {
    let food = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM foods WHERE id = $1 AND ($2::BIGINT IS NULL OR store_id = $2)"
    ))
    .bind(id)
    .bind(store_id)
    .fetch_optional(pool)
    .await?;
    Ok(food)
}

/// Current prices of `ids` within one store; foreign ids are simply absent
pub async fn menu_prices(
    pool: &PgPool,
    store_id: i64,
    ids: &[i64],
) -> ServiceResult<HashMap<i64, MenuPrice>> {
    let rows: Vec<(i64, String, rust_decimal::Decimal, bool)> = sqlx::query_as(
        "SELECT id, name, price, is_available FROM foods WHERE store_id = $1 AND id = ANY($2)",
    )
    .bind(store_id)
    .bind(ids)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(food_id, name, price, is_available)| {
            (
                food_id,
                MenuPrice {
                    food_id,
                    name,
                    price,
                    is_available,
                },
            )
        })
        .collect())
}

pub async fn insert(
    pool: &PgPool,
    store_id: i64,
    data: &FoodCreate,
    now: i64,
) -> ServiceResult<Food> {
    let food = sqlx::query_as(&format!(
        "INSERT INTO foods (id, store_id, category_id, name, description, price, image,
             is_available, is_featured, preparation_minutes, tags, allergens, sort_order,
             created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $14)
         RETURNING {COLUMNS}"
    ))
    .bind(shared::util::snowflake_id())
    .bind(store_id)
    .bind(data.category_id)
    .bind(data.name.trim())
    .bind(data.description.as_deref())
    .bind(data.price)
    .bind(data.image.as_deref())
    .bind(data.is_available.unwrap_or(true))
    .bind(data.is_featured.unwrap_or(false))
    .bind(data.preparation_minutes)
    .bind(&data.tags)
    .bind(&data.allergens)
    .bind(data.sort_order.unwrap_or(0))
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(food)
}

pub async fn update(
    pool: &PgPool,
    store_id: i64,
    id: i64,
    data: &FoodUpdate,
    now: i64,
) -> ServiceResult<Option<Food>> {
    let food = sqlx::query_as(&format!(
        "UPDATE foods SET
             category_id = COALESCE($3, category_id),
             name = COALESCE($4, name),
             description = COALESCE($5, description),
             price = COALESCE($6, price),
             image = COALESCE($7, image),
             is_available = COALESCE($8, is_available),
             is_featured = COALESCE($9, is_featured),
             preparation_minutes = COALESCE($10, preparation_minutes),
             tags = COALESCE($11, tags),
             allergens = COALESCE($12, allergens),
             sort_order = COALESCE($13, sort_order),
             updated_at = $14
         WHERE id = $1 AND store_id = $2
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(store_id)
    .bind(data.category_id)
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.description.as_deref())
    .bind(data.price)
    .bind(data.image.as_deref())
    .bind(data.is_available)
    .bind(data.is_featured)
    .bind(data.preparation_minutes)
    .bind(data.tags.as_deref())
    .bind(data.allergens.as_deref())
    .bind(data.sort_order)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    Ok(food)
}

pub async fn toggle_availability(
    pool: &PgPool,
    store_id: i64,
    id: i64,
    now: i64,
) -> ServiceResult<Option<Food>> {
    let food = sqlx::query_as(&format!(
        "UPDATE foods SET is_available = NOT is_available, updated_at = $3
         WHERE id = $1 AND store_id = $2
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(store_id)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    Ok(food)
}

/// Orders keep their own item snapshot, so deleting a food never touches them
pub async fn delete(pool: &PgPool, store_id: i64, id: i64) -> ServiceResult<bool> {
    let result = sqlx::query("DELETE FROM foods WHERE id = $1 AND store_id = $2")
        .bind(id)
        .bind(store_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

//! Banner queries

use shared::models::{Banner, BannerCreate, BannerUpdate};
use sqlx::PgPool;

use crate::error::ServiceResult;

const COLUMNS: &str = "id, store_id, title, subtitle, image, link, sort_order, is_active, \
     starts_at, ends_at, created_at, updated_at";

pub async fn list(pool: &PgPool, store_id: Option<i64>) -> ServiceResult<Vec<Banner>> {
    let banners = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM banners WHERE ($1::BIGINT IS NULL OR store_id = $1)
         ORDER BY store_id, sort_order, created_at"
    ))
    .bind(store_id)
    .fetch_all(pool)
    .await?;
    Ok(banners)
}

/// Active banners inside their display window at `now`
pub async fn list_visible(pool: &PgPool, store_id: i64, now: i64) -> ServiceResult<Vec<Banner>> {
    let banners = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM banners
         WHERE store_id = $1 AND is_active
           AND (starts_at IS NULL OR starts_at <= $2)
           AND (ends_at IS NULL OR ends_at > $2)
         ORDER BY sort_order, created_at"
    ))
    .bind(store_id)
    .bind(now)
    .fetch_all(pool)
    .await?;
    Ok(banners)
}

pub async fn find(pool: &PgPool, store_id: Option<i64>, id: i64) -> ServiceResult<Option<Banner>> {
    let banner = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM banners WHERE id = $1 AND ($2::BIGINT IS NULL OR store_id = $2)"
    ))
    .bind(id)
    .bind(store_id)
    .fetch_optional(pool)
    .await?;
    Ok(banner)
}

pub async fn insert(
    pool: &PgPool,
    store_id: i64,
    data: &BannerCreate,
    now: i64,
) -> ServiceResult<Banner> {
    let banner = sqlx::query_as(&format!(
        "INSERT INTO banners (id, store_id, title, subtitle, image, link, sort_order, is_active,
             starts_at, ends_at, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
         RETURNING {COLUMNS}"
    ))
    .bind(shared::util::snowflake_id())
    .bind(store_id)
    .bind(data.title.trim())
    .bind(data.subtitle.as_deref())
    .bind(&data.image)
    .bind(data.link.as_deref())
    .bind(data.sort_order.unwrap_or(0))
    .bind(data.is_active.unwrap_or(true))
    .bind(data.starts_at)
    .bind(data.ends_at)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(banner)
}

pub async fn update(
    pool: &PgPool,
    store_id: i64,
    id: i64,
    data: &BannerUpdate,
    now: i64,
) -> ServiceResult<Option<Banner>> {
    let banner = sqlx::query_as(&format!(
        "UPDATE banners SET
             title = COALESCE($3, title),
             subtitle = COALESCE($4, subtitle),
             image = COALESCE($5, image),
             link = COALESCE($6, link),
             sort_order = COALESCE($7, sort_order),
             is_active = COALESCE($8, is_active),
             starts_at = COALESCE($9, starts_at),
             ends_at = COALESCE($10, ends_at),
             updated_at = $11
         WHERE id = $1 AND store_id = $2
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(store_id)
    .bind(data.title.as_deref().map(str::trim))
    .bind(data.subtitle.as_deref())
    .bind(data.image.as_deref())
    .bind(data.link.as_deref())
    .bind(data.sort_order)
    .bind(data.is_active)
    .bind(data.starts_at)
    .bind(data.ends_at)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    Ok(banner)
}

pub async fn delete(pool: &PgPool, store_id: i64, id: i64) -> ServiceResult<bool> {
    let result = sqlx::query("DELETE FROM banners WHERE id = $1 AND store_id = $2")
        .bind(id)
        .bind(store_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

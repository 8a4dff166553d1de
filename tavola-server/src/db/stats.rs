//! Statistics queries
//!
//! Revenue only counts orders that are paid and not cancelled.

use rust_decimal::Decimal;
use shared::models::{
    DailyRevenue, OrderStatus, PaymentMethod, PaymentMethodStat, PlatformOverview, RoleCount,
    StatusCount, StoreStats, SubscriptionCount, SubscriptionStatus, TopStore, UserRole,
};
use shared::order::money::round_money;
use sqlx::PgPool;

use super::decode_enum;
use crate::error::ServiceResult;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

const REVENUE_FILTER: &str =
    "store_id = $1 AND created_at >= $2 AND payment_status = 'paid' AND status <> 'cancelled'";

/// Payment statistics of one store over the last `days` days
pub async fn store_stats(
    pool: &PgPool,
    store_id: i64,
    days: u32,
    now: i64,
) -> ServiceResult<StoreStats> {
    let since = now - i64::from(days) * DAY_MS;

    let (paid_orders, revenue): (i64, Decimal) = sqlx::query_as(&format!(
        "SELECT COUNT(*), COALESCE(SUM(total), 0) FROM orders WHERE {REVENUE_FILTER}"
    ))
    .bind(store_id)
    .bind(since)
    .fetch_one(pool)
    .await?;

    let method_rows: Vec<(String, i64, Decimal)> = sqlx::query_as(&format!(
        "SELECT payment_method, COUNT(*), COALESCE(SUM(total), 0)
         FROM orders WHERE {REVENUE_FILTER}
         GROUP BY payment_method
         ORDER BY 3 DESC"
    ))
    .bind(store_id)
    .bind(since)
    .fetch_all(pool)
    .await?;

    let status_rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT status, COUNT(*) FROM orders
         WHERE store_id = $1 AND created_at >= $2
         GROUP BY status",
    )
    .bind(store_id)
    .bind(since)
    .fetch_all(pool)
    .await?;

    let daily: Vec<(String, i64, Decimal)> = sqlx::query_as(&format!(
        "SELECT to_char(to_timestamp(created_at / 1000.0) AT TIME ZONE 'UTC', 'YYYY-MM-DD') AS day,
                COUNT(*), COALESCE(SUM(total), 0)
         FROM orders WHERE {REVENUE_FILTER}
         GROUP BY day
         ORDER BY day"
    ))
    .bind(store_id)
    .bind(since)
    .fetch_all(pool)
    .await?;

    let by_payment_method = method_rows
        .into_iter()
        .map(|(method, orders, revenue)| {
            Ok(PaymentMethodStat {
                method: decode_enum(&method, "payment_method", PaymentMethod::from_db)?,
                orders,
                revenue,
            })
        })
        .collect::<Result<Vec<_>, crate::BoxError>>()?;

    // Every status is reported, zero included
    let mut by_status: Vec<StatusCount> = OrderStatus::ALL
        .iter()
        .map(|&status| StatusCount { status, count: 0 })
        .collect();
    for (status, count) in status_rows {
        let status = decode_enum(&status, "status", OrderStatus::from_db)?;
        if let Some(entry) = by_status.iter_mut().find(|e| e.status == status) {
            entry.count = count;
        }
    }

    let average_order_value = if paid_orders > 0 {
        round_money(revenue / Decimal::from(paid_orders))
    } else {
        Decimal::ZERO
    };

    Ok(StoreStats {
        store_id,
        days,
        since,
        paid_orders,
        revenue,
        average_order_value,
        by_payment_method,
        by_status,
        daily: daily
            .into_iter()
            .map(|(date, orders, revenue)| DailyRevenue { date, orders, revenue })
            .collect(),
    })
}

/// Platform-wide counters for the super admin dashboard
pub async fn platform_overview(pool: &PgPool, top: u32) -> ServiceResult<PlatformOverview> {
    let (total_stores, active_stores): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_active) FROM stores",
    )
    .fetch_one(pool)
    .await?;

    let status_rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT subscription_status, COUNT(*) FROM stores GROUP BY subscription_status ORDER BY 1",
    )
    .fetch_all(pool)
    .await?;

    let role_rows: Vec<(String, i64)> =
        sqlx::query_as("SELECT role, COUNT(*) FROM users GROUP BY role ORDER BY 1")
            .fetch_all(pool)
            .await?;

    let (total_orders, total_revenue): (i64, Decimal) = sqlx::query_as(
        "SELECT COUNT(*),
                COALESCE(SUM(total) FILTER (WHERE payment_status = 'paid' AND status <> 'cancelled'), 0)
         FROM orders",
    )
    .fetch_one(pool)
    .await?;

    let top_stores: Vec<(i64, String, i64, Decimal)> = sqlx::query_as(
        "SELECT s.id, s.name, COUNT(o.id), COALESCE(SUM(o.total), 0)
         FROM stores s
         JOIN orders o ON o.store_id = s.id
         WHERE o.payment_status = 'paid' AND o.status <> 'cancelled'
         GROUP BY s.id, s.name
         ORDER BY 4 DESC, s.id
         LIMIT $1",
    )
    .bind(i64::from(top))
    .fetch_all(pool)
    .await?;

    let stores_by_status = status_rows
        .into_iter()
        .map(|(status, count)| {
            Ok(SubscriptionCount {
                status: decode_enum(&status, "subscription_status", SubscriptionStatus::from_db)?,
                count,
            })
        })
        .collect::<Result<Vec<_>, crate::BoxError>>()?;

    let users_by_role = role_rows
        .into_iter()
        .map(|(role, count)| {
            Ok(RoleCount {
                role: decode_enum(&role, "role", UserRole::from_db)?,
                count,
            })
        })
        .collect::<Result<Vec<_>, crate::BoxError>>()?;

    Ok(PlatformOverview {
        total_stores,
        active_stores,
        stores_by_status,
        users_by_role,
        total_orders,
        total_revenue,
        top_stores: top_stores
            .into_iter()
            .map(|(store_id, name, orders, revenue)| TopStore {
                store_id,
                name,
                orders,
                revenue,
            })
            .collect(),
    })
}

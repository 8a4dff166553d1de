//! Order queries

use rust_decimal::Decimal;
use shared::models::{
    Order, OrderItem, OrderQuery, OrderStatus, OrderType, PaymentMethod, PaymentStatus,
};
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};

use super::decode_enum;
use crate::BoxError;
use crate::error::ServiceResult;

const COLUMNS: &str = "id, store_id, order_number, customer_id, customer_name, customer_phone, \
     order_type, table_id, table_name, delivery_address, delivery_zone, items, subtotal, tax, \
     delivery_fee, total, payment_method, payment_status, status, notes, created_by, paid_at, \
     created_at, updated_at";

const FILTER: &str = "($1::BIGINT IS NULL OR store_id = $1)
     AND ($2::TEXT IS NULL OR status = $2)
     AND ($3::TEXT IS NULL OR payment_status = $3)
     AND ($4::TEXT IS NULL OR order_type = $4)
     AND ($5::BIGINT IS NULL OR created_at >= $5)
     AND ($6::BIGINT IS NULL OR created_at < $6)";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    store_id: i64,
    order_number: i64,
    customer_id: Option<i64>,
    customer_name: Option<String>,
    customer_phone: Option<String>,
    order_type: String,
    table_id: Option<i64>,
    table_name: Option<String>,
    delivery_address: Option<String>,
    delivery_zone: Option<String>,
    items: Json<Vec<OrderItem>>,
    subtotal: Decimal,
    tax: Decimal,
    delivery_fee: Decimal,
    total: Decimal,
    payment_method: String,
    payment_status: String,
    status: String,
    notes: Option<String>,
    created_by: Option<i64>,
    paid_at: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<OrderRow> for Order {
    type Error = BoxError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            id: row.id,
            store_id: row.store_id,
            order_number: row.order_number,
            customer_id: row.customer_id,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            order_type: decode_enum(&row.order_type, "order_type", OrderType::from_db)?,
            table_id: row.table_id,
            table_name: row.table_name,
            delivery_address: row.delivery_address,
            delivery_zone: row.delivery_zone,
            items: row.items.0,
            subtotal: row.subtotal,
            tax: row.tax,
            delivery_fee: row.delivery_fee,
            total: row.total,
            payment_method: decode_enum(
                &row.payment_method,
                "payment_method",
                PaymentMethod::from_db,
            )?,
            payment_status: decode_enum(
                &row.payment_status,
                "payment_status",
                PaymentStatus::from_db,
            )?,
            status: decode_enum(&row.status, "status", OrderStatus::from_db)?,
            notes: row.notes,
            created_by: row.created_by,
            paid_at: row.paid_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_orders(rows: Vec<OrderRow>) -> ServiceResult<Vec<Order>> {
    Ok(rows
        .into_iter()
        .map(Order::try_from)
        .collect::<Result<Vec<_>, _>>()?)
}

/// Next per-store order number (atomic upsert on the counter row)
pub async fn next_order_number(db: impl PgExecutor<'_>, store_id: i64) -> ServiceResult<i64> {
    let number = sqlx::query_scalar(
        "INSERT INTO order_counters (store_id, last_number) VALUES ($1, 1)
         ON CONFLICT (store_id) DO UPDATE SET last_number = order_counters.last_number + 1
         RETURNING last_number",
    )
    .bind(store_id)
    .fetch_one(db)
    .await?;
    Ok(number)
}

pub async fn insert(db: impl PgExecutor<'_>, order: &Order) -> ServiceResult<()> {
    sqlx::query(&format!(
        "INSERT INTO orders ({COLUMNS})
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                 $18, $19, $20, $21, $22, $23, $24)"
    ))
    .bind(order.id)
    .bind(order.store_id)
    .bind(order.order_number)
    .bind(order.customer_id)
    .bind(order.customer_name.as_deref())
    .bind(order.customer_phone.as_deref())
    .bind(order.order_type.as_db())
    .bind(order.table_id)
    .bind(order.table_name.as_deref())
    .bind(order.delivery_address.as_deref())
    .bind(order.delivery_zone.as_deref())
    .bind(Json(&order.items))
    .bind(order.subtotal)
    .bind(order.tax)
    .bind(order.delivery_fee)
    .bind(order.total)
    .bind(order.payment_method.as_db())
    .bind(order.payment_status.as_db())
    .bind(order.status.as_db())
    .bind(order.notes.as_deref())
    .bind(order.created_by)
    .bind(order.paid_at)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn list(
    pool: &PgPool,
    store_id: Option<i64>,
    query: &OrderQuery,
    limit: u32,
    offset: i64,
) -> ServiceResult<(Vec<Order>, u64)> {
    let status = query.status.map(|s| s.as_db());
    let payment_status = query.payment_status.map(|s| s.as_db());
    let order_type = query.order_type.map(|t| t.as_db());

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM orders WHERE {FILTER}"))
        .bind(store_id)
        .bind(status)
        .bind(payment_status)
        .bind(order_type)
        .bind(query.from)
        .bind(query.to)
        .fetch_one(pool)
        .await?;

    let rows: Vec<OrderRow> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM orders WHERE {FILTER}
         ORDER BY created_at DESC, id DESC
         LIMIT $7 OFFSET $8"
    ))
    .bind(store_id)
    .bind(status)
    .bind(payment_status)
    .bind(order_type)
    .bind(query.from)
    .bind(query.to)
    .bind(i64::from(limit))
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok((into_orders(rows)?, total.max(0) as u64))
}

pub async fn list_by_customer(
    pool: &PgPool,
    customer_id: i64,
    limit: u32,
    offset: i64,
) -> ServiceResult<(Vec<Order>, u64)> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE customer_id = $1")
        .bind(customer_id)
        .fetch_one(pool)
        .await?;

    let rows: Vec<OrderRow> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM orders WHERE customer_id = $1
         ORDER BY created_at DESC, id DESC
         LIMIT $2 OFFSET $3"
    ))
    .bind(customer_id)
    .bind(i64::from(limit))
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok((into_orders(rows)?, total.max(0) as u64))
}

pub async fn find(pool: &PgPool, store_id: Option<i64>, id: i64) -> ServiceResult<Option<Order>> {
    let row: Option<OrderRow> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM orders WHERE id = $1 AND ($2::BIGINT IS NULL OR store_id = $2)"
    ))
    .bind(id)
    .bind(store_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Order::try_from).transpose()?)
}

/// Move an order from `current` to `next`.
///
/// A paid order is never cancelled here even if it was paid after the
/// caller's read. Returns `None` when the order changed concurrently (or vanished).
pub async fn update_status(
    pool: &PgPool,
    store_id: i64,
    id: i64,
    current: OrderStatus,
    next: OrderStatus,
    now: i64,
) -> ServiceResult<Option<Order>> {
    let row: Option<OrderRow> = sqlx::query_as(&format!(
        "UPDATE orders SET status = $4, updated_at = $5
         WHERE id = $1 AND store_id = $2 AND status = $3
           AND NOT ($4::TEXT = 'cancelled' AND payment_status = 'paid')
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(store_id)
    .bind(current.as_db())
    .bind(next.as_db())
    .bind(now)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Order::try_from).transpose()?)
}

/// Payment counterpart of [`update_status`]; `paid_at` is stamped on `paid`.
pub async fn update_payment_status(
    pool: &PgPool,
    store_id: i64,
    id: i64,
    current: PaymentStatus,
    next: PaymentStatus,
    now: i64,
) -> ServiceResult<Option<Order>> {
    let paid_at = (next == PaymentStatus::Paid).then_some(now);
    let row: Option<OrderRow> = sqlx::query_as(&format!(
        "UPDATE orders SET payment_status = $4, paid_at = COALESCE($5, paid_at), updated_at = $6
         WHERE id = $1 AND store_id = $2 AND payment_status = $3 AND status <> 'cancelled'
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(store_id)
    .bind(current.as_db())
    .bind(next.as_db())
    .bind(paid_at)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Order::try_from).transpose()?)
}

/// Orders of a table that are not completed or cancelled
pub async fn count_open_for_table(
    pool: &PgPool,
    store_id: i64,
    table_id: i64,
) -> ServiceResult<i64> {
    let open: Vec<&str> = OrderStatus::ALL
        .iter()
        .filter(|s| s.is_open())
        .map(|s| s.as_db())
        .collect();
    let count = sqlx::query_scalar(
        "SELECT COUNT(*) FROM orders WHERE store_id = $1 AND table_id = $2 AND status = ANY($3)",
    )
    .bind(store_id)
    .bind(table_id)
    .bind(&open)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

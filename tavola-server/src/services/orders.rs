//! Order placement
//!
//! Shared by the public checkout and the counter (staff) endpoint. Prices are
//! recomputed from the store's menu and the order number is drawn inside the
//! same transaction as the insert.

use shared::error::{AppError, ErrorCode};
use shared::models::{
    DiningTable, Order, OrderCreate, OrderStatus, OrderType, PaymentStatus, Store, UserRole,
};
use shared::order::quote_order;
use shared::util::{now_millis, snowflake_id};

use crate::auth::CurrentUser;
use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text,
};

/// Who is placing the order
#[derive(Debug, Clone, Copy)]
pub enum Placement<'a> {
    /// Customer app; the caller may be anonymous
    Customer(Option<&'a CurrentUser>),
    /// Counter / waiter entry by store staff
    Counter(&'a CurrentUser),
}

fn validate(req: &OrderCreate) -> Result<(), AppError> {
    validate_optional_text(&req.customer_name, "customer_name", MAX_NAME_LEN)?;
    validate_optional_text(&req.customer_phone, "customer_phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&req.delivery_address, "delivery_address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&req.delivery_zone, "delivery_zone", MAX_NAME_LEN)?;
    validate_optional_text(&req.notes, "notes", MAX_NOTE_LEN)?;
    for item in &req.items {
        validate_optional_text(&item.notes, "items.notes", MAX_NOTE_LEN)?;
    }
    Ok(())
}

/// Table named by `table_token` or `table_id`; must belong to `store_id` and be active
async fn resolve_table(
    state: &AppState,
    store_id: i64,
    req: &OrderCreate,
) -> ServiceResult<Option<DiningTable>> {
    let table = match (req.table_token.as_deref(), req.table_id) {
        (Some(token), _) if !token.trim().is_empty() => {
            db::tables::find_by_token(&state.pool, store_id, token.trim()).await?
        }
        (_, Some(id)) => db::tables::find_in_store(&state.pool, store_id, id).await?,
        _ => return Ok(None),
    };

    match table {
        Some(table) if table.is_active => Ok(Some(table)),
        Some(table) => Err(AppError::with_message(
            ErrorCode::TableNotFound,
            format!("Table '{}' is not accepting orders", table.name),
        )
        .into()),
        None => Err(AppError::new(ErrorCode::TableNotFound).into()),
    }
}

/// Validate, price and persist a new order for `store`.
pub async fn place_order(
    state: &AppState,
    store: &Store,
    req: OrderCreate,
    placement: Placement<'_>,
) -> ServiceResult<Order> {
    validate(&req)?;

    let mut food_ids: Vec<i64> = req.items.iter().map(|i| i.food_id).collect();
    food_ids.sort_unstable();
    food_ids.dedup();
    let menu = db::foods::menu_prices(&state.pool, store.id, &food_ids).await?;

    let quote = quote_order(&req, &store.settings, &menu)?;

    let table = if req.order_type == OrderType::DineIn {
        resolve_table(state, store.id, &req).await?
    } else {
        None
    };

    let (customer_id, created_by) = match placement {
        Placement::Customer(user) => (
            user.filter(|u| u.role == UserRole::Customer).map(|u| u.id),
            None,
        ),
        Placement::Counter(staff) => (None, Some(staff.id)),
    };

    let is_delivery = req.order_type == OrderType::Delivery;
    let now = now_millis();

    let mut tx = state.pool.begin().await?;
    let order_number = db::orders::next_order_number(&mut *tx, store.id).await?;

    let order = Order {
        id: snowflake_id(),
        store_id: store.id,
        order_number,
        customer_id,
        customer_name: trimmed(req.customer_name),
        customer_phone: trimmed(req.customer_phone),
        order_type: req.order_type,
        table_id: table.as_ref().map(|t| t.id),
        table_name: table.map(|t| t.name),
        delivery_address: if is_delivery { trimmed(req.delivery_address) } else { None },
        delivery_zone: if is_delivery { trimmed(req.delivery_zone) } else { None },
        items: quote.items,
        subtotal: quote.totals.subtotal,
        tax: quote.totals.tax,
        delivery_fee: quote.totals.delivery_fee,
        total: quote.totals.total,
        payment_method: req.payment_method,
        payment_status: PaymentStatus::Pending,
        status: OrderStatus::Pending,
        notes: trimmed(req.notes),
        created_by,
        paid_at: None,
        created_at: now,
        updated_at: now,
    };

    db::orders::insert(&mut *tx, &order).await?;
    tx.commit().await?;

    tracing::info!(
        store_id = store.id,
        order_id = order.id,
        order_number = order.order_number,
        order_type = order.order_type.as_db(),
        total = %order.total,
        counter = created_by.is_some(),
        "Order placed"
    );

    Ok(order)
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

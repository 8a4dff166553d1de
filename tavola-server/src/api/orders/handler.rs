//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Order, OrderCreate, OrderQuery, OrderStatusUpdate, PaymentStatusUpdate};
use shared::order::{check_payment_change, check_status_change};
use shared::util::now_millis;
use shared::{PageQuery, PaginatedResponse};

use crate::api::ApiResult;
use crate::auth::CurrentUser;
use crate::db;
use crate::error::ServiceResult;
use crate::services::orders::{Placement, place_order};
use crate::state::AppState;
use crate::tenant::{StoreContext, StoreScope};

fn not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::OrderNotFound).with_detail("id", id)
}

fn changed_concurrently(id: i64) -> AppError {
    AppError::with_message(
        ErrorCode::InvalidStatusTransition,
        "Order was modified by another request, reload and retry",
    )
    .with_detail("id", id)
}

async fn load(state: &AppState, store_id: i64, id: i64) -> ServiceResult<Order> {
    let order = db::orders::find(&state.pool, Some(store_id), id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(order)
}

/// GET /api/store/orders - newest first
pub async fn list(
    State(state): State<AppState>,
    scope: StoreScope,
    Query(query): Query<OrderQuery>,
) -> ApiResult<PaginatedResponse<Order>> {
    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    };
    let (orders, total) =
        db::orders::list(&state.pool, scope.store_id(), &query, page.limit(), page.offset())
            .await?;
    Ok(Json(PaginatedResponse::new(orders, total, page.page(), page.limit())))
}

/// GET /api/store/orders/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    scope: StoreScope,
    Path(id): Path<i64>,
) -> ApiResult<Order> {
    let order = db::orders::find(&state.pool, scope.store_id(), id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(order))
}

/// POST /api/store/orders - counter entry, attributed to the staff member
pub async fn create(
    State(state): State<AppState>,
    ctx: StoreContext,
    user: CurrentUser,
    Json(req): Json<OrderCreate>,
) -> ApiResult<Order> {
    let order = place_order(&state, &ctx.store, req, Placement::Counter(&user)).await?;
    Ok(Json(order))
}

/// PUT /api/store/orders/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    scope: StoreScope,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<OrderStatusUpdate>,
) -> ApiResult<Order> {
    let store_id = scope.require_store()?;
    let order = load(&state, store_id, id).await?;
    check_status_change(order.status, order.payment_status, payload.status)?;

    let updated = db::orders::update_status(
        &state.pool,
        store_id,
        id,
        order.status,
        payload.status,
        now_millis(),
    )
    .await?
    .ok_or_else(|| changed_concurrently(id))?;

    tracing::info!(
        store_id,
        order_id = id,
        from = order.status.as_db(),
        to = updated.status.as_db(),
        user_id = user.id,
        "Order status changed"
    );
    Ok(Json(updated))
}

/// PUT /api/store/orders/{id}/payment
pub async fn update_payment(
    State(state): State<AppState>,
    scope: StoreScope,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<PaymentStatusUpdate>,
) -> ApiResult<Order> {
    let store_id = scope.require_store()?;
    let order = load(&state, store_id, id).await?;
    check_payment_change(order.status, order.payment_status, payload.payment_status)?;

    let updated = db::orders::update_payment_status(
        &state.pool,
        store_id,
        id,
        order.payment_status,
        payload.payment_status,
        now_millis(),
    )
    .await?
    .ok_or_else(|| changed_concurrently(id))?;

    tracing::info!(
        store_id,
        order_id = id,
        from = order.payment_status.as_db(),
        to = updated.payment_status.as_db(),
        user_id = user.id,
        "Order payment status changed"
    );
    Ok(Json(updated))
}

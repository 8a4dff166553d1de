//! Order API (`/api/store/orders`, `orders:manage`)

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::permissions::ORDERS_MANAGE;
use crate::auth::require_permission;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(handler::list).post(handler::create))
        .route("/orders/{id}", get(handler::get_by_id))
        .route("/orders/{id}/status", put(handler::update_status))
        .route("/orders/{id}/payment", put(handler::update_payment))
        .route_layer(middleware::from_fn(require_permission(ORDERS_MANAGE)))
}

//! Dining table API (`/api/store/tables`, `tables:manage`)

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::permissions::TABLES_MANAGE;
use crate::auth::require_permission;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tables", get(handler::list).post(handler::create))
        .route(
            "/tables/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/tables/{id}/regenerate-qr", post(handler::regenerate_qr))
        .route_layer(middleware::from_fn(require_permission(TABLES_MANAGE)))
}

//! Category API (`/api/store/categories`, `menu:manage`)

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::permissions::MENU_MANAGE;
use crate::auth::require_permission;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(handler::list).post(handler::create))
        .route("/categories/sort-order", put(handler::batch_sort))
        .route(
            "/categories/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route_layer(middleware::from_fn(require_permission(MENU_MANAGE)))
}

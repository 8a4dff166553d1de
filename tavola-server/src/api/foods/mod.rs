//! Food API (`/api/store/foods`, `menu:manage`)

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch},
};

use crate::auth::permissions::MENU_MANAGE;
use crate::auth::require_permission;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/foods", get(handler::list).post(handler::create))
        .route(
            "/foods/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/foods/{id}/availability", patch(handler::toggle_availability))
        .route_layer(middleware::from_fn(require_permission(MENU_MANAGE)))
}

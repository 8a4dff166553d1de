//! Banner API (`/api/store/banners`, `banners:manage`)

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::permissions::BANNERS_MANAGE;
use crate::auth::require_permission;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/banners", get(handler::list).post(handler::create))
        .route(
            "/banners/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route_layer(middleware::from_fn(require_permission(BANNERS_MANAGE)))
}

//! Store settings (`/api/store/settings`, `settings:manage`)

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::permissions::SETTINGS_MANAGE;
use crate::auth::require_permission;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/settings", get(handler::get).put(handler::update))
        .route_layer(middleware::from_fn(require_permission(SETTINGS_MANAGE)))
}

//! Store statistics (`/api/store/stats`, `stats:view`)

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::permissions::STATS_VIEW;
use crate::auth::require_permission;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(handler::store_stats))
        .route_layer(middleware::from_fn(require_permission(STATS_VIEW)))
}

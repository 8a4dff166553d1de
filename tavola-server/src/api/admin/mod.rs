//! Super admin console (`/api/admin`)
//!
//! Tenant and user management plus the platform overview. Every route requires
//! a `super_admin` token.

mod stats;
mod stores;
mod users;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::{require_auth, require_super_admin};
use crate::state::AppState;

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/stores", get(stores::list).post(stores::create))
        .route(
            "/stores/{id}",
            get(stores::get_by_id)
                .put(stores::update)
                .delete(stores::delete),
        )
        .route("/stores/{id}/subscription", put(stores::update_subscription))
        .route("/stores/{id}/status", put(stores::set_status))
        .route("/users", get(users::list).post(users::create))
        .route(
            "/users/{id}",
            get(users::get_by_id)
                .put(users::update)
                .delete(users::delete),
        )
        .route("/users/{id}/password", put(users::reset_password))
        .route("/stats/overview", get(stats::overview))
        .route_layer(middleware::from_fn(require_super_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}

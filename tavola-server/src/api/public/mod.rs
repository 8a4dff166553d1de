//! Public (customer) routes
//!
//! Mounted twice: under `/api/public/stores/{slug}` for path-addressed stores
//! and under `/api/public` for stores named by subdomain or `X-Store-ID`.
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | / | GET | store profile |
//! | /menu | GET | active categories with available foods |
//! | /banners | GET | visible banners |
//! | /tables/{qr_token} | GET | table lookup for QR ordering |
//! | /orders | POST | place an order |
//! | /orders/{id} | GET | track an order |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::optional_auth;
use crate::state::AppState;
use crate::tenant::identify_store;

fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handler::profile))
        .route("/menu", get(handler::menu))
        .route("/banners", get(handler::banners))
        .route("/tables/{qr_token}", get(handler::table))
        .route("/orders", post(handler::place_order))
        .route("/orders/{id}", get(handler::get_order))
        .route_layer(middleware::from_fn_with_state(state.clone(), identify_store))
        .route_layer(middleware::from_fn_with_state(state.clone(), optional_auth))
}

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .nest("/api/public/stores/{slug}", routes(state))
        .nest("/api/public", routes(state))
}

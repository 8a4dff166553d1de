//! Authentication Routes
//!
//! - `/api/auth/register`, `/api/auth/login`: public, rate limited per IP
//! - `/api/auth/me`, `/api/auth/password`, `/api/auth/orders`: bearer token

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::rate_limit::{login_rate_limit, register_rate_limit};
use crate::auth::require_auth;
use crate::state::AppState;

pub fn router(state: &AppState) -> Router<AppState> {
    let login = Router::new()
        .route("/api/auth/login", post(handler::login))
        .route_layer(middleware::from_fn_with_state(state.clone(), login_rate_limit));

    let register = Router::new()
        .route("/api/auth/register", post(handler::register))
        .route_layer(middleware::from_fn_with_state(state.clone(), register_rate_limit));

    let protected = Router::new()
        .route("/api/auth/me", get(handler::me).put(handler::update_profile))
        .route("/api/auth/password", put(handler::change_password))
        .route("/api/auth/orders", get(handler::my_orders))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    login.merge(register).merge(protected)
}

//! HTTP routes
//!
//! | Prefix | Guard | Store |
//! |--------|-------|-------|
//! | `/health` | none | none |
//! | `/api/auth` | token on `/me`, `/password`, `/orders` | none |
//! | `/api/public` | optional token | resolved, must be operational |
//! | `/api/store` | store_admin or super_admin + module permission | resolved |
//! | `/api/admin` | super_admin | none |
//! | `/uploads` | none (static files) | none |

pub mod admin;
pub mod auth;
pub mod banners;
pub mod categories;
pub mod foods;
pub mod health;
pub mod orders;
pub mod public;
pub mod settings;
pub mod stats;
pub mod tables;
pub mod upload;

use axum::{Json, Router, middleware};
use http::{HeaderName, HeaderValue};
use shared::models::UserRole;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::{require_auth, require_role};
use crate::error::ServiceError;
use crate::state::AppState;
use crate::tenant::identify_store;

/// Handler result: JSON body or an error response
pub type ApiResult<T> = Result<Json<T>, ServiceError>;

/// Roles allowed on `/api/store`
const STORE_STAFF: &[UserRole] = &[UserRole::StoreAdmin, UserRole::SuperAdmin];

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Store administration routes (`/api/store/*`)
fn store_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(foods::router())
        .merge(categories::router())
        .merge(banners::router())
        .merge(tables::router())
        .merge(orders::router())
        .merge(stats::router())
        .merge(settings::router())
        .merge(upload::router())
        // Runs last: resolve the store once the role is known
        .route_layer(middleware::from_fn_with_state(state.clone(), identify_store))
        .route_layer(middleware::from_fn(require_role(STORE_STAFF)))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}

/// All routes, without the tower-http stack
pub fn build_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router(state))
        .merge(public::router(state))
        .nest("/api/store", store_router(state))
        .nest("/api/admin", admin::router(state))
        .nest_service("/uploads", ServeDir::new(&state.config.uploads_dir))
}

/// Fully configured application
pub fn build_app(state: AppState) -> Router {
    build_router(&state)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
}

//! Image upload (`/api/store/upload`)
//!
//! Open to holders of `menu:manage` or `banners:manage`. Files are served
//! back through the static `/uploads` mount.

mod handler;

use axum::{Router, extract::DefaultBodyLimit, middleware, routing::post};

use crate::auth::permissions::{BANNERS_MANAGE, MENU_MANAGE};
use crate::auth::require_any_permission;
use crate::state::AppState;

/// Multipart envelope allowance on top of the file limit
const BODY_LIMIT: usize = handler::MAX_FILE_SIZE + 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(handler::upload))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .route_layer(middleware::from_fn(require_any_permission(&[
            MENU_MANAGE,
            BANNERS_MANAGE,
        ])))
}

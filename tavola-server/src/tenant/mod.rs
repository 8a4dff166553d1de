//! Multi-tenancy: store resolution and store scoping
//!
//! [`identify_store`] runs after the auth middleware. It resolves the store a
//! request targets, computes the caller's [`StoreScope`] and attaches both to
//! the request extensions.

pub mod resolver;
pub mod scope;

use axum::{
    extract::{FromRequestParts, OriginalUri, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use shared::error::AppError;
use shared::models::Store;
use shared::util::now_millis;

use crate::auth::CurrentUser;
use crate::state::AppState;

pub use resolver::{
    StoreCandidate, StoreRef, StoreSignal, is_reserved_label, resolve_store, store_candidates,
};
pub use scope::{StoreScope, compute_scope};

/// The store a request resolved to
#[derive(Debug, Clone)]
pub struct StoreContext {
    pub store: Store,
}

/// Resolve the target store and attach [`StoreContext`] + [`StoreScope`].
pub async fn identify_store(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let user = req.extensions().get::<CurrentUser>().cloned();

    // Nested routers see a stripped URI; the slug lives in the original one
    let path = req
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.path().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let host = req
        .headers()
        .get(http::header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| req.uri().host());
    let header = req
        .headers()
        .get(resolver::STORE_HEADER)
        .and_then(|h| h.to_str().ok());

    let candidates = store_candidates(
        host,
        &state.config.base_domain,
        header,
        &path,
        user.as_ref().and_then(|u| u.store_id),
    );

    let store = resolve_store(&state.pool, &candidates).await?;
    let scope = compute_scope(user.as_ref(), store.as_ref(), now_millis())?;

    tracing::debug!(
        store_id = ?scope.store_id(),
        signal = candidates.first().map(|c| c.signal.as_str()),
        "Store identified"
    );

    if let Some(store) = store {
        req.extensions_mut().insert(StoreContext { store });
    }
    req.extensions_mut().insert(scope);

    Ok(next.run(req).await)
}

impl<S: Send + Sync> FromRequestParts<S> for StoreScope {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<StoreScope>()
            .copied()
            .ok_or_else(AppError::store_not_selected)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for StoreContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<StoreContext>()
            .cloned()
            .ok_or_else(AppError::store_not_selected)
    }
}

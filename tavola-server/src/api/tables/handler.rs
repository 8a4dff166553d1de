//! Dining table handlers
//!
//! Every response carries the customer-facing `qr_url`, built from the
//! owning store's slug and the table token.

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate, DiningTableView};
use shared::util::{now_millis, qr_token};

use crate::api::ApiResult;
use crate::db;
use crate::state::AppState;
use crate::tenant::{StoreContext, StoreScope};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_required_text,
};

const MAX_CAPACITY: i32 = 100;

fn not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::TableNotFound).with_detail("id", id)
}

fn validate_capacity(capacity: Option<i32>) -> Result<(), AppError> {
    if let Some(c) = capacity
        && !(1..=MAX_CAPACITY).contains(&c)
    {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("capacity must be between 1 and {MAX_CAPACITY}"),
        ));
    }
    Ok(())
}

fn view(state: &AppState, table: DiningTable, store_slug: &str) -> DiningTableView {
    let qr_url = state.config.table_qr_url(store_slug, &table.qr_token);
    DiningTableView { table, qr_url }
}

/// GET /api/store/tables
pub async fn list(
    State(state): State<AppState>,
    scope: StoreScope,
) -> ApiResult<Vec<DiningTableView>> {
    let tables = db::tables::list(&state.pool, scope.store_id()).await?;
    let views = tables
        .into_iter()
        .map(|(table, slug)| view(&state, table, &slug))
        .collect();
    Ok(Json(views))
}

/// GET /api/store/tables/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    scope: StoreScope,
    Path(id): Path<i64>,
) -> ApiResult<DiningTableView> {
    let (table, slug) = db::tables::find(&state.pool, scope.store_id(), id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(view(&state, table, &slug)))
}

/// POST /api/store/tables
pub async fn create(
    State(state): State<AppState>,
    ctx: StoreContext,
    Json(payload): Json<DiningTableCreate>,
) -> ApiResult<DiningTableView> {
    let store = &ctx.store;
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.location, "location", MAX_SHORT_TEXT_LEN)?;
    validate_capacity(payload.capacity)?;

    let table =
        db::tables::insert(&state.pool, store.id, &payload, &qr_token(), now_millis()).await?;
    tracing::info!(store_id = store.id, table_id = table.id, name = %table.name, "Table created");
    Ok(Json(view(&state, table, &store.slug)))
}

/// PUT /api/store/tables/{id}
pub async fn update(
    State(state): State<AppState>,
    ctx: StoreContext,
    Path(id): Path<i64>,
    Json(payload): Json<DiningTableUpdate>,
) -> ApiResult<DiningTableView> {
    let store = &ctx.store;
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.location, "location", MAX_SHORT_TEXT_LEN)?;
    validate_capacity(payload.capacity)?;

    let table = db::tables::update(&state.pool, store.id, id, &payload, now_millis())
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(view(&state, table, &store.slug)))
}

/// POST /api/store/tables/{id}/regenerate-qr - old QR codes stop working
pub async fn regenerate_qr(
    State(state): State<AppState>,
    ctx: StoreContext,
    Path(id): Path<i64>,
) -> ApiResult<DiningTableView> {
    let store = &ctx.store;
    let table = db::tables::set_token(&state.pool, store.id, id, &qr_token(), now_millis())
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(store_id = store.id, table_id = id, "Table QR token regenerated");
    Ok(Json(view(&state, table, &store.slug)))
}

/// DELETE /api/store/tables/{id}
pub async fn delete(
    State(state): State<AppState>,
    scope: StoreScope,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    let store_id = scope.require_store()?;
    if !db::tables::delete(&state.pool, store_id, id).await? {
        return Err(not_found(id).into());
    }
    tracing::info!(store_id, table_id = id, "Table deleted");
    Ok(Json(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_bounds() {
        assert!(validate_capacity(None).is_ok());
        assert!(validate_capacity(Some(1)).is_ok());
        assert!(validate_capacity(Some(MAX_CAPACITY)).is_ok());
        assert_eq!(
            validate_capacity(Some(0)).unwrap_err().code,
            ErrorCode::ValueOutOfRange
        );
        assert!(validate_capacity(Some(MAX_CAPACITY + 1)).is_err());
    }
}

//! Category API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{Category, CategoryCreate, CategoryUpdate, SortOrderEntry};
use shared::util::now_millis;

use crate::api::ApiResult;
use crate::db;
use crate::state::AppState;
use crate::tenant::StoreScope;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_URL_LEN, validate_optional_text, validate_required_text,
};

/// Upper bound for one batch reorder
const MAX_SORT_BATCH: usize = 500;

fn not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::CategoryNotFound).with_detail("id", id)
}

#[derive(Serialize)]
pub struct BatchSortResponse {
    pub updated: u64,
}

/// GET /api/store/categories - ordered by sort_order, name
pub async fn list(State(state): State<AppState>, scope: StoreScope) -> ApiResult<Vec<Category>> {
    let categories = db::categories::list(&state.pool, scope.store_id()).await?;
    Ok(Json(categories))
}

/// GET /api/store/categories/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    scope: StoreScope,
    Path(id): Path<i64>,
) -> ApiResult<Category> {
    let category = db::categories::find(&state.pool, scope.store_id(), id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(category))
}

/// POST /api/store/categories
pub async fn create(
    State(state): State<AppState>,
    scope: StoreScope,
    Json(payload): Json<CategoryCreate>,
) -> ApiResult<Category> {
    let store_id = scope.require_store()?;
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image, "image", MAX_URL_LEN)?;

    let category = db::categories::insert(&state.pool, store_id, &payload, now_millis()).await?;
    tracing::info!(store_id, category_id = category.id, name = %category.name, "Category created");
    Ok(Json(category))
}

/// PUT /api/store/categories/{id}
pub async fn update(
    State(state): State<AppState>,
    scope: StoreScope,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryUpdate>,
) -> ApiResult<Category> {
    let store_id = scope.require_store()?;
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image, "image", MAX_URL_LEN)?;

    let category = db::categories::update(&state.pool, store_id, id, &payload, now_millis())
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(category))
}

/// DELETE /api/store/categories/{id} - refused while foods reference it
pub async fn delete(
    State(state): State<AppState>,
    scope: StoreScope,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    let store_id = scope.require_store()?;
    if !db::categories::delete(&state.pool, store_id, id).await? {
        return Err(not_found(id).into());
    }
    tracing::info!(store_id, category_id = id, "Category deleted");
    Ok(Json(true))
}

/// PUT /api/store/categories/sort-order
pub async fn batch_sort(
    State(state): State<AppState>,
    scope: StoreScope,
    Json(entries): Json<Vec<SortOrderEntry>>,
) -> ApiResult<BatchSortResponse> {
    let store_id = scope.require_store()?;
    if entries.len() > MAX_SORT_BATCH {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("At most {MAX_SORT_BATCH} entries per batch"),
        )
        .into());
    }

    let updated = db::categories::batch_sort(&state.pool, store_id, &entries, now_millis()).await?;
    Ok(Json(BatchSortResponse { updated }))
}

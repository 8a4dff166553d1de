//! Food API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Food, FoodCreate, FoodQuery, FoodUpdate};
use shared::util::now_millis;
use shared::{PageQuery, PaginatedResponse};

use crate::api::ApiResult;
use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;
use crate::tenant::StoreScope;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_URL_LEN, validate_optional_text, validate_price,
    validate_required_text, validate_tags,
};

const MAX_PREPARATION_MINUTES: i32 = 24 * 60;

fn validate_preparation(minutes: Option<i32>) -> Result<(), AppError> {
    if let Some(m) = minutes
        && !(0..=MAX_PREPARATION_MINUTES).contains(&m)
    {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("preparation_minutes must be between 0 and {MAX_PREPARATION_MINUTES}"),
        ));
    }
    Ok(())
}

/// The category must belong to the same store
async fn ensure_category(state: &AppState, store_id: i64, category_id: i64) -> ServiceResult<()> {
    if !db::categories::exists_in_store(&state.pool, store_id, category_id).await? {
        return Err(AppError::new(ErrorCode::CategoryNotFound)
            .with_detail("category_id", category_id)
            .into());
    }
    Ok(())
}

fn not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::FoodNotFound).with_detail("id", id)
}

/// GET /api/store/foods
pub async fn list(
    State(state): State<AppState>,
    scope: StoreScope,
    Query(query): Query<FoodQuery>,
) -> ApiResult<PaginatedResponse<Food>> {
    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    };
    let (foods, total) =
        db::foods::list(&state.pool, scope.store_id(), &query, page.limit(), page.offset()).await?;
    Ok(Json(PaginatedResponse::new(foods, total, page.page(), page.limit())))
}

/// GET /api/store/foods/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    scope: StoreScope,
    Path(id): Path<i64>,
) -> ApiResult<Food> {
    let food = db::foods::find(&state.pool, scope.store_id(), id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(food))
}

/// POST /api/store/foods
pub async fn create(
    State(state): State<AppState>,
    scope: StoreScope,
    Json(payload): Json<FoodCreate>,
) -> ApiResult<Food> {
    let store_id = scope.require_store()?;
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image, "image", MAX_URL_LEN)?;
    validate_price(payload.price)?;
    validate_preparation(payload.preparation_minutes)?;
    validate_tags(&payload.tags, "tags")?;
    validate_tags(&payload.allergens, "allergens")?;
    ensure_category(&state, store_id, payload.category_id).await?;

    let food = db::foods::insert(&state.pool, store_id, &payload, now_millis()).await?;
    tracing::info!(store_id, food_id = food.id, name = %food.name, "Food created");
    Ok(Json(food))
}

/// PUT /api/store/foods/{id}
pub async fn update(
    State(state): State<AppState>,
    scope: StoreScope,
    Path(id): Path<i64>,
    Json(payload): Json<FoodUpdate>,
) -> ApiResult<Food> {
    let store_id = scope.require_store()?;
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image, "image", MAX_URL_LEN)?;
    if let Some(price) = payload.price {
        validate_price(price)?;
    }
    validate_preparation(payload.preparation_minutes)?;
    if let Some(tags) = &payload.tags {
        validate_tags(tags, "tags")?;
    }
    if let Some(allergens) = &payload.allergens {
        validate_tags(allergens, "allergens")?;
    }
    if let Some(category_id) = payload.category_id {
        ensure_category(&state, store_id, category_id).await?;
    }

    let food = db::foods::update(&state.pool, store_id, id, &payload, now_millis())
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(food))
}

/// PATCH /api/store/foods/{id}/availability - flip `is_available`
pub async fn toggle_availability(
    State(state): State<AppState>,
    scope: StoreScope,
    Path(id): Path<i64>,
) -> ApiResult<Food> {
    let store_id = scope.require_store()?;
    let food = db::foods::toggle_availability(&state.pool, store_id, id, now_millis())
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(
        store_id,
        food_id = id,
        is_available = food.is_available,
        "Food availability toggled"
    );
    Ok(Json(food))
}

/// DELETE /api/store/foods/{id}
pub async fn delete(
    State(state): State<AppState>,
    scope: StoreScope,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    let store_id = scope.require_store()?;
    if !db::foods::delete(&state.pool, store_id, id).await? {
        return Err(not_found(id).into());
    }
    tracing::info!(store_id, food_id = id, "Food deleted");
    Ok(Json(true))
}

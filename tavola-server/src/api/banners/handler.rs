//! Banner API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Banner, BannerCreate, BannerUpdate};
use shared::util::now_millis;

use crate::api::ApiResult;
use crate::db;
use crate::state::AppState;
use crate::tenant::StoreScope;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_URL_LEN, validate_optional_text, validate_required_text,
};

fn not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::BannerNotFound).with_detail("id", id)
}

fn validate_window(starts_at: Option<i64>, ends_at: Option<i64>) -> Result<(), AppError> {
    if let (Some(start), Some(end)) = (starts_at, ends_at)
        && end <= start
    {
        return Err(AppError::validation("ends_at must be after starts_at"));
    }
    Ok(())
}

/// GET /api/store/banners
pub async fn list(State(state): State<AppState>, scope: StoreScope) -> ApiResult<Vec<Banner>> {
    let banners = db::banners::list(&state.pool, scope.store_id()).await?;
    Ok(Json(banners))
}

/// GET /api/store/banners/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    scope: StoreScope,
    Path(id): Path<i64>,
) -> ApiResult<Banner> {
    let banner = db::banners::find(&state.pool, scope.store_id(), id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(banner))
}

/// POST /api/store/banners
pub async fn create(
    State(state): State<AppState>,
    scope: StoreScope,
    Json(payload): Json<BannerCreate>,
) -> ApiResult<Banner> {
    let store_id = scope.require_store()?;
    validate_required_text(&payload.title, "title", MAX_NAME_LEN)?;
    validate_optional_text(&payload.subtitle, "subtitle", MAX_NOTE_LEN)?;
    validate_required_text(&payload.image, "image", MAX_URL_LEN)?;
    validate_optional_text(&payload.link, "link", MAX_URL_LEN)?;
    validate_window(payload.starts_at, payload.ends_at)?;

    let banner = db::banners::insert(&state.pool, store_id, &payload, now_millis()).await?;
    tracing::info!(store_id, banner_id = banner.id, "Banner created");
    Ok(Json(banner))
}

/// PUT /api/store/banners/{id}
pub async fn update(
    State(state): State<AppState>,
    scope: StoreScope,
    Path(id): Path<i64>,
    Json(payload): Json<BannerUpdate>,
) -> ApiResult<Banner> {
    let store_id = scope.require_store()?;
    if let Some(title) = &payload.title {
        validate_required_text(title, "title", MAX_NAME_LEN)?;
    }
    if let Some(image) = &payload.image {
        validate_required_text(image, "image", MAX_URL_LEN)?;
    }
    validate_optional_text(&payload.subtitle, "subtitle", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.link, "link", MAX_URL_LEN)?;
    validate_window(payload.starts_at, payload.ends_at)?;

    let banner = db::banners::update(&state.pool, store_id, id, &payload, now_millis())
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(banner))
}

/// DELETE /api/store/banners/{id}
pub async fn delete(
    State(state): State<AppState>,
    scope: StoreScope,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    let store_id = scope.require_store()?;
    if !db::banners::delete(&state.pool, store_id, id).await? {
        return Err(not_found(id).into());
    }
    Ok(Json(true))
}

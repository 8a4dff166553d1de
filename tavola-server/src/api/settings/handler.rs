//! Store settings handlers

use axum::{Json, extract::State};
use shared::error::{AppError, ErrorCode};
use shared::models::{Store, StoreSettingsUpdate};
use shared::util::now_millis;

use crate::api::ApiResult;
use crate::db;
use crate::state::AppState;
use crate::tenant::StoreContext;
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text, validate_store_contact};

/// GET /api/store/settings
pub async fn get(ctx: StoreContext) -> ApiResult<Store> {
    Ok(Json(ctx.store))
}

/// PUT /api/store/settings
///
/// Settings and customization are replaced as a whole when present.
pub async fn update(
    State(state): State<AppState>,
    ctx: StoreContext,
    Json(payload): Json<StoreSettingsUpdate>,
) -> ApiResult<Store> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_store_contact(
        &payload.description,
        &payload.phone,
        &payload.email,
        &payload.address,
    )?;
    if let Some(settings) = &payload.settings {
        settings.validate()?;
    }
    if let Some(customization) = &payload.customization {
        customization.validate()?;
    }

    let store_id = ctx.store.id;
    let store = db::stores::update_profile(&state.pool, store_id, &payload, now_millis())
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::StoreNotFound).with_detail("id", store_id))?;
    tracing::info!(store_id, "Store settings updated");
    Ok(Json(store))
}

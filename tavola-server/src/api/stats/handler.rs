//! Store statistics handler

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::StoreStats;
use shared::util::now_millis;

use crate::api::ApiResult;
use crate::db;
use crate::state::AppState;
use crate::tenant::StoreScope;

const DEFAULT_DAYS: u32 = 30;
const MAX_DAYS: u32 = 365;

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub days: Option<u32>,
}

fn window_days(days: Option<u32>) -> Result<u32, AppError> {
    let days = days.unwrap_or(DEFAULT_DAYS);
    if !(1..=MAX_DAYS).contains(&days) {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("days must be between 1 and {MAX_DAYS}"),
        ));
    }
    Ok(days)
}

/// GET /api/store/stats?days=30
pub async fn store_stats(
    State(state): State<AppState>,
    scope: StoreScope,
    Query(query): Query<StatsQuery>,
) -> ApiResult<StoreStats> {
    let store_id = scope.require_store()?;
    let days = window_days(query.days)?;
    let stats = db::stats::store_stats(&state.pool, store_id, days, now_millis()).await?;
    Ok(Json(stats))
}

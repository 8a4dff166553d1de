//! Platform statistics

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use shared::models::PlatformOverview;

use crate::api::ApiResult;
use crate::db;
use crate::state::AppState;

const DEFAULT_TOP: u32 = 10;
const MAX_TOP: u32 = 50;

#[derive(Debug, Deserialize)]
pub struct OverviewQuery {
    /// Number of top stores by revenue
    pub top: Option<u32>,
}

/// GET /api/admin/stats/overview
pub async fn overview(
    State(state): State<AppState>,
    Query(query): Query<OverviewQuery>,
) -> ApiResult<PlatformOverview> {
    let top = query.top.unwrap_or(DEFAULT_TOP).clamp(1, MAX_TOP);
    let overview = db::stats::platform_overview(&state.pool, top).await?;
    Ok(Json(overview))
}

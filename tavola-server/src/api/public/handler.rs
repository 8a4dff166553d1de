//! Public handlers
//!
//! Path parameters are read through named structs because the slug-prefixed
//! mount adds a `slug` capture that these handlers ignore.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{Banner, Category, DiningTable, Food, Order, OrderCreate, PublicStore};
use shared::util::now_millis;

use crate::api::ApiResult;
use crate::auth::MaybeUser;
use crate::db;
use crate::services::orders::{Placement, place_order as place};
use crate::state::AppState;
use crate::tenant::{StoreContext, StoreScope};

#[derive(Deserialize)]
pub struct TokenPath {
    qr_token: String,
}

#[derive(Deserialize)]
pub struct OrderIdPath {
    id: i64,
}

/// One menu section
#[derive(Serialize)]
pub struct MenuCategory {
    #[serde(flatten)]
    pub category: Category,
    pub foods: Vec<Food>,
}

#[derive(Serialize)]
pub struct MenuResponse {
    pub store: PublicStore,
    pub categories: Vec<MenuCategory>,
}

/// Table as seen by a customer who scanned its QR code
#[derive(Serialize)]
pub struct PublicTable {
    pub id: i64,
    pub name: String,
    pub capacity: i32,
    pub location: Option<String>,
    pub store: PublicStore,
}

/// GET / - store profile
pub async fn profile(ctx: StoreContext) -> ApiResult<PublicStore> {
    Ok(Json(ctx.store.into()))
}

/// GET /menu
pub async fn menu(State(state): State<AppState>, ctx: StoreContext) -> ApiResult<MenuResponse> {
    let store_id = ctx.store.id;
    let categories = db::categories::list_active(&state.pool, store_id).await?;
    let mut foods = db::foods::list_menu(&state.pool, store_id).await?;

    let categories = categories
        .into_iter()
        .map(|category| {
            let (mine, rest): (Vec<Food>, Vec<Food>) = std::mem::take(&mut foods)
                .into_iter()
                .partition(|f| f.category_id == category.id);
            foods = rest;
            MenuCategory {
                category,
                foods: mine,
            }
        })
        .filter(|section| !section.foods.is_empty())
        .collect();

    Ok(Json(MenuResponse {
        store: ctx.store.into(),
        categories,
    }))
}

/// GET /banners
pub async fn banners(State(state): State<AppState>, ctx: StoreContext) -> ApiResult<Vec<Banner>> {
    let banners = db::banners::list_visible(&state.pool, ctx.store.id, now_millis()).await?;
    Ok(Json(banners))
}

/// GET /tables/{qr_token}
pub async fn table(
    State(state): State<AppState>,
    ctx: StoreContext,
    Path(path): Path<TokenPath>,
) -> ApiResult<PublicTable> {
    let table: DiningTable = db::tables::find_by_token(&state.pool, ctx.store.id, &path.qr_token)
        .await?
        .filter(|t| t.is_active)
        .ok_or_else(|| AppError::new(ErrorCode::TableNotFound))?;

    Ok(Json(PublicTable {
        id: table.id,
        name: table.name,
        capacity: table.capacity,
        location: table.location,
        store: ctx.store.into(),
    }))
}

/// POST /orders
pub async fn place_order(
    State(state): State<AppState>,
    ctx: StoreContext,
    MaybeUser(user): MaybeUser,
    Json(req): Json<OrderCreate>,
) -> ApiResult<Order> {
    let order = place(&state, &ctx.store, req, Placement::Customer(user.as_ref())).await?;
    Ok(Json(order))
}

/// GET /orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    scope: StoreScope,
    Path(path): Path<OrderIdPath>,
) -> ApiResult<Order> {
    let order = db::orders::find(&state.pool, scope.store_id(), path.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    Ok(Json(order))
}

//! Store (tenant) management

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Store, StoreCreate, StoreCustomization, StoreSettings, StoreUpdate, SubscriptionPlan,
    SubscriptionStatus, SubscriptionUpdate, UserRole,
};
use shared::util::{is_valid_slug, now_millis, slugify, snowflake_id};
use shared::{PageQuery, PaginatedResponse};

use crate::api::ApiResult;
use crate::auth::CurrentUser;
use crate::auth::permissions::default_store_admin_permissions;
use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;
use crate::tenant::is_reserved_label;
use crate::utils::password::hash_for_storage;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, normalize_email, validate_email, validate_optional_text,
    validate_password, validate_required_text, validate_store_contact,
};

#[derive(Debug, Deserialize)]
pub struct StoreListQuery {
    pub status: Option<SubscriptionStatus>,
    /// Name or slug search
    pub q: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct StoreStatusUpdate {
    pub is_active: bool,
}

fn not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::StoreNotFound).with_detail("id", id)
}

fn checked_slug(slug: &str) -> Result<String, AppError> {
    let slug = slug.trim().to_ascii_lowercase();
    if !is_valid_slug(&slug) {
        return Err(AppError::with_message(
            ErrorCode::StoreSlugInvalid,
            format!("'{slug}' is not a valid slug (3-50 chars of a-z, 0-9 and '-', not only digits)"),
        ));
    }
    Ok(slug)
}

/// Empty input clears nothing and is treated as absent
fn checked_subdomain(subdomain: Option<&str>) -> Result<Option<String>, AppError> {
    let Some(label) = subdomain.map(|s| s.trim().to_ascii_lowercase()) else {
        return Ok(None);
    };
    if label.is_empty() {
        return Ok(None);
    }
    if !is_valid_slug(&label) || is_reserved_label(&label) {
        return Err(AppError::with_message(
            ErrorCode::StoreSlugInvalid,
            format!("'{label}' cannot be used as a subdomain"),
        ));
    }
    Ok(Some(label))
}

fn validate_profile(
    settings: Option<&StoreSettings>,
    customization: Option<&StoreCustomization>,
) -> Result<(), AppError> {
    if let Some(settings) = settings {
        settings.validate()?;
    }
    if let Some(customization) = customization {
        customization.validate()?;
    }
    Ok(())
}

/// GET /api/admin/stores
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<StoreListQuery>,
) -> ApiResult<PaginatedResponse<Store>> {
    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    };
    let (stores, total) = db::stores::list(
        &state.pool,
        query.status,
        query.q.as_deref(),
        page.limit(),
        page.offset(),
    )
    .await?;
    Ok(Json(PaginatedResponse::new(stores, total, page.page(), page.limit())))
}

/// GET /api/admin/stores/{id}
pub async fn get_by_id(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Store> {
    let store = db::stores::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(store))
}

/// POST /api/admin/stores
///
/// The owner is either a new account (`owner`) or an existing customer
/// (`owner_id`) promoted to store admin; both happen in the store's transaction.
pub async fn create(
    State(state): State<AppState>,
    admin: CurrentUser,
    Json(payload): Json<StoreCreate>,
) -> ApiResult<Store> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_store_contact(
        &payload.description,
        &payload.phone,
        &payload.email,
        &payload.address,
    )?;
    validate_profile(payload.settings.as_ref(), payload.customization.as_ref())?;
    if payload.owner.is_some() && payload.owner_id.is_some() {
        return Err(AppError::validation("Provide either owner or owner_id, not both").into());
    }

    let slug = match payload.slug.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(slug) => checked_slug(slug)?,
        None => checked_slug(&slugify(&payload.name))?,
    };
    let subdomain = checked_subdomain(payload.subdomain.as_deref())?;

    // New owner account: validate and hash before opening the transaction
    let new_owner = match &payload.owner {
        Some(owner) => {
            validate_required_text(&owner.name, "owner.name", MAX_NAME_LEN)?;
            validate_optional_text(&owner.phone, "owner.phone", MAX_SHORT_TEXT_LEN)?;
            let email = normalize_email(&owner.email);
            validate_email(&email)?;
            validate_password(&owner.password)?;
            Some((email, hash_for_storage(&owner.password)?))
        }
        None => None,
    };

    let settings = payload.settings.clone().unwrap_or_default();
    let customization = payload.customization.clone().unwrap_or_default();
    let now = now_millis();
    let permissions = default_store_admin_permissions();

    let mut tx = state.pool.begin().await?;
    let mut store = db::stores::insert(
        &mut *tx,
        &db::stores::NewStore {
            id: snowflake_id(),
            name: payload.name.trim(),
            slug: &slug,
            subdomain: subdomain.as_deref(),
            owner_id: None,
            description: payload.description.as_deref(),
            phone: payload.phone.as_deref(),
            email: payload.email.as_deref().map(str::trim),
            address: payload.address.as_deref(),
            plan: payload.plan.unwrap_or(SubscriptionPlan::Free),
            subscription_status: payload.subscription_status.unwrap_or(SubscriptionStatus::Trial),
            subscription_expires_at: payload.subscription_expires_at,
            settings: &settings,
            customization: &customization,
            now,
        },
    )
    .await?;

    let owner_id = match (&payload.owner, new_owner, payload.owner_id) {
        (Some(owner), Some((email, password_hash)), _) => {
            let user = db::users::insert(
                &mut *tx,
                &db::users::NewUser {
                    name: owner.name.trim(),
                    email: &email,
                    phone: owner.phone.as_deref(),
                    password_hash: &password_hash,
                    role: UserRole::StoreAdmin,
                    store_id: Some(store.id),
                    permissions: &permissions,
                },
            )
            .await?;
            Some(user.id)
        }
        (_, _, Some(user_id)) => {
            if !db::users::promote_to_store_admin(&mut *tx, user_id, store.id, &permissions, now)
                .await?
            {
                return Err(owner_rejection(&state, user_id).await?.into());
            }
            Some(user_id)
        }
        _ => None,
    };

    if let Some(owner_id) = owner_id {
        store = db::stores::set_owner(&mut *tx, store.id, owner_id, now).await?;
    }
    tx.commit().await?;

    tracing::info!(
        store_id = store.id,
        slug = %store.slug,
        owner_id = ?store.owner_id,
        admin_id = admin.id,
        "Store created"
    );
    Ok(Json(store))
}

/// Why `user_id` could not become a store owner
async fn owner_rejection(state: &AppState, user_id: i64) -> ServiceResult<AppError> {
    Ok(match db::users::find_by_id(&state.pool, user_id).await? {
        None => AppError::new(ErrorCode::UserNotFound).with_detail("owner_id", user_id),
        Some(user) => AppError::with_message(
            ErrorCode::InvalidRoleAssignment,
            format!("Only customers can become store owners, user is {}", user.role.as_db()),
        )
        .with_detail("owner_id", user_id),
    })
}

/// PUT /api/admin/stores/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(mut payload): Json<StoreUpdate>,
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
    validate_profile(payload.settings.as_ref(), payload.customization.as_ref())?;
    if let Some(slug) = payload.slug.as_deref() {
        payload.slug = Some(checked_slug(slug)?);
    }
    payload.subdomain = checked_subdomain(payload.subdomain.as_deref())?;

    let store = db::stores::update(&state.pool, id, &payload, now_millis())
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(store_id = id, "Store updated");
    Ok(Json(store))
}

/// PUT /api/admin/stores/{id}/subscription
pub async fn update_subscription(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<SubscriptionUpdate>,
) -> ApiResult<Store> {
    if payload.clear_expiry && payload.expires_at.is_some() {
        return Err(AppError::validation("expires_at and clear_expiry are exclusive").into());
    }
    let store = db::stores::update_subscription(
        &state.pool,
        id,
        payload.plan,
        payload.status,
        payload.expires_at,
        payload.clear_expiry,
        now_millis(),
    )
    .await?
    .ok_or_else(|| not_found(id))?;

    tracing::info!(
        store_id = id,
        plan = store.plan.as_db(),
        status = store.subscription_status.as_db(),
        expires_at = ?store.subscription_expires_at,
        "Store subscription updated"
    );
    Ok(Json(store))
}

/// PUT /api/admin/stores/{id}/status - activate / deactivate
pub async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<StoreStatusUpdate>,
) -> ApiResult<Store> {
    let store = db::stores::set_active(&state.pool, id, payload.is_active, now_millis())
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(store_id = id, is_active = store.is_active, "Store status changed");
    Ok(Json(store))
}

/// DELETE /api/admin/stores/{id}
pub async fn delete(
    State(state): State<AppState>,
    admin: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    if !db::stores::delete(&state.pool, id).await? {
        return Err(not_found(id).into());
    }
    tracing::warn!(store_id = id, admin_id = admin.id, "Store deleted");
    Ok(Json(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_slug() {
        assert_eq!(checked_slug(" Pizza-Luigi ").unwrap(), "pizza-luigi");
        assert_eq!(
            checked_slug("-bad-").unwrap_err().code,
            ErrorCode::StoreSlugInvalid
        );
        assert!(checked_slug("ab").is_err());
        assert!(checked_slug("pizza_luigi").is_err());
        assert_eq!(checked_slug("2024").unwrap_err().code, ErrorCode::StoreSlugInvalid);
    }

    #[test]
    fn test_checked_subdomain() {
        assert_eq!(checked_subdomain(None).unwrap(), None);
        assert_eq!(checked_subdomain(Some("  ")).unwrap(), None);
        assert_eq!(
            checked_subdomain(Some("Luigi")).unwrap().as_deref(),
            Some("luigi")
        );
        assert_eq!(
            checked_subdomain(Some("admin")).unwrap_err().code,
            ErrorCode::StoreSlugInvalid
        );
        assert!(checked_subdomain(Some("a.b")).is_err());
    }
}

//! User management

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{ResetPasswordRequest, User, UserCreate, UserRole, UserUpdate};
use shared::util::now_millis;
use shared::{PageQuery, PaginatedResponse};

use crate::api::ApiResult;
use crate::auth::CurrentUser;
use crate::auth::permissions::{default_store_admin_permissions, is_valid_permission};
use crate::db;
use crate::error::ServiceResult;
use crate::security_log;
use crate::state::AppState;
use crate::utils::password::hash_for_storage;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, normalize_email, validate_email, validate_optional_text,
    validate_password, validate_required_text,
};

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub role: Option<UserRole>,
    pub store_id: Option<i64>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

fn not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::UserNotFound).with_detail("id", id)
}

/// Store admins belong to exactly one existing store; other roles to none
async fn check_assignment(
    state: &AppState,
    role: UserRole,
    store_id: Option<i64>,
) -> ServiceResult<()> {
    match (role, store_id) {
        (UserRole::StoreAdmin, Some(store_id)) => {
            if !db::stores::exists(&state.pool, store_id).await? {
                return Err(AppError::new(ErrorCode::StoreNotFound)
                    .with_detail("store_id", store_id)
                    .into());
            }
            Ok(())
        }
        (UserRole::StoreAdmin, None) => Err(AppError::with_message(
            ErrorCode::InvalidRoleAssignment,
            "A store admin needs a store_id",
        )
        .into()),
        (_, Some(_)) => Err(AppError::with_message(
            ErrorCode::InvalidRoleAssignment,
            format!("Role {} cannot be bound to a store", role.as_db()),
        )
        .into()),
        (_, None) => Ok(()),
    }
}

/// Permissions kept for a role; only store admins carry an explicit list
fn permissions_for(
    role: UserRole,
    requested: Option<Vec<String>>,
) -> Result<Vec<String>, AppError> {
    if role != UserRole::StoreAdmin {
        return Ok(Vec::new());
    }
    let permissions = requested.unwrap_or_else(default_store_admin_permissions);
    if let Some(bad) = permissions.iter().find(|p| !is_valid_permission(p)) {
        return Err(AppError::with_message(
            ErrorCode::InvalidRequest,
            format!("Unknown permission '{bad}'"),
        ));
    }
    Ok(permissions)
}

/// GET /api/admin/users
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> ApiResult<PaginatedResponse<User>> {
    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    };
    let (users, total) = db::users::list(
        &state.pool,
        query.role,
        query.store_id,
        page.limit(),
        page.offset(),
    )
    .await?;
    Ok(Json(PaginatedResponse::new(users, total, page.page(), page.limit())))
}

/// GET /api/admin/users/{id}
pub async fn get_by_id(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<User> {
    let user = db::users::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(user))
}

/// POST /api/admin/users
pub async fn create(
    State(state): State<AppState>,
    admin: CurrentUser,
    Json(payload): Json<UserCreate>,
) -> ApiResult<User> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    let email = normalize_email(&payload.email);
    validate_email(&email)?;
    validate_password(&payload.password)?;
    check_assignment(&state, payload.role, payload.store_id).await?;
    let permissions = permissions_for(payload.role, payload.permissions)?;

    let password_hash = hash_for_storage(&payload.password)?;
    let user = db::users::insert(
        &state.pool,
        &db::users::NewUser {
            name: payload.name.trim(),
            email: &email,
            phone: payload.phone.as_deref(),
            password_hash: &password_hash,
            role: payload.role,
            store_id: payload.store_id,
            permissions: &permissions,
        },
    )
    .await?;

    tracing::info!(
        user_id = user.id,
        role = user.role.as_db(),
        store_id = ?user.store_id,
        admin_id = admin.id,
        "User created"
    );
    Ok(Json(user))
}

/// PUT /api/admin/users/{id}
///
/// Role and store are validated as a pair after merging with the stored user.
pub async fn update(
    State(state): State<AppState>,
    admin: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> ApiResult<User> {
    let existing = db::users::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    let email = match &payload.email {
        Some(email) => {
            let email = normalize_email(email);
            validate_email(&email)?;
            email
        }
        None => existing.email.clone(),
    };

    let role = payload.role.unwrap_or(existing.role);
    // Moving away from store_admin drops the store unless one is given
    let store_id = match (payload.store_id, role) {
        (Some(store_id), _) => Some(store_id),
        (None, UserRole::StoreAdmin) => existing.store_id,
        (None, _) => None,
    };
    let is_active = payload.is_active.unwrap_or(existing.is_active);

    if id == admin.id && (role != UserRole::SuperAdmin || !is_active) {
        return Err(AppError::with_message(
            ErrorCode::InvalidRoleAssignment,
            "You cannot demote or deactivate your own account",
        )
        .into());
    }
    check_assignment(&state, role, store_id).await?;
    let permissions = permissions_for(
        role,
        payload
            .permissions
            .or_else(|| (existing.role == role).then(|| existing.permissions.clone())),
    )?;

    let name = payload.name.as_deref().map(str::trim).unwrap_or(&existing.name);
    let phone = payload.phone.as_deref().or(existing.phone.as_deref());
    let user = db::users::update(
        &state.pool,
        id,
        &db::users::UserChanges {
            name,
            email: &email,
            phone,
            role,
            store_id,
            permissions: &permissions,
            is_active,
        },
        now_millis(),
    )
    .await?
    .ok_or_else(|| not_found(id))?;

    if existing.role != user.role {
        security_log!(
            "INFO",
            "role_changed",
            user_id = id,
            from = existing.role.as_db(),
            to = user.role.as_db(),
            admin_id = admin.id
        );
    }
    Ok(Json(user))
}

/// DELETE /api/admin/users/{id}
pub async fn delete(
    State(state): State<AppState>,
    admin: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    if id == admin.id {
        return Err(AppError::new(ErrorCode::CannotDeleteSelf).into());
    }
    if !db::users::delete(&state.pool, id).await? {
        return Err(not_found(id).into());
    }
    tracing::info!(user_id = id, admin_id = admin.id, "User deleted");
    Ok(Json(true))
}

/// PUT /api/admin/users/{id}/password
pub async fn reset_password(
    State(state): State<AppState>,
    admin: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<ResetPasswordRequest>,
) -> ApiResult<bool> {
    validate_password(&payload.new_password)?;
    let password_hash = hash_for_storage(&payload.new_password)?;
    if !db::users::update_password(&state.pool, id, &password_hash, now_millis()).await? {
        return Err(not_found(id).into());
    }
    security_log!("INFO", "password_reset", user_id = id, admin_id = admin.id);
    Ok(Json(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permissions_for_roles() {
        assert!(permissions_for(UserRole::Customer, Some(vec!["all".into()]))
            .unwrap()
            .is_empty());
        assert!(permissions_for(UserRole::SuperAdmin, None).unwrap().is_empty());
        assert_eq!(
            permissions_for(UserRole::StoreAdmin, None).unwrap(),
            default_store_admin_permissions()
        );
        assert_eq!(
            permissions_for(UserRole::StoreAdmin, Some(vec!["menu:*".into()])).unwrap(),
            vec!["menu:*".to_string()]
        );
        assert!(permissions_for(UserRole::StoreAdmin, Some(vec!["root".into()])).is_err());
    }
}

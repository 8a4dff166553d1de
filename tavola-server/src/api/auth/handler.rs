//! Authentication handlers

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    ChangePasswordRequest, LoginRequest, LoginResponse, Order, ProfileUpdate, RegisterRequest,
    User, UserRole,
};
use shared::util::now_millis;
use shared::{PageQuery, PaginatedResponse};

use crate::api::ApiResult;
use crate::auth::CurrentUser;
use crate::db;
use crate::security_log;
use crate::state::AppState;
use crate::utils::password::{hash_for_storage, verify_password};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, normalize_email, validate_email, validate_optional_text,
    validate_password, validate_required_text,
};

fn issue_token(state: &AppState, user: &User) -> Result<String, AppError> {
    state.jwt_service.generate_token(user).map_err(|e| {
        tracing::error!(user_id = user.id, error = %e, "JWT creation failed");
        AppError::new(ErrorCode::InternalError)
    })
}

/// POST /api/auth/register - customer self-registration
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<LoginResponse> {
    validate_required_text(&req.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&req.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    let email = normalize_email(&req.email);
    validate_email(&email)?;
    validate_password(&req.password)?;

    let password_hash = hash_for_storage(&req.password)?;
    let user = db::users::insert(
        &state.pool,
        &db::users::NewUser {
            name: req.name.trim(),
            email: &email,
            phone: req.phone.as_deref(),
            password_hash: &password_hash,
            role: UserRole::Customer,
            store_id: None,
            permissions: &[],
        },
    )
    .await?;

    let token = issue_token(&state, &user)?;
    tracing::info!(user_id = user.id, "Customer registered");
    Ok(Json(LoginResponse { token, user }))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let email = normalize_email(&req.email);
    let (user, password_hash) = db::users::find_credentials_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| {
            security_log!("WARN", "login_failed", email = email.as_str(), reason = "unknown_email");
            AppError::invalid_credentials()
        })?;

    if !verify_password(&req.password, &password_hash) {
        security_log!("WARN", "login_failed", user_id = user.id, reason = "bad_password");
        return Err(AppError::invalid_credentials().into());
    }

    if !user.is_active {
        security_log!("WARN", "login_disabled", user_id = user.id);
        return Err(AppError::new(ErrorCode::AccountDisabled).into());
    }

    if user.role == UserRole::StoreAdmin {
        let store_exists = match user.store_id {
            Some(store_id) => db::stores::exists(&state.pool, store_id).await?,
            None => false,
        };
        if !store_exists {
            return Err(AppError::with_message(
                ErrorCode::StoreNotFound,
                "The store of this account no longer exists",
            )
            .into());
        }
    }

    let token = issue_token(&state, &user)?;
    let now = now_millis();
    db::users::touch_login(&state.pool, user.id, now).await?;

    security_log!("INFO", "login_success", user_id = user.id, role = user.role.as_db());
    Ok(Json(LoginResponse {
        token,
        user: User {
            last_login_at: Some(now),
            ..user
        },
    }))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<User> {
    let user = db::users::find_by_id(&state.pool, current.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    Ok(Json(user))
}

/// PUT /api/auth/me - update own name/phone
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<ProfileUpdate>,
) -> ApiResult<User> {
    if let Some(name) = &req.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&req.phone, "phone", MAX_SHORT_TEXT_LEN)?;

    let user = db::users::update_profile(
        &state.pool,
        current.id,
        req.name.as_deref().map(str::trim),
        req.phone.as_deref(),
        now_millis(),
    )
    .await?
    .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    Ok(Json(user))
}

/// PUT /api/auth/password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<bool> {
    validate_password(&req.new_password)?;

    let existing = db::users::find_password_hash(&state.pool, current.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    if !verify_password(&req.current_password, &existing) {
        security_log!("WARN", "password_change_failed", user_id = current.id);
        return Err(AppError::with_message(
            ErrorCode::InvalidCredentials,
            "Current password is incorrect",
        )
        .into());
    }

    let new_hash = hash_for_storage(&req.new_password)?;
    db::users::update_password(&state.pool, current.id, &new_hash, now_millis()).await?;

    security_log!("INFO", "password_changed", user_id = current.id);
    Ok(Json(true))
}

/// GET /api/auth/orders - the caller's own orders, newest first
pub async fn my_orders(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(page): Query<PageQuery>,
) -> ApiResult<PaginatedResponse<Order>> {
    let (orders, total) =
        db::orders::list_by_customer(&state.pool, current.id, page.limit(), page.offset()).await?;
    Ok(Json(PaginatedResponse::new(orders, total, page.page(), page.limit())))
}

//! Authentication middleware
//!
//! Axum middleware for JWT authentication and the role gate.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::{AppError, ErrorCode};
use shared::models::{User, UserRole};

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::db;
use crate::security_log;
use crate::state::AppState;

/// Authenticate the bearer token of a request, if one is present.
///
/// The token only names the caller; role, store, permissions and the active
/// flag are read from the user row so admin edits apply immediately.
/// `Ok(None)` means no `Authorization` header was sent.
pub(crate) async fn authenticate(
    state: &AppState,
    headers: &http::HeaderMap,
    uri: &http::Uri,
) -> Result<Option<CurrentUser>, AppError> {
    let Some(header) = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        return Ok(None);
    };

    let token = JwtService::extract_from_header(header)
        .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?;

    let claimed = match state
        .jwt_service
        .validate_token(token)
        .and_then(CurrentUser::try_from)
    {
        Ok(user) => user,
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", uri)
            );
            return match e {
                JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            };
        }
    };

    let row = db::users::find_by_id(&state.pool, claimed.id).await?;
    current_from_row(claimed.id, row).map(Some)
}

/// Caller as stored now, or why the token no longer grants access
pub(crate) fn current_from_row(id: i64, row: Option<User>) -> Result<CurrentUser, AppError> {
    match row {
        None => {
            security_log!("WARN", "auth_unknown_user", user_id = id);
            Err(AppError::invalid_token("Account no longer exists"))
        }
        Some(user) if !user.is_active => {
            security_log!("WARN", "auth_account_disabled", user_id = id);
            Err(AppError::new(ErrorCode::AccountDisabled))
        }
        Some(user) => Ok(CurrentUser::from(&user)),
    }
}

/// Require a valid bearer token.
///
/// On success [`CurrentUser`] is inserted into the request extensions.
///
/// | Failure | Code |
/// |---------|------|
/// | no `Authorization` header | 401 NotAuthenticated |
/// | expired token | 401 TokenExpired |
/// | deactivated account | 401 AccountDisabled |
/// | anything else | 401 TokenInvalid |
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    match authenticate(&state, req.headers(), req.uri()).await? {
        Some(user) => {
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            Err(AppError::not_authenticated())
        }
    }
}

/// Attach [`CurrentUser`] when a valid token of an active account is present;
/// never rejects.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Ok(Some(user)) = authenticate(&state, req.headers(), req.uri()).await {
        req.extensions_mut().insert(user);
    }
    next.run(req).await
}

/// Role gate - the caller's role must be in `roles`
///
/// ```ignore
/// Router::new()
///     .route("/", get(handler::list))
///     .layer(middleware::from_fn(require_role(&[UserRole::StoreAdmin, UserRole::SuperAdmin])));
/// ```
pub fn require_role(
    roles: &'static [UserRole],
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or_else(AppError::not_authenticated)?;

            if !roles.contains(&user.role) {
                security_log!(
                    "WARN",
                    "role_required",
                    user_id = user.id,
                    user_role = user.role.as_db(),
                    uri = format!("{:?}", req.uri())
                );
                let allowed: Vec<&str> = roles.iter().map(|r| r.as_db()).collect();
                return Err(AppError::role_required(format!(
                    "This action requires one of: {}",
                    allowed.join(", ")
                )));
            }

            Ok(next.run(req).await)
        })
    }
}

/// Super admin gate
pub async fn require_super_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(AppError::not_authenticated)?;
    if !user.is_super_admin() {
        security_log!(
            "WARN",
            "super_admin_required",
            user_id = user.id,
            user_role = user.role.as_db()
        );
        return Err(AppError::new(ErrorCode::SuperAdminRequired));
    }

    Ok(next.run(req).await)
}

/// Permission gate
///
/// Supports `"menu:*"` wildcards and `"all"`; super admins always pass.
///
/// ```ignore
/// Router::new()
///     .route("/", get(handler::list))
///     .layer(middleware::from_fn(require_permission("tables:manage")));
/// ```
pub fn require_permission(
    permission: &'static str,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            check_permissions(&req, &[permission])?;
            Ok(next.run(req).await)
        })
    }
}

/// Permission gate passing when the caller holds any of `permissions`
pub fn require_any_permission(
    permissions: &'static [&'static str],
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            check_permissions(&req, permissions)?;
            Ok(next.run(req).await)
        })
    }
}

fn check_permissions(req: &Request, permissions: &[&str]) -> Result<(), AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(AppError::not_authenticated)?;

    if !user.has_any_permission(permissions) {
        security_log!(
            "WARN",
            "permission_denied",
            user_id = user.id,
            user_role = user.role.as_db(),
            required_permission = permissions.join("|")
        );
        return Err(AppError::permission_denied(format!(
            "Permission denied: {}",
            permissions.join(" or ")
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, middleware, routing::get};
    use tower::ServiceExt;

    fn row(role: UserRole, is_active: bool, permissions: &[&str]) -> User {
        User {
            id: 77,
            name: "Marta".into(),
            email: "marta@trattoria.test".into(),
            phone: None,
            role,
            store_id: (role == UserRole::StoreAdmin).then_some(5),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            is_active,
            last_login_at: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn caller(role: UserRole, permissions: &[&str]) -> Option<CurrentUser> {
        Some(CurrentUser::from(&row(role, true, permissions)))
    }

    /// `gate` wraps the route; the caller is attached outside of it
    async fn status_behind(
        user: Option<CurrentUser>,
        gate: impl FnOnce(Router) -> Router,
    ) -> http::StatusCode {
        let app = gate(Router::new().route("/", get(|| async { "ok" }))).layer(
            middleware::from_fn(move |mut req: Request, next: Next| {
                let user = user.clone();
                async move {
                    if let Some(user) = user {
                        req.extensions_mut().insert(user);
                    }
                    next.run(req).await
                }
            }),
        );
        let request = http::Request::builder().uri("/").body(Body::empty()).unwrap();
        app.oneshot(request).await.unwrap().status()
    }

    fn staff_only(router: Router) -> Router {
        router.layer(middleware::from_fn(require_role(&[UserRole::StoreAdmin])))
    }

    fn menu_managers(router: Router) -> Router {
        router.layer(middleware::from_fn(require_permission("menu:manage")))
    }

    fn console(router: Router) -> Router {
        router.layer(middleware::from_fn(require_super_admin))
    }

    #[test]
    fn test_deactivated_account_is_rejected() {
        let err = current_from_row(77, Some(row(UserRole::StoreAdmin, false, &["all"])))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AccountDisabled);
        assert_eq!(err.http_status(), http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_deleted_account_is_rejected() {
        let err = current_from_row(77, None).unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }

    #[test]
    fn test_row_overrides_token_claims() {
        // Demoted to customer after the token was issued
        let current = current_from_row(77, Some(row(UserRole::Customer, true, &[]))).unwrap();
        assert_eq!(current.role, UserRole::Customer);
        assert_eq!(current.store_id, None);
        assert!(!current.has_permission("menu:manage"));

        let current =
            current_from_row(77, Some(row(UserRole::StoreAdmin, true, &["orders:manage"])))
                .unwrap();
        assert_eq!(current.store_id, Some(5));
        assert!(current.has_permission("orders:manage"));
        assert!(!current.has_permission("menu:manage"));
    }

    #[tokio::test]
    async fn test_role_gate() {
        use http::StatusCode;
        assert_eq!(status_behind(None, staff_only).await, StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_behind(caller(UserRole::Customer, &[]), staff_only).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_behind(caller(UserRole::StoreAdmin, &[]), staff_only).await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_permission_gate() {
        use http::StatusCode;
        assert_eq!(
            status_behind(caller(UserRole::StoreAdmin, &["orders:manage"]), menu_managers).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_behind(caller(UserRole::StoreAdmin, &["menu:*"]), menu_managers).await,
            StatusCode::OK
        );
        assert_eq!(
            status_behind(caller(UserRole::SuperAdmin, &[]), menu_managers).await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_super_admin_gate() {
        use http::StatusCode;
        assert_eq!(
            status_behind(caller(UserRole::StoreAdmin, &["all"]), console).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_behind(caller(UserRole::SuperAdmin, &[]), console).await,
            StatusCode::OK
        );
    }
}

//! Application state

use std::sync::Arc;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::BoxError;
use crate::auth::{JwtService, RateLimiter};
use crate::config::Config;
use crate::db;
use crate::utils::password;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    pub jwt_service: Arc<JwtService>,
    /// Rate limiter for login/registration routes
    pub rate_limiter: RateLimiter,
    pub config: Arc<Config>,
}

impl AppState {
    /// Connect, run migrations and bootstrap the first super admin
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        let state = Self::with_pool(config, pool);
        state.bootstrap_super_admin().await?;
        Ok(state)
    }

    /// Build state around an existing pool (no migrations)
    pub fn with_pool(config: &Config, pool: PgPool) -> Self {
        Self {
            pool,
            jwt_service: Arc::new(JwtService::with_config(config.jwt_config())),
            rate_limiter: RateLimiter::new(),
            config: Arc::new(config.clone()),
        }
    }

    /// Create the configured super admin when the platform has none
    async fn bootstrap_super_admin(&self) -> Result<(), BoxError> {
        let (Some(email), Some(pw)) = (
            self.config.super_admin_email.as_deref(),
            self.config.super_admin_password.as_deref(),
        ) else {
            return Ok(());
        };

        let existing = db::users::count_super_admins(&self.pool)
            .await
            .map_err(|e| format!("count super admins: {e:?}"))?;
        if existing > 0 {
            return Ok(());
        }

        let hash = password::hash_password(pw).map_err(|e| format!("hash password: {e}"))?;
        let user = db::users::insert(
            &self.pool,
            &db::users::NewUser {
                name: "Super Admin",
                email: &email.trim().to_lowercase(),
                phone: None,
                password_hash: &hash,
                role: shared::models::UserRole::SuperAdmin,
                store_id: None,
                permissions: &[],
            },
        )
        .await
        .map_err(|e| format!("bootstrap super admin: {e:?}"))?;

        tracing::info!(user_id = user.id, email = %user.email, "Bootstrapped super admin");
        Ok(())
    }
}

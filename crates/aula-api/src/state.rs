//! Application state management

use crate::auth::{AuthService, PgIdentityStore, PgRefreshTokenStore, TokenIssuer};
use crate::db::TxExecutor;
use aula_core::config::AppConfig;
use sqlx::PgPool;
use std::sync::Arc;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Token issuer, used directly by the auth middleware
    pub issuer: TokenIssuer,
    /// Authentication service
    pub auth: Arc<AuthService>,
}

impl AppState {
    /// Wire the stores and services onto one shared pool.
    pub fn new(config: AppConfig, pool: PgPool) -> Self {
        let executor = TxExecutor::new(pool);
        let issuer = TokenIssuer::new(&config.auth);

        let identity = Arc::new(PgIdentityStore::new(
            executor.clone(),
            config.auth.max_failed_attempts,
            config.auth.lockout_duration_mins,
        ));
        let tokens = Arc::new(PgRefreshTokenStore::new(
            executor,
            config.auth.refresh_ttl_days,
        ));

        let auth = Arc::new(AuthService::new(
            identity,
            tokens,
            issuer.clone(),
            config.auth.password_min_len,
        ));

        Self {
            config,
            issuer,
            auth,
        }
    }
}

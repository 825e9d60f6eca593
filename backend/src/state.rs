//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! Everything expensive (JWT keys, the DB pool, the auth service) is built
//! once at startup; the state is read-only during request handling and
//! cheap to clone.

use crate::config::AppConfig;
use crate::repositories::{CredentialStore, PgCredentialStore, PgResetTokenStore, ResetTokenStore};
use crate::services::AuthService;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Authentication service over the configured stores
    pub auth: AuthService,
}

impl AppState {
    /// Create application state backed by Postgres stores
    pub fn new(db: PgPool, config: AppConfig) -> Self {
        let users = Arc::new(PgCredentialStore::new(db.clone()));
        let reset_tokens = Arc::new(PgResetTokenStore::new(db.clone()));
        Self::with_stores(db, config, users, reset_tokens)
    }

    /// Create application state over arbitrary stores
    pub fn with_stores(
        db: PgPool,
        config: AppConfig,
        users: Arc<dyn CredentialStore>,
        reset_tokens: Arc<dyn ResetTokenStore>,
    ) -> Self {
        let auth = AuthService::new(users, reset_tokens, &config);

        Self {
            db,
            config: Arc::new(config),
            auth,
        }
    }

    /// Get a reference to the database pool
    #[inline]
    pub fn db(&self) -> &PgPool {
        &self.db
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a reference to the auth service
    #[inline]
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }
}

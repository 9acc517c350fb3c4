//! Authentication module for the flock server.
//!
//! This module provides:
//! - Password login backed by Argon2id hashes
//! - Database-backed session management
//! - Extractors that resolve the caller and their active scope
//!
//! # Authorization Model
//!
//! A session only establishes who the caller is. What they may touch is
//! decided per request: the extractors load the caller's most recent role
//! assignment and hand its [`ScopeAssignment`](flock_authz::ScopeAssignment)
//! to the handler, which asks the [`ScopeAuthorizer`] about every row it
//! lists, reads, or writes. Role changes therefore take effect on the next
//! request, not at the next login.

pub mod db;
pub mod middleware;
pub mod routes;

use crate::config::{AuthConfig, SessionConfig};
use crate::error::ApiError;
use flock_authz::ScopeAuthorizer;
use flock_platform_access::{hash_password, verify_password};
use sqlx::PgPool;

pub use middleware::{AuthRejection, RequireAuth, RequireScope, RequireSuperadmin};
pub use routes::{login, logout, me};

/// Session cookie name.
pub const SESSION_COOKIE: &str = "session";

/// Shared application state.
pub struct AppState {
    /// Database connection pool.
    pub db_pool: PgPool,
    /// Session configuration.
    pub session_config: SessionConfig,
    /// Password handling configuration.
    pub auth_config: AuthConfig,
    /// The row-level access evaluator.
    pub authorizer: ScopeAuthorizer,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(db_pool: PgPool, session_config: SessionConfig, auth_config: AuthConfig) -> Self {
        Self {
            db_pool,
            session_config,
            auth_config,
            authorizer: ScopeAuthorizer::new(),
        }
    }

    /// Returns the configured password pepper, if any.
    pub fn password_pepper(&self) -> Option<&str> {
        self.auth_config.password_pepper.as_deref()
    }
}

/// Hashes a new password on the blocking pool.
pub(crate) async fn hash_password_blocking(
    password: String,
    pepper: Option<String>,
) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hash_password(&password, pepper.as_deref()))
        .await
        .map_err(ApiError::internal)?
        .map_err(ApiError::internal)
}

/// Verifies a password against a stored hash on the blocking pool.
pub(crate) async fn verify_password_blocking(
    password: String,
    hash: String,
    pepper: Option<String>,
) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash, pepper.as_deref()))
        .await
        .map_err(ApiError::internal)?
        .map_err(ApiError::internal)
}

//! Authentication extractors for Axum.
//!
//! [`RequireAuth`] resolves the session cookie to a user and their active role
//! assignment. [`RequireScope`] additionally insists on a role, and
//! [`RequireSuperadmin`] on the superadmin role.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use flock_authz::ScopeAssignment;
use flock_platform_access::{
    AuthenticatedUser, AuthenticationError, AuthorizationError, SessionId,
};
use std::sync::Arc;
use tracing::debug;

use super::{
    AppState, SESSION_COOKIE,
    db::{RoleAssignmentRepository, SessionRepository, UserRepository},
};
use crate::error::ApiError;

/// Extractor for requiring an authenticated user.
///
/// The user may or may not hold a role assignment.
pub struct RequireAuth(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|e| AuthRejection::Internal(e.to_string()))?;

        // Get session ID from cookie
        let session_cookie = jar
            .get(SESSION_COOKIE)
            .ok_or(AuthRejection::NotAuthenticated)?;

        let session_id = SessionId::new(session_cookie.value().to_string());

        // Look up session in database
        let session_repo = SessionRepository::new(app_state.db_pool.clone());
        let session = session_repo
            .find_by_id(&session_id)
            .await
            .map_err(|e| AuthRejection::Internal(e.to_string()))?
            .ok_or_else(|| {
                AuthRejection::Authentication(AuthenticationError::InvalidSession {
                    session_id: session_id.to_string(),
                })
            })?;

        if session.is_expired() {
            // Delete the expired session
            let _ = session_repo.delete(&session_id).await;
            return Err(AuthRejection::Authentication(
                AuthenticationError::SessionExpired {
                    session_id: session_id.to_string(),
                },
            ));
        }

        // Load user from database
        let user_repo = UserRepository::new(app_state.db_pool.clone());
        let user = user_repo
            .find_by_id(session.user_id())
            .await
            .map_err(|e| AuthRejection::Internal(e.to_string()))?
            .ok_or(AuthRejection::Authentication(
                AuthenticationError::UserNotFound {
                    user_id: session.user_id(),
                },
            ))?;

        // Resolve the active role on every request
        let role_repo = RoleAssignmentRepository::new(app_state.db_pool.clone());
        let assignment = role_repo
            .find_active_for_user(user.id())
            .await
            .map_err(|e| AuthRejection::Internal(e.to_string()))?;

        Ok(RequireAuth(AuthenticatedUser::new(user, session, assignment)))
    }
}

/// Extractor for an authenticated user together with their active scope.
pub struct RequireScope {
    pub caller: AuthenticatedUser,
    pub scope: ScopeAssignment,
}

impl<S> FromRequestParts<S> for RequireScope
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(caller) = RequireAuth::from_request_parts(parts, state).await?;

        let scope = match caller.assignment() {
            Some(assignment) => *assignment.scope(),
            None => {
                return Err(AuthRejection::Authorization(
                    AuthorizationError::NoActiveRole {
                        user_id: caller.user_id(),
                    },
                ));
            }
        };

        Ok(RequireScope { caller, scope })
    }
}

/// Extractor for requiring a superadmin.
pub struct RequireSuperadmin(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireSuperadmin
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;

        if !user.is_superadmin() {
            return Err(AuthRejection::Authorization(
                AuthorizationError::SuperadminRequired {
                    user_id: user.user_id(),
                },
            ));
        }

        Ok(RequireSuperadmin(user))
    }
}

/// Rejection type for authentication extractors.
#[derive(Debug)]
pub enum AuthRejection {
    /// No session cookie was sent.
    NotAuthenticated,
    /// A session cookie was sent but does not identify a live session.
    Authentication(AuthenticationError),
    /// The caller is known but may not proceed.
    Authorization(AuthorizationError),
    Internal(String),
}

impl From<AuthRejection> for ApiError {
    fn from(rejection: AuthRejection) -> Self {
        match rejection {
            AuthRejection::NotAuthenticated => ApiError::Unauthenticated,
            AuthRejection::Authentication(err) => {
                debug!(error = %err, "authentication rejected");
                ApiError::Unauthenticated
            }
            AuthRejection::Authorization(err) => {
                debug!(error = %err, "authorization rejected");
                ApiError::from(err)
            }
            AuthRejection::Internal(details) => ApiError::Internal { details },
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

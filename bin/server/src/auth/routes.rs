//! Authentication routes for login, logout, and the current caller.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Duration as ChronoDuration;
use flock_authz::{RowFilter, ScopeAssignment, ScopeAuthorizer};
use flock_core::UserId;
use flock_platform_access::{
    AuthenticatedUser, AuthenticationError, Session, SessionId, User,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::Duration as TimeDuration;
use tracing::{debug, info};

use super::{
    AppState, RequireAuth, SESSION_COOKIE,
    db::{SessionRepository, UserRepository, generate_session_id},
    verify_password_blocking,
};
use crate::error::ApiError;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public view of a user account.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub email: String,
    pub display_name: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            email: user.email().to_string(),
            display_name: user.display_name().map(str::to_string),
        }
    }
}

/// The current caller, their scope, and the rows it lets them see.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserSummary,
    pub scope: Option<ScopeAssignment>,
    pub row_filter: Option<RowFilter>,
}

impl MeResponse {
    fn new(authorizer: &ScopeAuthorizer, caller: &AuthenticatedUser) -> Self {
        let scope = caller.scope().ok().copied();
        Self {
            user: UserSummary::from(caller.user()),
            row_filter: scope.as_ref().map(|s| authorizer.filter_for(s)),
            scope,
        }
    }
}

/// Verifies email and password and starts a session.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_repo = UserRepository::new(state.db_pool.clone());
    let Some(user) = user_repo.find_by_email(&request.email).await? else {
        debug!(error = %AuthenticationError::InvalidCredentials, "unknown login email");
        return Err(ApiError::Unauthenticated);
    };

    let matches = verify_password_blocking(
        request.password,
        user.password_hash().to_string(),
        state.password_pepper().map(str::to_string),
    )
    .await?;
    if !matches {
        debug!(
            user_id = %user.id(),
            error = %AuthenticationError::InvalidCredentials,
            "password mismatch"
        );
        return Err(ApiError::Unauthenticated);
    }

    // Create session
    let session_id = generate_session_id();
    let session_duration = state.session_config.duration_minutes;
    let session = Session::new(
        session_id.clone(),
        user.id(),
        ChronoDuration::minutes(session_duration),
    );

    let session_repo = SessionRepository::new(state.db_pool.clone());
    session_repo.create(&session).await?;
    info!(user_id = %user.id(), "user logged in");

    // Set session cookie
    let session_cookie = Cookie::build((SESSION_COOKIE, session_id.as_str().to_string()))
        .path("/")
        .http_only(true)
        .secure(state.session_config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::minutes(session_duration));

    Ok((jar.add(session_cookie), Json(UserSummary::from(&user))))
}

/// Logs out the user by deleting their session.
pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    if let Some(session_cookie) = jar.get(SESSION_COOKIE) {
        let session_id = SessionId::new(session_cookie.value().to_string());

        let session_repo = SessionRepository::new(state.db_pool.clone());
        if let Err(e) = session_repo.delete(&session_id).await {
            tracing::warn!(error = %e, "failed to delete session on logout");
        }
    }

    // Remove session cookie
    let remove_session = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(TimeDuration::ZERO);

    (jar.add(remove_session), StatusCode::NO_CONTENT)
}

/// Returns the current user and their active scope.
pub async fn me(
    State(state): State<Arc<AppState>>,
    RequireAuth(caller): RequireAuth,
) -> Json<MeResponse> {
    Json(MeResponse::new(&state.authorizer, &caller))
}

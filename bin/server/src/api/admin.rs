//! Superadmin endpoints for accounts and role assignments.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use flock_authz::ScopeAssignment;
use flock_core::UserId;
use flock_platform_access::{RoleAssignment, User};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::auth::db::{RoleAssignmentRepository, UserRepository};
use crate::auth::routes::UserSummary;
use crate::auth::{AppState, RequireSuperadmin, hash_password_blocking};
use crate::error::ApiError;

const MIN_PASSWORD_LENGTH: usize = 8;

/// Optional narrowing of a role assignment listing.
#[derive(Debug, Default, Deserialize)]
pub struct RoleAssignmentQuery {
    pub user_id: Option<String>,
}

/// Body of a role assignment request.
///
/// The scope is written inline: `{"user_id": "...", "scope": "region", "region_id": 1}`.
#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub user_id: String,
    #[serde(flatten)]
    pub scope: ScopeAssignment,
}

/// Body of a user creation request.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl CreateUserRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(ApiError::bad_request("email is not a valid address"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ApiError::bad_request(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        Ok(())
    }
}

fn parse_user_id(raw: &str) -> Result<UserId, ApiError> {
    UserId::from_str(raw).map_err(|e| ApiError::bad_request(e.to_string()))
}

/// Lists role assignments, oldest first.
pub async fn list_role_assignments(
    State(state): State<Arc<AppState>>,
    RequireSuperadmin(_admin): RequireSuperadmin,
    Query(query): Query<RoleAssignmentQuery>,
) -> Result<Json<Vec<RoleAssignment>>, ApiError> {
    let user_id = query.user_id.as_deref().map(parse_user_id).transpose()?;
    let repo = RoleAssignmentRepository::new(state.db_pool.clone());
    Ok(Json(repo.list(user_id).await?))
}

/// Grants a user a scope. The new assignment replaces any earlier one as the
/// user's active role.
#[instrument(skip_all)]
pub async fn assign_role(
    State(state): State<Arc<AppState>>,
    RequireSuperadmin(admin): RequireSuperadmin,
    Json(request): Json<AssignRoleRequest>,
) -> Result<(StatusCode, Json<RoleAssignment>), ApiError> {
    let user_id = parse_user_id(&request.user_id)?;

    if let Err(err) = request.scope.validate() {
        debug!(error = %err, "rejected scope assignment");
        return Err(ApiError::bad_request(format!(
            "{} scope must set exactly the ids it requires",
            request.scope.scope
        )));
    }

    let users = UserRepository::new(state.db_pool.clone());
    if users.find_by_id(user_id).await?.is_none() {
        return Err(ApiError::NotFound { resource: "user" });
    }

    let repo = RoleAssignmentRepository::new(state.db_pool.clone());
    let assignment = repo.create(user_id, &request.scope).await?;
    info!(
        %user_id,
        scope = %request.scope.scope,
        admin_id = %admin.user_id(),
        "role assigned"
    );

    Ok((StatusCode::CREATED, Json(assignment)))
}

/// Creates a user account with a password.
#[instrument(skip_all)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    RequireSuperadmin(admin): RequireSuperadmin,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserSummary>), ApiError> {
    request.validate()?;

    let password_hash =
        hash_password_blocking(request.password, state.password_pepper().map(str::to_string))
            .await?;
    let mut user = User::new(request.email.trim().to_string(), password_hash);
    user.set_display_name(request.display_name);

    let repo = UserRepository::new(state.db_pool.clone());
    repo.create(&user).await?;
    info!(user_id = %user.id(), admin_id = %admin.user_id(), "user created");

    Ok((StatusCode::CREATED, Json(UserSummary::from(&user))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flock_authz::ScopeKind;
    use flock_core::RegionId;
    use serde_json::json;

    fn create_request(email: &str, password: &str) -> CreateUserRequest {
        CreateUserRequest {
            email: email.to_string(),
            password: password.to_string(),
            display_name: None,
        }
    }

    #[test]
    fn assign_role_reads_inline_scope() {
        let user_id = UserId::new();
        let request: AssignRoleRequest = serde_json::from_value(json!({
            "user_id": user_id.to_string(),
            "scope": "region",
            "region_id": 1
        }))
        .expect("deserialize");

        assert_eq!(parse_user_id(&request.user_id).expect("parse"), user_id);
        assert_eq!(request.scope, ScopeAssignment::region(RegionId::new(1)));
    }

    #[test]
    fn assign_role_accepts_bare_ulid() {
        let user_id = UserId::new();
        let parsed = parse_user_id(&user_id.as_ulid().to_string()).expect("parse");
        assert_eq!(parsed, user_id);
    }

    #[test]
    fn malformed_user_id_is_a_bad_request() {
        let err = parse_user_id("not-a-user").expect_err("invalid");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn scope_without_its_id_is_read_but_fails_validation() {
        let request: AssignRoleRequest = serde_json::from_value(json!({
            "user_id": UserId::new().to_string(),
            "scope": "university"
        }))
        .expect("deserialize");

        assert_eq!(request.scope.scope, ScopeKind::University);
        assert!(request.scope.validate().is_err());
    }

    #[test]
    fn user_creation_checks_email_and_password_length() {
        assert!(create_request("new@example.org", "long enough").validate().is_ok());
        assert!(create_request("not-an-email", "long enough").validate().is_err());
        assert!(create_request("new@example.org", "short").validate().is_err());
    }
}

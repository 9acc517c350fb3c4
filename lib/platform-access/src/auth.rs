//! The authenticated caller as seen by request handlers.

use crate::error::AuthorizationError;
use crate::role::RoleAssignment;
use crate::session::Session;
use crate::user::User;
use flock_authz::{ScopeAssignment, ScopeKind};
use flock_core::UserId;
use rootcause::prelude::Report;

/// Represents an authenticated user context extracted from the request.
///
/// The role assignment is resolved fresh on every request, so a caller
/// whose role was just changed sees the new scope immediately.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    user: User,
    session: Session,
    /// The active role assignment, if the user holds any.
    assignment: Option<RoleAssignment>,
}

impl AuthenticatedUser {
    /// Creates a new authenticated user context.
    #[must_use]
    pub fn new(user: User, session: Session, assignment: Option<RoleAssignment>) -> Self {
        Self {
            user,
            session,
            assignment,
        }
    }

    /// Returns the authenticated user's ID.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user.id()
    }

    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the active role assignment, if any.
    #[must_use]
    pub fn assignment(&self) -> Option<&RoleAssignment> {
        self.assignment.as_ref()
    }

    /// Returns the caller's scope.
    ///
    /// A user without a role assignment has no scope at all and is refused
    /// rather than treated as unrestricted.
    pub fn scope(&self) -> Result<&ScopeAssignment, Report<AuthorizationError>> {
        match &self.assignment {
            Some(assignment) => Ok(assignment.scope()),
            None => Err(AuthorizationError::NoActiveRole {
                user_id: self.user_id(),
            }
            .into()),
        }
    }

    /// Returns true if the caller's active role is superadmin.
    #[must_use]
    pub fn is_superadmin(&self) -> bool {
        self.assignment
            .as_ref()
            .is_some_and(|a| a.scope().scope == ScopeKind::Superadmin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionId;
    use chrono::{Duration, Utc};
    use flock_core::{RegionId, RoleAssignmentId};

    fn caller(scope: Option<ScopeAssignment>) -> AuthenticatedUser {
        let user = User::new("someone@example.org".to_string(), "hash".to_string());
        let session = Session::new(
            SessionId::new("sess_abc".to_string()),
            user.id(),
            Duration::hours(1),
        );
        let assignment = scope.map(|scope| {
            RoleAssignment::new(RoleAssignmentId::new(1), user.id(), scope, Utc::now())
        });
        AuthenticatedUser::new(user, session, assignment)
    }

    #[test]
    fn scope_comes_from_active_assignment() {
        let auth_user = caller(Some(ScopeAssignment::region(RegionId::new(2))));
        let scope = auth_user.scope().expect("has scope");
        assert_eq!(scope, &ScopeAssignment::region(RegionId::new(2)));
        assert_eq!(auth_user.session().user_id(), auth_user.user_id());
    }

    #[test]
    fn missing_assignment_is_refused() {
        let auth_user = caller(None);
        assert!(auth_user.assignment().is_none());
        let err = auth_user.scope().expect_err("no scope");
        assert!(err.to_string().contains("has no role assignment"));
    }

    #[test]
    fn superadmin_passes_superadmin_check() {
        let auth_user = caller(Some(ScopeAssignment::superadmin()));
        assert!(auth_user.is_superadmin());
    }

    #[test]
    fn national_is_not_superadmin() {
        let auth_user = caller(Some(ScopeAssignment::national()));
        assert!(!auth_user.is_superadmin());
        assert!(!caller(None).is_superadmin());
    }
}

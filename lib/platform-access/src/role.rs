//! Role assignments and active-scope selection.
//!
//! An administrator grants a user a role by assigning it a scope. A user is
//! expected to hold one assignment; when several exist, the most recently
//! assigned one is the active one and the others are ignored. There is no
//! union of scopes across roles.

use chrono::{DateTime, Utc};
use flock_authz::ScopeAssignment;
use flock_core::{RoleAssignmentId, UserId};
use serde::{Deserialize, Serialize};

/// A scope granted to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    id: RoleAssignmentId,
    user_id: UserId,
    scope: ScopeAssignment,
    assigned_at: DateTime<Utc>,
}

impl RoleAssignment {
    #[must_use]
    pub fn new(
        id: RoleAssignmentId,
        user_id: UserId,
        scope: ScopeAssignment,
        assigned_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            scope,
            assigned_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> RoleAssignmentId {
        self.id
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the granted scope.
    #[must_use]
    pub fn scope(&self) -> &ScopeAssignment {
        &self.scope
    }

    #[must_use]
    pub fn assigned_at(&self) -> DateTime<Utc> {
        self.assigned_at
    }
}

/// Picks the active assignment: the one with the latest `assigned_at`.
///
/// Ties go to the assignment that comes first.
#[must_use]
pub fn select_active_assignment<'a, I>(assignments: I) -> Option<&'a RoleAssignment>
where
    I: IntoIterator<Item = &'a RoleAssignment>,
{
    assignments
        .into_iter()
        .fold(None, |best: Option<&RoleAssignment>, candidate| match best {
            Some(current) if current.assigned_at >= candidate.assigned_at => Some(current),
            _ => Some(candidate),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use flock_core::{RegionId, UniversityId};

    fn assignment(id: i64, scope: ScopeAssignment, assigned_at: DateTime<Utc>) -> RoleAssignment {
        RoleAssignment::new(RoleAssignmentId::new(id), UserId::new(), scope, assigned_at)
    }

    #[test]
    fn no_assignments_means_no_active_scope() {
        let assignments: Vec<RoleAssignment> = Vec::new();
        assert!(select_active_assignment(&assignments).is_none());
    }

    #[test]
    fn most_recent_assignment_wins() {
        let now = Utc::now();
        let assignments = vec![
            assignment(1, ScopeAssignment::national(), now - Duration::days(30)),
            assignment(2, ScopeAssignment::region(RegionId::new(1)), now),
            assignment(
                3,
                ScopeAssignment::university(UniversityId::new(4)),
                now - Duration::days(1),
            ),
        ];

        let active = select_active_assignment(&assignments).expect("has active");
        assert_eq!(active.id(), RoleAssignmentId::new(2));
        assert_eq!(active.scope(), &ScopeAssignment::region(RegionId::new(1)));
    }

    #[test]
    fn wider_older_role_does_not_win() {
        let now = Utc::now();
        let assignments = vec![
            assignment(1, ScopeAssignment::superadmin(), now - Duration::hours(1)),
            assignment(2, ScopeAssignment::region(RegionId::new(3)), now),
        ];

        let active = select_active_assignment(&assignments).expect("has active");
        assert_eq!(active.scope(), &ScopeAssignment::region(RegionId::new(3)));
    }

    #[test]
    fn ties_go_to_first_assignment() {
        let now = Utc::now();
        let assignments = vec![
            assignment(7, ScopeAssignment::region(RegionId::new(1)), now),
            assignment(8, ScopeAssignment::region(RegionId::new(2)), now),
        ];

        let active = select_active_assignment(&assignments).expect("has active");
        assert_eq!(active.id(), RoleAssignmentId::new(7));
    }

    #[test]
    fn role_assignment_serialization_roundtrip() {
        let original = assignment(1, ScopeAssignment::national(), Utc::now());
        let json = serde_json::to_string(&original).expect("serialize");
        let parsed: RoleAssignment = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(original, parsed);
    }
}

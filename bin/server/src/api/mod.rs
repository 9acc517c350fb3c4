//! REST handlers for the scoped resources.
//!
//! Every handler receives the caller's [`ScopeAssignment`] through
//! [`RequireScope`](crate::auth::RequireScope) and asks the
//! [`ScopeAuthorizer`](flock_authz::ScopeAuthorizer) before touching a row:
//!
//! - listings intersect their query with the caller's [`RowFilter`]
//! - single-resource reads and deletes load the row unfiltered, answer 404 if
//!   it is absent and 403 if the caller may not touch it
//! - creates and updates complete the proposed coordinate from the hierarchy
//!   and run the assignment checks before writing

pub mod admin;
pub mod attendance;
pub mod contributions;
pub mod events;
pub mod hierarchy;
pub mod members;

use flock_authz::{
    AccessDecision, DenialReason, HierarchySnapshot, Operation, OrganizationalCoordinate,
    RowFilter, ScopeAssignment, ScopeAuthorizer, complete_coordinate,
};
use flock_platform_access::AuthorizationError;

use crate::auth::AppState;
use crate::db::HierarchyRepository;
use crate::error::ApiError;

/// Turns a denied decision into a 403.
pub(crate) fn ensure_allowed(decision: &AccessDecision) -> Result<(), ApiError> {
    if decision.is_allowed() {
        return Ok(());
    }

    let reason = decision.reason().unwrap_or(DenialReason::ScopeMismatch);
    Err(AuthorizationError::AccessDenied { reason }.into())
}

/// Computes the row filter for a listing.
///
/// A scope that cannot be evaluated is reported as 403 rather than answered
/// with an empty list.
pub(crate) fn listing_filter(
    state: &AppState,
    scope: &ScopeAssignment,
) -> Result<RowFilter, ApiError> {
    let filter = state.authorizer.filter_for(scope);
    match filter.denial() {
        Some(reason) => Err(AuthorizationError::AccessDenied { reason }.into()),
        None => Ok(filter),
    }
}

/// Decides whether `scope` may write a record that belongs to a member.
///
/// Attendance and contributions inherit the member's coordinate instead of
/// assigning one, so only scope membership is checked: the member, and the
/// event when one is given, must be visible to the caller. The forbidden-field
/// table does not apply.
pub(crate) fn authorize_member_record(
    authorizer: &ScopeAuthorizer,
    scope: &ScopeAssignment,
    member: &OrganizationalCoordinate,
    event: Option<&OrganizationalCoordinate>,
) -> AccessDecision {
    let decision = authorizer.can_access(scope, member, Operation::Read);
    match event {
        Some(event) if decision.is_allowed() => {
            authorizer.can_access(scope, event, Operation::Read)
        }
        _ => decision,
    }
}

/// Loads the parents of `requested` and fills in the ids they imply.
///
/// The snapshot is returned alongside so the caller can validate the chain
/// against the same lookups.
pub(crate) async fn resolve_coordinate(
    state: &AppState,
    requested: &OrganizationalCoordinate,
) -> Result<(OrganizationalCoordinate, HierarchySnapshot), ApiError> {
    let hierarchy = HierarchyRepository::new(state.db_pool.clone());
    let snapshot = hierarchy.snapshot_for(requested).await?;
    let coordinate = complete_coordinate(requested, &snapshot);
    Ok((coordinate, snapshot))
}

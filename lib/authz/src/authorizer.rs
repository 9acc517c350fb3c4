//! The scope authorizer.

use flock_core::RegionId;
use tracing::{debug, warn};

use crate::coordinate::OrganizationalCoordinate;
use crate::decision::{AccessDecision, DenialReason, RowFilter};
use crate::policy;
use crate::resolver::CoordinateResolver;
use crate::scope::ScopeAssignment;
use crate::types::Operation;

/// Decides what a scope may see and change.
///
/// The authorizer is a pure function of its arguments. It holds no state,
/// performs no I/O and may be shared freely between request handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeAuthorizer;

impl ScopeAuthorizer {
    /// Creates an authorizer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Computes the row filter a listing query must be intersected with.
    ///
    /// Unrestricted scopes get [`RowFilter::Unrestricted`]. A scope whose
    /// required id is missing gets [`RowFilter::DenyAll`], never an
    /// unrestricted filter.
    #[must_use]
    pub fn filter_for(&self, scope: &ScopeAssignment) -> RowFilter {
        match scope.restriction() {
            Ok(None) => RowFilter::Unrestricted,
            Ok(Some((field, id))) => {
                RowFilter::Restricted(OrganizationalCoordinate::only(field, id))
            }
            Err(reason) => {
                warn!(scope = %scope.scope, "scope assignment is missing its id, denying all rows");
                RowFilter::DenyAll { reason }
            }
        }
    }

    /// Decides whether `scope` may perform `operation` on a resource at
    /// `target`.
    ///
    /// For create and update, `target` is the coordinate being written and the
    /// forbidden-field table applies on top of the scope match.
    #[must_use]
    pub fn can_access(
        &self,
        scope: &ScopeAssignment,
        target: &OrganizationalCoordinate,
        operation: Operation,
    ) -> AccessDecision {
        let filter = self.filter_for(scope);

        if let Some(reason) = filter.denial() {
            return AccessDecision::deny(reason);
        }

        if !filter.matches(target) {
            debug!(scope = %scope.scope, %operation, "target outside scope");
            return AccessDecision::deny(DenialReason::ScopeMismatch);
        }

        if operation.assigns_coordinates() {
            if let Some(field) = policy::forbidden_assignment(scope.scope, target) {
                debug!(scope = %scope.scope, %operation, %field, "forbidden field assignment");
                return AccessDecision::deny(DenialReason::ForbiddenFieldAssignment);
            }
        }

        AccessDecision::allow(Some(filter))
    }

    /// Checks that the ids in `target` belong to one another.
    ///
    /// Every id must be known to `resolver`, a small group must belong to the
    /// target's university, and every region implied by the target's
    /// university, small group and alumni group must agree with each other and
    /// with the target's own region.
    #[must_use]
    pub fn validate_coordinate_consistency<R: CoordinateResolver + ?Sized>(
        &self,
        target: &OrganizationalCoordinate,
        resolver: &R,
    ) -> AccessDecision {
        match implied_regions(target, resolver) {
            Some(regions) => {
                let mut regions = regions.into_iter().chain(target.region_id);
                let first = regions.next();
                if regions.all(|region| Some(region) == first) {
                    AccessDecision::allow(None)
                } else {
                    debug!(?target, "coordinate regions disagree");
                    AccessDecision::deny(DenialReason::InconsistentCoordinateChain)
                }
            }
            None => {
                debug!(?target, "coordinate references an unknown or foreign parent");
                AccessDecision::deny(DenialReason::InconsistentCoordinateChain)
            }
        }
    }

    /// [`can_access`](Self::can_access) followed, for create and update, by
    /// [`validate_coordinate_consistency`](Self::validate_coordinate_consistency).
    ///
    /// This is the check an endpoint runs before writing new coordinates.
    #[must_use]
    pub fn can_assign<R: CoordinateResolver + ?Sized>(
        &self,
        scope: &ScopeAssignment,
        target: &OrganizationalCoordinate,
        operation: Operation,
        resolver: &R,
    ) -> AccessDecision {
        let decision = self.can_access(scope, target, operation);
        if !decision.is_allowed() || !operation.assigns_coordinates() {
            return decision;
        }

        let consistency = self.validate_coordinate_consistency(target, resolver);
        if consistency.is_allowed() {
            decision
        } else {
            consistency
        }
    }

    /// Decides whether `scope` may move a resource from `current` to `proposed`.
    ///
    /// The resource must be updatable where it is now, and the new coordinate
    /// must pass [`can_assign`](Self::can_assign).
    #[must_use]
    pub fn authorize_update<R: CoordinateResolver + ?Sized>(
        &self,
        scope: &ScopeAssignment,
        current: &OrganizationalCoordinate,
        proposed: &OrganizationalCoordinate,
        resolver: &R,
    ) -> AccessDecision {
        let filter = self.filter_for(scope);
        if let Some(reason) = filter.denial() {
            return AccessDecision::deny(reason);
        }
        if !filter.matches(current) {
            debug!(scope = %scope.scope, "resource currently outside scope");
            return AccessDecision::deny(DenialReason::ScopeMismatch);
        }

        self.can_assign(scope, proposed, Operation::Update, resolver)
    }
}

/// Collects the regions implied by the target's leaf ids.
///
/// Returns `None` if an id is unknown or a small group does not belong to the
/// target's university.
fn implied_regions<R: CoordinateResolver + ?Sized>(
    target: &OrganizationalCoordinate,
    resolver: &R,
) -> Option<Vec<RegionId>> {
    let mut regions = Vec::new();

    if let Some(id) = target.small_group_id {
        let parents = resolver.small_group_parents(id)?;
        if target
            .university_id
            .is_some_and(|university| university != parents.university_id)
        {
            return None;
        }
        regions.push(parents.region_id);
    }

    if let Some(id) = target.university_id {
        regions.push(resolver.university_region(id)?);
    }

    if let Some(id) = target.alumni_group_id {
        regions.push(resolver.alumni_group_region(id)?);
    }

    Some(regions)
}

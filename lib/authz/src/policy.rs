//! Static scope compatibility table.
//!
//! Some coordinate fields lie outside a scope's branch of the hierarchy even
//! when the resource is otherwise within scope: alumni groups hang off regions,
//! not universities, so university and small group scopes may never attach a
//! resource to one, and alumni group scopes may never attach a resource to a
//! university or small group.

use crate::coordinate::OrganizationalCoordinate;
use crate::types::{CoordinateField, ScopeKind};

/// Coordinate fields each scope kind may never set on a created or updated
/// resource.
pub static FORBIDDEN_FIELDS: &[(ScopeKind, &[CoordinateField])] = &[
    (ScopeKind::Superadmin, &[]),
    (ScopeKind::National, &[]),
    (ScopeKind::Region, &[]),
    (ScopeKind::University, &[CoordinateField::AlumniGroup]),
    (ScopeKind::SmallGroup, &[CoordinateField::AlumniGroup]),
    (
        ScopeKind::AlumniSmallGroup,
        &[CoordinateField::University, CoordinateField::SmallGroup],
    ),
];

/// Returns the fields `kind` may never assign.
#[must_use]
pub fn forbidden_fields(kind: ScopeKind) -> &'static [CoordinateField] {
    FORBIDDEN_FIELDS
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, fields)| *fields)
        .unwrap_or(&[])
}

/// Returns the first forbidden field that `target` sets, if any.
#[must_use]
pub fn forbidden_assignment(
    kind: ScopeKind,
    target: &OrganizationalCoordinate,
) -> Option<CoordinateField> {
    forbidden_fields(kind)
        .iter()
        .copied()
        .find(|field| target.get(*field).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flock_core::{AlumniGroupId, SmallGroupId, UniversityId};

    #[test]
    fn table_covers_every_scope_kind_once() {
        for kind in ScopeKind::ALL {
            let entries = FORBIDDEN_FIELDS.iter().filter(|(k, _)| *k == kind).count();
            assert_eq!(entries, 1, "{kind} should appear exactly once");
        }
    }

    #[test]
    fn unrestricted_and_region_scopes_have_no_forbidden_fields() {
        assert!(forbidden_fields(ScopeKind::Superadmin).is_empty());
        assert!(forbidden_fields(ScopeKind::National).is_empty());
        assert!(forbidden_fields(ScopeKind::Region).is_empty());
    }

    #[test]
    fn university_and_small_group_may_not_assign_alumni_groups() {
        assert_eq!(
            forbidden_fields(ScopeKind::University),
            &[CoordinateField::AlumniGroup]
        );
        assert_eq!(
            forbidden_fields(ScopeKind::SmallGroup),
            &[CoordinateField::AlumniGroup]
        );
    }

    #[test]
    fn alumni_group_may_not_assign_university_or_small_group() {
        let fields = forbidden_fields(ScopeKind::AlumniSmallGroup);
        assert!(fields.contains(&CoordinateField::University));
        assert!(fields.contains(&CoordinateField::SmallGroup));
        assert!(!fields.contains(&CoordinateField::Region));
    }

    #[test]
    fn forbidden_assignment_detects_set_fields_only() {
        let clean = OrganizationalCoordinate::new().with_university(UniversityId::new(7));
        assert_eq!(forbidden_assignment(ScopeKind::University, &clean), None);

        let dirty = clean.with_alumni_group(AlumniGroupId::new(3));
        assert_eq!(
            forbidden_assignment(ScopeKind::University, &dirty),
            Some(CoordinateField::AlumniGroup)
        );
    }

    #[test]
    fn alumni_scope_reports_small_group_assignment() {
        let target = OrganizationalCoordinate::new()
            .with_alumni_group(AlumniGroupId::new(2))
            .with_small_group(SmallGroupId::new(10));
        assert_eq!(
            forbidden_assignment(ScopeKind::AlumniSmallGroup, &target),
            Some(CoordinateField::SmallGroup)
        );
    }
}

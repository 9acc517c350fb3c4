//! Parent lookups for coordinate chain validation.
//!
//! The authorizer performs no I/O. Callers fetch the parents of the ids a
//! request mentions and hand them over through [`CoordinateResolver`].

use flock_core::{AlumniGroupId, RegionId, SmallGroupId, UniversityId};
use std::collections::HashMap;

use crate::coordinate::OrganizationalCoordinate;

/// The parents of a small group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmallGroupParents {
    pub university_id: UniversityId,
    pub region_id: RegionId,
}

/// Maps organizational ids to their parent ids.
///
/// Returning `None` means the id is unknown.
pub trait CoordinateResolver {
    /// Returns the region a university belongs to.
    fn university_region(&self, id: UniversityId) -> Option<RegionId>;

    /// Returns the university and region a small group belongs to.
    fn small_group_parents(&self, id: SmallGroupId) -> Option<SmallGroupParents>;

    /// Returns the region an alumni group belongs to.
    fn alumni_group_region(&self, id: AlumniGroupId) -> Option<RegionId>;
}

impl<R: CoordinateResolver + ?Sized> CoordinateResolver for &R {
    fn university_region(&self, id: UniversityId) -> Option<RegionId> {
        (**self).university_region(id)
    }

    fn small_group_parents(&self, id: SmallGroupId) -> Option<SmallGroupParents> {
        (**self).small_group_parents(id)
    }

    fn alumni_group_region(&self, id: AlumniGroupId) -> Option<RegionId> {
        (**self).alumni_group_region(id)
    }
}

/// An in-memory resolver built from already-fetched parent lookups.
#[derive(Debug, Clone, Default)]
pub struct HierarchySnapshot {
    universities: HashMap<UniversityId, RegionId>,
    small_groups: HashMap<SmallGroupId, SmallGroupParents>,
    alumni_groups: HashMap<AlumniGroupId, RegionId>,
}

impl HierarchySnapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_university(mut self, id: UniversityId, region_id: RegionId) -> Self {
        self.insert_university(id, region_id);
        self
    }

    #[must_use]
    pub fn with_small_group(
        mut self,
        id: SmallGroupId,
        university_id: UniversityId,
        region_id: RegionId,
    ) -> Self {
        self.insert_small_group(id, university_id, region_id);
        self
    }

    #[must_use]
    pub fn with_alumni_group(mut self, id: AlumniGroupId, region_id: RegionId) -> Self {
        self.insert_alumni_group(id, region_id);
        self
    }

    pub fn insert_university(&mut self, id: UniversityId, region_id: RegionId) {
        self.universities.insert(id, region_id);
    }

    pub fn insert_small_group(
        &mut self,
        id: SmallGroupId,
        university_id: UniversityId,
        region_id: RegionId,
    ) {
        self.small_groups.insert(
            id,
            SmallGroupParents {
                university_id,
                region_id,
            },
        );
    }

    pub fn insert_alumni_group(&mut self, id: AlumniGroupId, region_id: RegionId) {
        self.alumni_groups.insert(id, region_id);
    }
}

impl CoordinateResolver for HierarchySnapshot {
    fn university_region(&self, id: UniversityId) -> Option<RegionId> {
        self.universities.get(&id).copied()
    }

    fn small_group_parents(&self, id: SmallGroupId) -> Option<SmallGroupParents> {
        self.small_groups.get(&id).copied()
    }

    fn alumni_group_region(&self, id: AlumniGroupId) -> Option<RegionId> {
        self.alumni_groups.get(&id).copied()
    }
}

/// Fills in parent ids implied by the leaf ids of `target`.
///
/// Only empty fields are filled, so an inconsistent coordinate stays
/// inconsistent and is still caught by chain validation. Unknown ids are left
/// as they are.
#[must_use]
pub fn complete_coordinate<R: CoordinateResolver + ?Sized>(
    target: &OrganizationalCoordinate,
    resolver: &R,
) -> OrganizationalCoordinate {
    let mut completed = *target;

    if let Some(parents) = target
        .small_group_id
        .and_then(|id| resolver.small_group_parents(id))
    {
        completed.university_id.get_or_insert(parents.university_id);
        completed.region_id.get_or_insert(parents.region_id);
    }

    if let Some(region) = completed
        .university_id
        .and_then(|id| resolver.university_region(id))
    {
        completed.region_id.get_or_insert(region);
    }

    if let Some(region) = target
        .alumni_group_id
        .and_then(|id| resolver.alumni_group_region(id))
    {
        completed.region_id.get_or_insert(region);
    }

    completed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> HierarchySnapshot {
        HierarchySnapshot::new()
            .with_university(UniversityId::new(4), RegionId::new(100))
            .with_small_group(SmallGroupId::new(10), UniversityId::new(4), RegionId::new(100))
            .with_alumni_group(AlumniGroupId::new(5), RegionId::new(200))
    }

    #[test]
    fn snapshot_lookups() {
        let snapshot = snapshot();
        assert_eq!(
            snapshot.university_region(UniversityId::new(4)),
            Some(RegionId::new(100))
        );
        assert_eq!(
            snapshot.small_group_parents(SmallGroupId::new(10)),
            Some(SmallGroupParents {
                university_id: UniversityId::new(4),
                region_id: RegionId::new(100),
            })
        );
        assert_eq!(
            snapshot.alumni_group_region(AlumniGroupId::new(5)),
            Some(RegionId::new(200))
        );
        assert_eq!(snapshot.university_region(UniversityId::new(99)), None);
    }

    #[test]
    fn completes_small_group_chain() {
        let target = OrganizationalCoordinate::new().with_small_group(SmallGroupId::new(10));
        let completed = complete_coordinate(&target, &snapshot());

        assert_eq!(completed.small_group_id, Some(SmallGroupId::new(10)));
        assert_eq!(completed.university_id, Some(UniversityId::new(4)));
        assert_eq!(completed.region_id, Some(RegionId::new(100)));
    }

    #[test]
    fn completes_alumni_group_region() {
        let target = OrganizationalCoordinate::new().with_alumni_group(AlumniGroupId::new(5));
        let completed = complete_coordinate(&target, &snapshot());
        assert_eq!(completed.region_id, Some(RegionId::new(200)));
        assert_eq!(completed.university_id, None);
    }

    #[test]
    fn never_overwrites_existing_fields() {
        let target = OrganizationalCoordinate::new()
            .with_university(UniversityId::new(4))
            .with_region(RegionId::new(99));
        let completed = complete_coordinate(&target, &snapshot());
        assert_eq!(completed.region_id, Some(RegionId::new(99)));
    }

    #[test]
    fn unknown_ids_are_left_alone() {
        let target = OrganizationalCoordinate::new().with_university(UniversityId::new(77));
        let completed = complete_coordinate(&target, &snapshot());
        assert_eq!(completed, target);
    }

    #[test]
    fn resolver_works_through_references() {
        let snapshot = snapshot();
        let by_ref: &dyn CoordinateResolver = &snapshot;
        assert_eq!(
            by_ref.alumni_group_region(AlumniGroupId::new(5)),
            Some(RegionId::new(200))
        );
    }
}

//! Organizational coordinates: where a resource lives in the hierarchy.

use flock_core::{AlumniGroupId, RegionId, SmallGroupId, UniversityId};
use serde::{Deserialize, Serialize};

use crate::types::CoordinateField;

/// The organizational foreign keys attached to a resource.
///
/// Every field is optional. A university belongs to a region, a small group to
/// a university and a region, and an alumni group to a region only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrganizationalCoordinate {
    #[serde(default)]
    pub region_id: Option<RegionId>,
    #[serde(default)]
    pub university_id: Option<UniversityId>,
    #[serde(default)]
    pub small_group_id: Option<SmallGroupId>,
    #[serde(default)]
    pub alumni_group_id: Option<AlumniGroupId>,
}

impl OrganizationalCoordinate {
    /// Creates an empty coordinate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a coordinate with a single field set.
    #[must_use]
    pub fn only(field: CoordinateField, id: i64) -> Self {
        let mut coordinate = Self::new();
        coordinate.set(field, Some(id));
        coordinate
    }

    #[must_use]
    pub fn with_region(mut self, id: RegionId) -> Self {
        self.region_id = Some(id);
        self
    }

    #[must_use]
    pub fn with_university(mut self, id: UniversityId) -> Self {
        self.university_id = Some(id);
        self
    }

    #[must_use]
    pub fn with_small_group(mut self, id: SmallGroupId) -> Self {
        self.small_group_id = Some(id);
        self
    }

    #[must_use]
    pub fn with_alumni_group(mut self, id: AlumniGroupId) -> Self {
        self.alumni_group_id = Some(id);
        self
    }

    /// Returns the raw key stored in `field`, if set.
    #[must_use]
    pub fn get(&self, field: CoordinateField) -> Option<i64> {
        match field {
            CoordinateField::Region => self.region_id.map(|id| id.get()),
            CoordinateField::University => self.university_id.map(|id| id.get()),
            CoordinateField::SmallGroup => self.small_group_id.map(|id| id.get()),
            CoordinateField::AlumniGroup => self.alumni_group_id.map(|id| id.get()),
        }
    }

    /// Overwrites `field` with a raw key.
    pub fn set(&mut self, field: CoordinateField, id: Option<i64>) {
        match field {
            CoordinateField::Region => self.region_id = id.map(RegionId::new),
            CoordinateField::University => self.university_id = id.map(UniversityId::new),
            CoordinateField::SmallGroup => self.small_group_id = id.map(SmallGroupId::new),
            CoordinateField::AlumniGroup => self.alumni_group_id = id.map(AlumniGroupId::new),
        }
    }

    /// Returns the fields that carry a value, with their keys.
    pub fn set_fields(&self) -> impl Iterator<Item = (CoordinateField, i64)> + '_ {
        CoordinateField::ALL
            .into_iter()
            .filter_map(|field| self.get(field).map(|id| (field, id)))
    }

    /// Returns true if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set_fields().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_sets_a_single_field() {
        let coordinate = OrganizationalCoordinate::only(CoordinateField::SmallGroup, 10);
        assert_eq!(coordinate.small_group_id, Some(SmallGroupId::new(10)));
        assert_eq!(
            coordinate.set_fields().collect::<Vec<_>>(),
            vec![(CoordinateField::SmallGroup, 10)]
        );
    }

    #[test]
    fn builders_and_get_agree() {
        let coordinate = OrganizationalCoordinate::new()
            .with_region(RegionId::new(1))
            .with_university(UniversityId::new(4));

        assert_eq!(coordinate.get(CoordinateField::Region), Some(1));
        assert_eq!(coordinate.get(CoordinateField::University), Some(4));
        assert_eq!(coordinate.get(CoordinateField::SmallGroup), None);
        assert_eq!(coordinate.get(CoordinateField::AlumniGroup), None);
    }

    #[test]
    fn set_clears_with_none() {
        let mut coordinate =
            OrganizationalCoordinate::new().with_alumni_group(AlumniGroupId::new(5));
        coordinate.set(CoordinateField::AlumniGroup, None);
        assert!(coordinate.is_empty());
    }

    #[test]
    fn missing_fields_deserialize_as_none() {
        let coordinate: OrganizationalCoordinate =
            serde_json::from_str(r#"{"university_id": 7}"#).expect("deserialize");
        assert_eq!(coordinate.university_id, Some(UniversityId::new(7)));
        assert_eq!(coordinate.region_id, None);
        assert_eq!(coordinate.alumni_group_id, None);
    }
}

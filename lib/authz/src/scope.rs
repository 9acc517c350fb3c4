//! Scope assignments: the access grant a role carries.

use flock_core::{AlumniGroupId, RegionId, SmallGroupId, UniversityId};
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};

use crate::coordinate::OrganizationalCoordinate;
use crate::decision::DenialReason;
use crate::error::AuthzError;
use crate::types::{CoordinateField, ScopeKind};

/// A user's access grant.
///
/// A well-formed assignment carries exactly the id its kind requires:
/// `region` needs `region_id`, `university` needs `university_id`, and so on,
/// while `superadmin` and `national` carry none. Malformed assignments can
/// still be represented because they arrive from storage; the authorizer
/// treats a missing required id as a misconfiguration and denies everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeAssignment {
    pub scope: ScopeKind,
    #[serde(default)]
    pub region_id: Option<RegionId>,
    #[serde(default)]
    pub university_id: Option<UniversityId>,
    #[serde(default)]
    pub small_group_id: Option<SmallGroupId>,
    #[serde(default)]
    pub alumni_group_id: Option<AlumniGroupId>,
}

impl ScopeAssignment {
    /// Creates an assignment of the given kind with no ids.
    #[must_use]
    pub fn bare(scope: ScopeKind) -> Self {
        Self {
            scope,
            region_id: None,
            university_id: None,
            small_group_id: None,
            alumni_group_id: None,
        }
    }

    #[must_use]
    pub fn superadmin() -> Self {
        Self::bare(ScopeKind::Superadmin)
    }

    #[must_use]
    pub fn national() -> Self {
        Self::bare(ScopeKind::National)
    }

    #[must_use]
    pub fn region(id: RegionId) -> Self {
        Self {
            region_id: Some(id),
            ..Self::bare(ScopeKind::Region)
        }
    }

    #[must_use]
    pub fn university(id: UniversityId) -> Self {
        Self {
            university_id: Some(id),
            ..Self::bare(ScopeKind::University)
        }
    }

    #[must_use]
    pub fn small_group(id: SmallGroupId) -> Self {
        Self {
            small_group_id: Some(id),
            ..Self::bare(ScopeKind::SmallGroup)
        }
    }

    #[must_use]
    pub fn alumni_group(id: AlumniGroupId) -> Self {
        Self {
            alumni_group_id: Some(id),
            ..Self::bare(ScopeKind::AlumniSmallGroup)
        }
    }

    /// Returns the ids carried by this assignment as a coordinate.
    #[must_use]
    pub fn coordinate(&self) -> OrganizationalCoordinate {
        OrganizationalCoordinate {
            region_id: self.region_id,
            university_id: self.university_id,
            small_group_id: self.small_group_id,
            alumni_group_id: self.alumni_group_id,
        }
    }

    /// Returns the field and key this assignment restricts rows by.
    ///
    /// `Ok(None)` for unrestricted kinds. Extra ids beyond the required one are
    /// ignored here: they can never widen what the assignment grants.
    ///
    /// # Errors
    ///
    /// Returns [`DenialReason::MisconfiguredScope`] if the kind requires an id
    /// that is absent.
    pub fn restriction(&self) -> Result<Option<(CoordinateField, i64)>, DenialReason> {
        match self.scope.matching_field() {
            None => Ok(None),
            Some(field) => self
                .coordinate()
                .get(field)
                .map(|id| Some((field, id)))
                .ok_or(DenialReason::MisconfiguredScope),
        }
    }

    /// Checks that the assignment carries exactly the id its kind requires.
    ///
    /// Used when an assignment is created; stricter than what the authorizer
    /// needs at evaluation time.
    pub fn validate(&self) -> Result<(), Report<AuthzError>> {
        let required = self.scope.matching_field();

        if let Some(field) = required {
            if self.coordinate().get(field).is_none() {
                return Err(AuthzError::InvalidAssignment {
                    details: format!("{} scope requires {}", self.scope, field),
                }
                .into());
            }
        }

        let extra: Vec<&str> = self
            .coordinate()
            .set_fields()
            .map(|(field, _)| field)
            .filter(|field| Some(*field) != required)
            .map(|field| field.as_str())
            .collect();

        if !extra.is_empty() {
            return Err(AuthzError::InvalidAssignment {
                details: format!("{} scope must not set {}", self.scope, extra.join(", ")),
            }
            .into());
        }

        Ok(())
    }
}

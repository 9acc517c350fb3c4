//! Vocabulary of the authorization model: operations, scope kinds and
//! coordinate fields.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operation a caller intends to perform on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Read a resource.
    Read,
    /// Create a resource.
    Create,
    /// Update a resource.
    Update,
    /// Delete a resource.
    Delete,
}

impl Operation {
    /// Returns the operation name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Returns true if the operation writes coordinate fields onto a resource.
    ///
    /// Forbidden-field and chain-consistency rules only apply to these.
    #[must_use]
    pub fn assigns_coordinates(&self) -> bool {
        matches!(self, Self::Create | Self::Update)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Organizational level at which a user is authorized to operate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    /// Unrestricted platform administrator.
    Superadmin,
    /// Unrestricted national leadership.
    National,
    /// Restricted to one region.
    Region,
    /// Restricted to one university.
    University,
    /// Restricted to one small group.
    SmallGroup,
    /// Restricted to one alumni small group.
    AlumniSmallGroup,
}

impl ScopeKind {
    /// Every scope kind, widest first.
    pub const ALL: [ScopeKind; 6] = [
        Self::Superadmin,
        Self::National,
        Self::Region,
        Self::University,
        Self::SmallGroup,
        Self::AlumniSmallGroup,
    ];

    /// Returns the stored name of the scope kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Superadmin => "superadmin",
            Self::National => "national",
            Self::Region => "region",
            Self::University => "university",
            Self::SmallGroup => "smallgroup",
            Self::AlumniSmallGroup => "alumnismallgroup",
        }
    }

    /// Returns the coordinate field this scope restricts rows by.
    ///
    /// `None` for the unrestricted kinds.
    #[must_use]
    pub fn matching_field(&self) -> Option<CoordinateField> {
        match self {
            Self::Superadmin | Self::National => None,
            Self::Region => Some(CoordinateField::Region),
            Self::University => Some(CoordinateField::University),
            Self::SmallGroup => Some(CoordinateField::SmallGroup),
            Self::AlumniSmallGroup => Some(CoordinateField::AlumniGroup),
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a scope kind name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownScopeKind(pub String);

impl fmt::Display for UnknownScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown scope kind '{}'", self.0)
    }
}

impl std::error::Error for UnknownScopeKind {}

impl FromStr for ScopeKind {
    type Err = UnknownScopeKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownScopeKind(s.to_string()))
    }
}

/// One of the organizational foreign keys carried by a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateField {
    /// The region id.
    Region,
    /// The university id.
    University,
    /// The small group id.
    SmallGroup,
    /// The alumni small group id.
    AlumniGroup,
}

impl CoordinateField {
    /// Every coordinate field, from the root of the hierarchy down.
    pub const ALL: [CoordinateField; 4] = [
        Self::Region,
        Self::University,
        Self::SmallGroup,
        Self::AlumniGroup,
    ];

    /// Returns the field name, which is also its column name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Region => "region_id",
            Self::University => "university_id",
            Self::SmallGroup => "small_group_id",
            Self::AlumniGroup => "alumni_group_id",
        }
    }
}

impl fmt::Display for CoordinateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_create_and_update_assign_coordinates() {
        assert!(Operation::Create.assigns_coordinates());
        assert!(Operation::Update.assigns_coordinates());
        assert!(!Operation::Read.assigns_coordinates());
        assert!(!Operation::Delete.assigns_coordinates());
    }

    #[test]
    fn scope_kind_names_round_trip() {
        for kind in ScopeKind::ALL {
            let parsed: ScopeKind = kind.as_str().parse().expect("should parse");
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn scope_kind_serialization_format() {
        let json = serde_json::to_string(&ScopeKind::AlumniSmallGroup).expect("serialize");
        assert_eq!(json, "\"alumnismallgroup\"");

        let parsed: ScopeKind = serde_json::from_str("\"smallgroup\"").expect("deserialize");
        assert_eq!(parsed, ScopeKind::SmallGroup);
    }

    #[test]
    fn unknown_scope_kind_is_rejected() {
        let err = "campus".parse::<ScopeKind>().unwrap_err();
        assert!(err.to_string().contains("campus"));
    }

    #[test]
    fn matching_fields() {
        assert_eq!(ScopeKind::Superadmin.matching_field(), None);
        assert_eq!(ScopeKind::National.matching_field(), None);
        assert_eq!(
            ScopeKind::Region.matching_field(),
            Some(CoordinateField::Region)
        );
        assert_eq!(
            ScopeKind::University.matching_field(),
            Some(CoordinateField::University)
        );
        assert_eq!(
            ScopeKind::SmallGroup.matching_field(),
            Some(CoordinateField::SmallGroup)
        );
        assert_eq!(
            ScopeKind::AlumniSmallGroup.matching_field(),
            Some(CoordinateField::AlumniGroup)
        );
    }

    #[test]
    fn coordinate_field_names_are_column_names() {
        assert_eq!(CoordinateField::SmallGroup.to_string(), "small_group_id");
        assert_eq!(CoordinateField::AlumniGroup.as_str(), "alumni_group_id");
    }
}

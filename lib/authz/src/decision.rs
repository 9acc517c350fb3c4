//! Access decisions and row filters produced by the authorizer.

use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::coordinate::OrganizationalCoordinate;
use crate::error::AuthzError;
use crate::types::Operation;

/// Why an access was denied.
///
/// The snake_case form returned by [`as_str`](Self::as_str) is the
/// machine-readable reason callers put in their 403 responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// No identity could be resolved. Produced by the identity layer, never by
    /// the authorizer itself.
    Unauthenticated,
    /// The scope kind requires an id that the assignment does not carry.
    MisconfiguredScope,
    /// The target lies outside the scope.
    ScopeMismatch,
    /// The target sets a coordinate field the scope may never assign.
    ForbiddenFieldAssignment,
    /// The target's coordinate ids do not belong to each other.
    InconsistentCoordinateChain,
}

impl DenialReason {
    /// Returns the machine-readable reason code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::MisconfiguredScope => "misconfigured_scope",
            Self::ScopeMismatch => "scope_mismatch",
            Self::ForbiddenFieldAssignment => "forbidden_field_assignment",
            Self::InconsistentCoordinateChain => "inconsistent_coordinate_chain",
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "no authenticated identity"),
            Self::MisconfiguredScope => write!(f, "scope assignment is missing its id"),
            Self::ScopeMismatch => write!(f, "resource is outside the assigned scope"),
            Self::ForbiddenFieldAssignment => {
                write!(f, "scope may not assign one of the coordinate fields")
            }
            Self::InconsistentCoordinateChain => {
                write!(f, "coordinate ids do not belong to the same hierarchy")
            }
        }
    }
}

/// Row filter to intersect with a listing query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowFilter {
    /// Every row is visible.
    Unrestricted,
    /// Only rows whose fields equal every field set here are visible.
    Restricted(OrganizationalCoordinate),
    /// No row is visible.
    DenyAll { reason: DenialReason },
}

impl RowFilter {
    /// Evaluates the filter against a single row's coordinate.
    ///
    /// A row whose constrained field is empty does not match.
    #[must_use]
    pub fn matches(&self, coordinate: &OrganizationalCoordinate) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Restricted(constraints) => constraints
                .set_fields()
                .all(|(field, id)| coordinate.get(field) == Some(id)),
            Self::DenyAll { .. } => false,
        }
    }

    /// Returns the constraints of a restricted filter.
    #[must_use]
    pub fn constraints(&self) -> Option<&OrganizationalCoordinate> {
        match self {
            Self::Restricted(constraints) => Some(constraints),
            _ => None,
        }
    }

    /// Returns why the filter denies everything, if it does.
    #[must_use]
    pub fn denial(&self) -> Option<DenialReason> {
        match self {
            Self::DenyAll { reason } => Some(*reason),
            _ => None,
        }
    }
}

/// Outcome of evaluating a scope against an operation and a coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
    allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<DenialReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    row_filter: Option<RowFilter>,
}

impl AccessDecision {
    /// An allowed decision, carrying the filter the scope lists rows with.
    #[must_use]
    pub fn allow(row_filter: Option<RowFilter>) -> Self {
        Self {
            allowed: true,
            reason: None,
            row_filter,
        }
    }

    /// A denied decision.
    #[must_use]
    pub fn deny(reason: DenialReason) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            row_filter: None,
        }
    }

    #[must_use]
    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// Returns the denial reason. `None` when allowed.
    #[must_use]
    pub fn reason(&self) -> Option<DenialReason> {
        self.reason
    }

    #[must_use]
    pub fn row_filter(&self) -> Option<&RowFilter> {
        self.row_filter.as_ref()
    }

    /// Converts a denial into an error.
    pub fn require(&self, operation: Operation) -> Result<(), Report<AuthzError>> {
        match self.reason {
            Some(reason) if !self.allowed => {
                Err(AuthzError::PermissionDenied { operation, reason }.into())
            }
            _ => Ok(()),
        }
    }
}

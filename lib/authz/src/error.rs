//! Authorization error types.

use std::fmt;

use crate::decision::DenialReason;
use crate::types::Operation;

/// Authorization errors.
///
/// The authorizer itself reports denials as [`AccessDecision`](crate::AccessDecision)
/// values; these errors exist for callers that prefer `?` propagation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// The scope does not permit the operation.
    PermissionDenied {
        /// The operation that was requested.
        operation: Operation,
        /// Why it was denied.
        reason: DenialReason,
    },
    /// A scope assignment is not well formed.
    InvalidAssignment {
        /// Error details.
        details: String,
    },
}

impl AuthzError {
    /// Returns the denial reason, if this is a denial.
    #[must_use]
    pub fn reason(&self) -> Option<DenialReason> {
        match self {
            Self::PermissionDenied { reason, .. } => Some(*reason),
            Self::InvalidAssignment { .. } => None,
        }
    }
}

impl fmt::Display for AuthzError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionDenied { operation, reason } => {
                write!(f, "permission to {} denied: {}", operation, reason)
            }
            Self::InvalidAssignment { details } => {
                write!(f, "invalid scope assignment: {}", details)
            }
        }
    }
}

impl std::error::Error for AuthzError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_denied_display() {
        let err = AuthzError::PermissionDenied {
            operation: Operation::Update,
            reason: DenialReason::ScopeMismatch,
        };
        assert!(err.to_string().contains("update"));
        assert!(err.to_string().contains("outside"));
        assert_eq!(err.reason(), Some(DenialReason::ScopeMismatch));
    }

    #[test]
    fn invalid_assignment_display() {
        let err = AuthzError::InvalidAssignment {
            details: "region scope requires region_id".to_string(),
        };
        assert!(err.to_string().contains("region_id"));
        assert_eq!(err.reason(), None);
    }
}

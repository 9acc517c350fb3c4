//! Error types for the platform-access crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `AuthenticationError`: login and session failures
//! - `AuthorizationError`: failures to establish or apply a caller's scope

use flock_authz::DenialReason;
use flock_core::UserId;
use std::fmt;

/// Errors from authentication operations.
///
/// These errors represent failures in verifying user identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationError {
    /// Email and password did not match an account.
    InvalidCredentials,
    /// Session not found or invalid.
    InvalidSession { session_id: String },
    /// Session has expired.
    SessionExpired { session_id: String },
    /// The session refers to a user that no longer exists.
    UserNotFound { user_id: UserId },
    /// Hashing or verifying a password failed.
    PasswordHash { reason: String },
}

impl fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid email or password"),
            Self::InvalidSession { session_id } => {
                write!(f, "invalid session: {session_id}")
            }
            Self::SessionExpired { session_id } => {
                write!(f, "session has expired: {session_id}")
            }
            Self::UserNotFound { user_id } => {
                write!(f, "user not found: {user_id}")
            }
            Self::PasswordHash { reason } => {
                write!(f, "password hashing failed: {reason}")
            }
        }
    }
}

impl std::error::Error for AuthenticationError {}

/// Errors from authorization operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    /// User is not authenticated.
    NotAuthenticated,
    /// User is authenticated but holds no role assignment.
    NoActiveRole { user_id: UserId },
    /// The scope authorizer refused the request.
    AccessDenied { reason: DenialReason },
    /// The operation is reserved for superadmins.
    SuperadminRequired { user_id: UserId },
}

impl AuthorizationError {
    /// Returns the denial reason reported to clients.
    #[must_use]
    pub fn denial_reason(&self) -> DenialReason {
        match self {
            Self::NotAuthenticated => DenialReason::Unauthenticated,
            // A user without a role has no usable scope.
            Self::NoActiveRole { .. } => DenialReason::MisconfiguredScope,
            Self::AccessDenied { reason } => *reason,
            Self::SuperadminRequired { .. } => DenialReason::ScopeMismatch,
        }
    }
}

impl fmt::Display for AuthorizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAuthenticated => {
                write!(f, "user is not authenticated")
            }
            Self::NoActiveRole { user_id } => {
                write!(f, "user {user_id} has no role assignment")
            }
            Self::AccessDenied { reason } => {
                write!(f, "access denied: {reason}")
            }
            Self::SuperadminRequired { user_id } => {
                write!(f, "user {user_id} is not a superadmin")
            }
        }
    }
}

impl std::error::Error for AuthorizationError {}

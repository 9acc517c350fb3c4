//! Users, sessions and role assignments for flock.
//!
//! This crate provides:
//! - User accounts with Argon2id password hashes (`User`, `hash_password`)
//! - Session management (`Session`, `SessionId`)
//! - Role assignments and active-scope selection (`RoleAssignment`)
//! - The per-request caller context (`AuthenticatedUser`)
//!
//! # Access Model
//!
//! A user may hold several role assignments, but only the most recently
//! assigned one is active. Its scope is what the authorizer sees; a user
//! with no assignment is refused everywhere.
//!
//! # Example
//!
//! ```
//! use chrono::{Duration, Utc};
//! use flock_authz::ScopeAssignment;
//! use flock_core::{RegionId, RoleAssignmentId};
//! use flock_platform_access::{
//!     AuthenticatedUser, RoleAssignment, Session, SessionId, User, select_active_assignment,
//! };
//!
//! let user = User::new("leader@example.org".to_string(), "$argon2id$...".to_string());
//! let session = Session::new(
//!     SessionId::new("sess_abc".to_string()),
//!     user.id(),
//!     Duration::hours(8),
//! );
//!
//! let now = Utc::now();
//! let roles = vec![
//!     RoleAssignment::new(
//!         RoleAssignmentId::new(1),
//!         user.id(),
//!         ScopeAssignment::national(),
//!         now - Duration::days(7),
//!     ),
//!     RoleAssignment::new(
//!         RoleAssignmentId::new(2),
//!         user.id(),
//!         ScopeAssignment::region(RegionId::new(3)),
//!         now,
//!     ),
//! ];
//! let active = select_active_assignment(&roles).cloned();
//!
//! let caller = AuthenticatedUser::new(user, session, active);
//! assert_eq!(caller.scope().unwrap(), &ScopeAssignment::region(RegionId::new(3)));
//! ```

pub mod auth;
pub mod error;
pub mod password;
pub mod role;
pub mod session;
pub mod user;

// Re-export main types at crate root
pub use auth::AuthenticatedUser;
pub use error::{AuthenticationError, AuthorizationError};
pub use password::{hash_password, verify_password};
pub use role::{RoleAssignment, select_active_assignment};
pub use session::{Session, SessionId};
pub use user::User;

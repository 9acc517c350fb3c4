//! Scope-based row-level authorization for flock.
//!
//! Every user operates at one organizational scope: superadmin, national,
//! region, university, small group or alumni small group. [`ScopeAuthorizer`]
//! turns a user's [`ScopeAssignment`] into
//!
//! - a [`RowFilter`] for listing queries ([`ScopeAuthorizer::filter_for`]),
//! - an [`AccessDecision`] for a single resource ([`ScopeAuthorizer::can_access`]),
//! - a chain check for newly assigned coordinates
//!   ([`ScopeAuthorizer::validate_coordinate_consistency`]), using parent
//!   lookups the caller supplies through a [`CoordinateResolver`].
//!
//! The authorizer fails closed: an assignment missing the id its kind requires
//! denies everything instead of falling back to unfiltered access.
//!
//! # Example
//!
//! ```
//! use flock_authz::{
//!     DenialReason, Operation, OrganizationalCoordinate, ScopeAssignment, ScopeAuthorizer,
//! };
//! use flock_core::RegionId;
//!
//! let authorizer = ScopeAuthorizer::new();
//! let scope = ScopeAssignment::region(RegionId::new(1));
//!
//! let own = OrganizationalCoordinate::new().with_region(RegionId::new(1));
//! assert!(authorizer.can_access(&scope, &own, Operation::Read).is_allowed());
//!
//! let foreign = OrganizationalCoordinate::new().with_region(RegionId::new(2));
//! let decision = authorizer.can_access(&scope, &foreign, Operation::Update);
//! assert_eq!(decision.reason(), Some(DenialReason::ScopeMismatch));
//! ```

mod authorizer;
mod coordinate;
mod decision;
mod error;
pub mod policy;
mod resolver;
mod scope;
mod types;

pub use authorizer::ScopeAuthorizer;
pub use coordinate::OrganizationalCoordinate;
pub use decision::{AccessDecision, DenialReason, RowFilter};
pub use error::AuthzError;
pub use resolver::{CoordinateResolver, HierarchySnapshot, SmallGroupParents, complete_coordinate};
pub use scope::ScopeAssignment;
pub use types::{CoordinateField, Operation, ScopeKind, UnknownScopeKind};

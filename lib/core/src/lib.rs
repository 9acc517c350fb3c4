//! Core domain types and utilities for flock.
//!
//! This crate provides the identifier types and error handling shared by the
//! authorization, platform-access and server crates.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{
    AlumniGroupId, AttendanceId, ContributionId, EventId, MemberId, ParseIdError, RegionId,
    RoleAssignmentId, SmallGroupId, UniversityId, UserId,
};

//! Strongly-typed ID types for domain entities.
//!
//! Organizational entities and ministry records are keyed by database-assigned
//! 64-bit integers. Users are keyed by ULIDs, which are generated by the
//! application before the user row is written.
//!
//! Both kinds display as `<prefix>_<value>` and parse from either the prefixed
//! or the bare form. On the wire they serialize as their bare value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Error returned when parsing an ID from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse.
    pub id_type: &'static str,
    /// The reason for the parse failure.
    pub reason: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {}: {}", self.id_type, self.reason)
    }
}

impl std::error::Error for ParseIdError {}

/// Macro to generate a strongly-typed ID wrapper around ULID.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Ulid);

        impl $name {
            /// Creates a new ID with a randomly generated ULID.
            #[must_use]
            pub fn new() -> Self {
                Self(Ulid::new())
            }

            /// Creates an ID from a ULID.
            #[must_use]
            pub const fn from_ulid(ulid: Ulid) -> Self {
                Self(ulid)
            }

            /// Returns the underlying ULID.
            #[must_use]
            pub const fn as_ulid(&self) -> Ulid {
                self.0
            }

            /// Returns the prefix used for display formatting.
            #[must_use]
            pub const fn prefix() -> &'static str {
                $prefix
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}_{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let ulid_str = s.strip_prefix(concat!($prefix, "_")).unwrap_or(s);

                Ulid::from_str(ulid_str)
                    .map(Self)
                    .map_err(|e| ParseIdError {
                        id_type: stringify!($name),
                        reason: e.to_string(),
                    })
            }
        }

        impl From<Ulid> for $name {
            fn from(ulid: Ulid) -> Self {
                Self(ulid)
            }
        }
    };
}

/// Macro to generate a strongly-typed wrapper around a database integer key.
macro_rules! define_key {
    ($(#[$meta:meta])* $name:ident, $prefix:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw database key.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw database key.
            #[must_use]
            pub const fn get(&self) -> i64 {
                self.0
            }

            /// Returns the prefix used for display formatting.
            #[must_use]
            pub const fn prefix() -> &'static str {
                $prefix
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}_{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s.strip_prefix(concat!($prefix, "_")).unwrap_or(s);

                raw.parse::<i64>()
                    .map(Self)
                    .map_err(|e| ParseIdError {
                        id_type: stringify!($name),
                        reason: e.to_string(),
                    })
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(
    /// Unique identifier for a user account.
    UserId,
    "usr"
);

define_key!(
    /// Identifier of a region, the widest organizational unit below national.
    RegionId,
    "region"
);

define_key!(
    /// Identifier of a university. Every university belongs to one region.
    UniversityId,
    "univ"
);

define_key!(
    /// Identifier of a small group, which belongs to a university and its region.
    SmallGroupId,
    "sg"
);

define_key!(
    /// Identifier of an alumni small group, which belongs to a region only.
    AlumniGroupId,
    "alumni"
);

define_key!(
    /// Identifier of a member record.
    MemberId,
    "member"
);

define_key!(
    /// Identifier of an event.
    EventId,
    "event"
);

define_key!(
    /// Identifier of an attendance record.
    AttendanceId,
    "att"
);

define_key!(
    /// Identifier of a contribution record.
    ContributionId,
    "contrib"
);

define_key!(
    /// Identifier of a role assignment.
    RoleAssignmentId,
    "role"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_display_format() {
        let id = UserId::new();
        assert!(id.to_string().starts_with("usr_"));
    }

    #[test]
    fn user_id_parse_with_and_without_prefix() {
        let id = UserId::new();
        let parsed: UserId = id.to_string().parse().expect("should parse");
        assert_eq!(id, parsed);

        let bare: UserId = id.as_ulid().to_string().parse().expect("should parse");
        assert_eq!(id, bare);
    }

    #[test]
    fn key_display_format() {
        assert_eq!(RegionId::new(12).to_string(), "region_12");
        assert_eq!(SmallGroupId::new(3).to_string(), "sg_3");
    }

    #[test]
    fn key_parse_with_prefix() {
        let id: UniversityId = "univ_44".parse().expect("should parse");
        assert_eq!(id, UniversityId::new(44));
    }

    #[test]
    fn key_parse_without_prefix() {
        let id: AlumniGroupId = "9".parse().expect("should parse");
        assert_eq!(id.get(), 9);
    }

    #[test]
    fn key_parse_rejects_other_prefix() {
        let result: Result<RegionId, _> = "univ_4".parse();
        let err = result.unwrap_err();
        assert_eq!(err.id_type, "RegionId");
    }

    #[test]
    fn key_serializes_as_bare_integer() {
        let json = serde_json::to_string(&MemberId::new(501)).expect("serialize");
        assert_eq!(json, "501");

        let parsed: MemberId = serde_json::from_str("501").expect("deserialize");
        assert_eq!(parsed, MemberId::new(501));
    }

    #[test]
    fn keys_of_different_entities_are_distinct_types() {
        use std::collections::HashSet;

        let mut regions = HashSet::new();
        regions.insert(RegionId::new(1));
        regions.insert(RegionId::new(2));
        regions.insert(RegionId::new(1));
        assert_eq!(regions.len(), 2);
    }
}

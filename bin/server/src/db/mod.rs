//! Database repositories for the flock platform.
//!
//! This module provides data access for:
//! - The organizational hierarchy (regions, universities, groups)
//! - Members and events, which carry their own coordinates
//! - Attendance and contributions, which inherit the coordinate of their member
//!
//! Listing queries take a [`RowFilter`] and push it into the SQL `WHERE`
//! clause with [`push_row_filter`].

pub mod attendance;
pub mod contribution;
pub mod event;
pub mod hierarchy;
pub mod member;

pub use attendance::{AttendanceQuery, AttendanceRecord, AttendanceRepository};
pub use contribution::{ContributionRecord, ContributionRepository, NewContribution};
pub use event::{EventFields, EventRecord, EventRepository};
pub use hierarchy::{
    AlumniGroupRecord, HierarchyRepository, RegionRecord, SmallGroupRecord, UniversityRecord,
};
pub use member::{MemberFields, MemberRecord, MemberRepository, MemberType};

use flock_authz::{CoordinateField, OrganizationalCoordinate, RowFilter};
use flock_core::{AlumniGroupId, RegionId, SmallGroupId, UniversityId};
use sqlx::{FromRow, Postgres, QueryBuilder};

/// Maps coordinate fields onto the columns of a query.
///
/// Column names are written into the SQL verbatim, so they must be static.
pub type CoordinateColumns = &'static [(CoordinateField, &'static str)];

/// Columns of a table that carries all four coordinate fields.
pub const FULL_COORDINATE: CoordinateColumns = &[
    (CoordinateField::Region, "region_id"),
    (CoordinateField::University, "university_id"),
    (CoordinateField::SmallGroup, "small_group_id"),
    (CoordinateField::AlumniGroup, "alumni_group_id"),
];

/// Appends a boolean SQL expression restricting rows to `filter`.
///
/// A constraint on a field that `columns` does not map yields `FALSE`, as
/// does a deny-all filter. Callers must reject misconfigured scopes before
/// querying; this only keeps the query from ever being broadened.
pub fn push_row_filter(
    builder: &mut QueryBuilder<'_, Postgres>,
    filter: &RowFilter,
    columns: CoordinateColumns,
) {
    let constraints = match filter {
        RowFilter::Unrestricted => {
            builder.push("TRUE");
            return;
        }
        RowFilter::DenyAll { .. } => {
            builder.push("FALSE");
            return;
        }
        RowFilter::Restricted(constraints) => constraints,
    };

    let mut bound = Vec::new();
    for (field, id) in constraints.set_fields() {
        match columns.iter().find(|(f, _)| *f == field) {
            Some((_, column)) => bound.push((*column, id)),
            None => {
                builder.push("FALSE");
                return;
            }
        }
    }

    if bound.is_empty() {
        builder.push("TRUE");
        return;
    }

    builder.push("(");
    for (i, (column, id)) in bound.into_iter().enumerate() {
        if i > 0 {
            builder.push(" AND ");
        }
        builder.push(column).push(" = ").push_bind(id);
    }
    builder.push(")");
}

/// The four nullable coordinate columns of a row.
#[derive(Debug, Clone, Copy, FromRow)]
pub(crate) struct CoordinateRow {
    region_id: Option<i64>,
    university_id: Option<i64>,
    small_group_id: Option<i64>,
    alumni_group_id: Option<i64>,
}

impl From<CoordinateRow> for OrganizationalCoordinate {
    fn from(row: CoordinateRow) -> Self {
        Self {
            region_id: row.region_id.map(RegionId::new),
            university_id: row.university_id.map(UniversityId::new),
            small_group_id: row.small_group_id.map(SmallGroupId::new),
            alumni_group_id: row.alumni_group_id.map(AlumniGroupId::new),
        }
    }
}

/// Builds a decode error for a column holding an unexpected value.
pub(crate) fn invalid_column(
    column: &str,
    value: &str,
    reason: impl std::fmt::Display,
) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        format!("invalid {column} '{value}': {reason}"),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flock_authz::DenialReason;

    const MEMBER_COLUMNS: CoordinateColumns = &[
        (CoordinateField::Region, "m.region_id"),
        (CoordinateField::University, "m.university_id"),
        (CoordinateField::SmallGroup, "m.small_group_id"),
        (CoordinateField::AlumniGroup, "m.alumni_group_id"),
    ];

    const REGION_COLUMNS: CoordinateColumns = &[(CoordinateField::Region, "id")];

    fn render(filter: &RowFilter, columns: CoordinateColumns) -> String {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT id FROM t WHERE ");
        push_row_filter(&mut builder, filter, columns);
        builder.sql().to_string()
    }

    #[test]
    fn unrestricted_filter_is_true() {
        assert_eq!(
            render(&RowFilter::Unrestricted, FULL_COORDINATE),
            "SELECT id FROM t WHERE TRUE"
        );
    }

    #[test]
    fn deny_all_filter_is_false() {
        let filter = RowFilter::DenyAll {
            reason: DenialReason::MisconfiguredScope,
        };
        assert_eq!(
            render(&filter, FULL_COORDINATE),
            "SELECT id FROM t WHERE FALSE"
        );
    }

    #[test]
    fn restricted_filter_binds_the_matching_column() {
        let filter = RowFilter::Restricted(OrganizationalCoordinate::only(
            CoordinateField::SmallGroup,
            10,
        ));
        assert_eq!(
            render(&filter, MEMBER_COLUMNS),
            "SELECT id FROM t WHERE (m.small_group_id = $1)"
        );
    }

    #[test]
    fn restricted_filter_uses_table_specific_column() {
        let filter =
            RowFilter::Restricted(OrganizationalCoordinate::only(CoordinateField::Region, 1));
        assert_eq!(
            render(&filter, REGION_COLUMNS),
            "SELECT id FROM t WHERE (id = $1)"
        );
    }

    #[test]
    fn constraint_on_missing_column_is_false() {
        let filter = RowFilter::Restricted(OrganizationalCoordinate::only(
            CoordinateField::University,
            4,
        ));
        assert_eq!(
            render(&filter, REGION_COLUMNS),
            "SELECT id FROM t WHERE FALSE"
        );
    }

    #[test]
    fn multiple_constraints_are_conjoined() {
        let filter = RowFilter::Restricted(
            OrganizationalCoordinate::new()
                .with_region(RegionId::new(1))
                .with_university(UniversityId::new(4)),
        );
        assert_eq!(
            render(&filter, FULL_COORDINATE),
            "SELECT id FROM t WHERE (region_id = $1 AND university_id = $2)"
        );
    }

    #[test]
    fn coordinate_row_converts_to_typed_ids() {
        let row = CoordinateRow {
            region_id: Some(1),
            university_id: None,
            small_group_id: Some(10),
            alumni_group_id: None,
        };
        let coordinate = OrganizationalCoordinate::from(row);
        assert_eq!(coordinate.region_id, Some(RegionId::new(1)));
        assert_eq!(coordinate.small_group_id, Some(SmallGroupId::new(10)));
        assert!(coordinate.university_id.is_none());
    }
}

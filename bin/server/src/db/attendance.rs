//! Database repository for attendance records.
//!
//! Attendance has no coordinate of its own. Every query joins the member the
//! record belongs to and scopes on the member's coordinate.

use chrono::{DateTime, Utc};
use flock_authz::{CoordinateField, OrganizationalCoordinate, RowFilter};
use flock_core::{AttendanceId, EventId, MemberId};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use super::{CoordinateColumns, CoordinateRow, push_row_filter};

/// Coordinate columns of the joined member.
pub(crate) const MEMBER_COORDINATE: CoordinateColumns = &[
    (CoordinateField::Region, "m.region_id"),
    (CoordinateField::University, "m.university_id"),
    (CoordinateField::SmallGroup, "m.small_group_id"),
    (CoordinateField::AlumniGroup, "m.alumni_group_id"),
];

/// An attendance record from the database.
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceRecord {
    pub id: AttendanceId,
    pub member_id: MemberId,
    pub event_id: EventId,
    pub recorded_at: DateTime<Utc>,
    /// The coordinate of the member, which scopes this record.
    #[serde(skip)]
    pub member_coordinate: OrganizationalCoordinate,
}

/// Row type for attendance queries.
#[derive(FromRow)]
struct AttendanceRow {
    id: i64,
    member_id: i64,
    event_id: i64,
    recorded_at: DateTime<Utc>,
    #[sqlx(flatten)]
    coordinate: CoordinateRow,
}

impl From<AttendanceRow> for AttendanceRecord {
    fn from(row: AttendanceRow) -> Self {
        Self {
            id: AttendanceId::new(row.id),
            member_id: MemberId::new(row.member_id),
            event_id: EventId::new(row.event_id),
            recorded_at: row.recorded_at,
            member_coordinate: row.coordinate.into(),
        }
    }
}

const ATTENDANCE_SELECT: &str = "SELECT a.id, a.member_id, a.event_id, a.recorded_at, \
     m.region_id, m.university_id, m.small_group_id, m.alumni_group_id \
     FROM attendance a JOIN members m ON m.id = a.member_id";

/// Optional narrowing of an attendance listing.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct AttendanceQuery {
    pub member_id: Option<MemberId>,
    pub event_id: Option<EventId>,
}

/// Repository for attendance operations.
pub struct AttendanceRepository {
    pool: PgPool,
}

impl AttendanceRepository {
    /// Creates a new attendance repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists attendance of members visible under `filter`.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: &RowFilter,
        narrow: AttendanceQuery,
    ) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
        let mut query = QueryBuilder::<Postgres>::new(ATTENDANCE_SELECT);
        query.push(" WHERE ");
        push_row_filter(&mut query, filter, MEMBER_COORDINATE);
        if let Some(member_id) = narrow.member_id {
            query.push(" AND a.member_id = ").push_bind(member_id.get());
        }
        if let Some(event_id) = narrow.event_id {
            query.push(" AND a.event_id = ").push_bind(event_id.get());
        }
        query.push(" ORDER BY a.recorded_at DESC, a.id");

        let rows: Vec<AttendanceRow> = query.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Finds an attendance record by ID, regardless of scope.
    #[instrument(skip(self), fields(attendance_id = %id))]
    pub async fn find_by_id(
        &self,
        id: AttendanceId,
    ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
        let row: Option<AttendanceRow> =
            sqlx::query_as(&format!("{ATTENDANCE_SELECT} WHERE a.id = $1"))
                .bind(id.get())
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Into::into))
    }

    /// Records that a member attended an event.
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        member_id: MemberId,
        event_id: EventId,
    ) -> Result<AttendanceRecord, sqlx::Error> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO attendance (member_id, event_id)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(member_id.get())
        .bind(event_id.get())
        .fetch_one(&self.pool)
        .await?;

        self.find_by_id(AttendanceId::new(id))
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Deletes an attendance record. Returns true if a row was removed.
    #[instrument(skip(self), fields(attendance_id = %id))]
    pub async fn delete(&self, id: AttendanceId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM attendance WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

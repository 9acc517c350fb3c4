//! Database repository for events.

use chrono::{DateTime, Utc};
use flock_authz::{OrganizationalCoordinate, RowFilter};
use flock_core::EventId;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use super::{CoordinateRow, FULL_COORDINATE, push_row_filter};

/// An event record from the database.
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    pub id: EventId,
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    /// The organizational unit hosting the event.
    #[serde(flatten)]
    pub coordinate: OrganizationalCoordinate,
    pub created_at: DateTime<Utc>,
}

/// The writable fields of an event.
#[derive(Debug, Clone, Deserialize)]
pub struct EventFields {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    #[serde(flatten)]
    pub coordinate: OrganizationalCoordinate,
}

/// Row type for event queries.
#[derive(FromRow)]
struct EventRow {
    id: i64,
    name: String,
    description: Option<String>,
    location: Option<String>,
    starts_at: DateTime<Utc>,
    #[sqlx(flatten)]
    coordinate: CoordinateRow,
    created_at: DateTime<Utc>,
}

impl From<EventRow> for EventRecord {
    fn from(row: EventRow) -> Self {
        Self {
            id: EventId::new(row.id),
            name: row.name,
            description: row.description,
            location: row.location,
            starts_at: row.starts_at,
            coordinate: row.coordinate.into(),
            created_at: row.created_at,
        }
    }
}

const EVENT_COLUMNS: &str = "id, name, description, location, starts_at, region_id, \
     university_id, small_group_id, alumni_group_id, created_at";

/// Repository for event operations.
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    /// Creates a new event repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists events visible under `filter`, soonest first.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &RowFilter) -> Result<Vec<EventRecord>, sqlx::Error> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT ");
        query.push(EVENT_COLUMNS).push(" FROM events WHERE ");
        push_row_filter(&mut query, filter, FULL_COORDINATE);
        query.push(" ORDER BY starts_at, id");

        let rows: Vec<EventRow> = query.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Finds an event by ID, regardless of scope.
    #[instrument(skip(self), fields(event_id = %id))]
    pub async fn find_by_id(&self, id: EventId) -> Result<Option<EventRecord>, sqlx::Error> {
        let row: Option<EventRow> = sqlx::query_as(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Creates an event at `coordinate`.
    #[instrument(skip(self, fields))]
    pub async fn create(
        &self,
        fields: &EventFields,
        coordinate: &OrganizationalCoordinate,
    ) -> Result<EventRecord, sqlx::Error> {
        let row: EventRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO events
                (name, description, location, starts_at,
                 region_id, university_id, small_group_id, alumni_group_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(&fields.location)
        .bind(fields.starts_at)
        .bind(coordinate.region_id.map(|id| id.get()))
        .bind(coordinate.university_id.map(|id| id.get()))
        .bind(coordinate.small_group_id.map(|id| id.get()))
        .bind(coordinate.alumni_group_id.map(|id| id.get()))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// Replaces an event's fields and coordinate.
    ///
    /// Returns `None` if the event no longer exists.
    #[instrument(skip(self, fields), fields(event_id = %id))]
    pub async fn update(
        &self,
        id: EventId,
        fields: &EventFields,
        coordinate: &OrganizationalCoordinate,
    ) -> Result<Option<EventRecord>, sqlx::Error> {
        let row: Option<EventRow> = sqlx::query_as(&format!(
            r#"
            UPDATE events
            SET name = $2, description = $3, location = $4, starts_at = $5,
                region_id = $6, university_id = $7, small_group_id = $8, alumni_group_id = $9
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id.get())
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(&fields.location)
        .bind(fields.starts_at)
        .bind(coordinate.region_id.map(|id| id.get()))
        .bind(coordinate.university_id.map(|id| id.get()))
        .bind(coordinate.small_group_id.map(|id| id.get()))
        .bind(coordinate.alumni_group_id.map(|id| id.get()))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Deletes an event. Returns true if a row was removed.
    #[instrument(skip(self), fields(event_id = %id))]
    pub async fn delete(&self, id: EventId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flock_core::AlumniGroupId;
    use serde_json::json;

    #[test]
    fn event_fields_read_timestamp_and_coordinate() {
        let fields: EventFields = serde_json::from_value(json!({
            "name": "Alumni dinner",
            "starts_at": "2026-03-01T18:00:00Z",
            "alumni_group_id": 3
        }))
        .expect("deserialize");

        assert_eq!(fields.name, "Alumni dinner");
        assert_eq!(fields.coordinate.alumni_group_id, Some(AlumniGroupId::new(3)));
        assert!(fields.coordinate.region_id.is_none());
        assert!(fields.location.is_none());
    }

    #[test]
    fn event_fields_require_start_time() {
        let result: Result<EventFields, _> =
            serde_json::from_value(json!({ "name": "Retreat", "region_id": 1 }));
        assert!(result.is_err());
    }
}

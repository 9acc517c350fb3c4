//! Database repository for members.

use chrono::{DateTime, Utc};
use flock_authz::{OrganizationalCoordinate, RowFilter};
use flock_core::MemberId;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::fmt;
use std::str::FromStr;
use tracing::instrument;

use super::{CoordinateRow, FULL_COORDINATE, invalid_column, push_row_filter};

/// Whether a member is a current student or a graduate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberType {
    Student,
    Alumni,
}

impl MemberType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Alumni => "alumni",
        }
    }
}

impl fmt::Display for MemberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MemberType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Self::Student),
            "alumni" => Ok(Self::Alumni),
            other => Err(format!("unknown member type '{other}'")),
        }
    }
}

/// A member record from the database.
#[derive(Debug, Clone, Serialize)]
pub struct MemberRecord {
    pub id: MemberId,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub member_type: MemberType,
    /// Where the member sits in the hierarchy.
    #[serde(flatten)]
    pub coordinate: OrganizationalCoordinate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The writable fields of a member.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberFields {
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub member_type: MemberType,
    #[serde(flatten)]
    pub coordinate: OrganizationalCoordinate,
}

/// Row type for member queries.
#[derive(FromRow)]
struct MemberRow {
    id: i64,
    full_name: String,
    email: Option<String>,
    phone: Option<String>,
    member_type: String,
    #[sqlx(flatten)]
    coordinate: CoordinateRow,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MemberRow {
    fn try_into_record(self) -> Result<MemberRecord, sqlx::Error> {
        let member_type = MemberType::from_str(&self.member_type)
            .map_err(|e| invalid_column("member type", &self.member_type, e))?;

        Ok(MemberRecord {
            id: MemberId::new(self.id),
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            member_type,
            coordinate: self.coordinate.into(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const MEMBER_COLUMNS: &str = "id, full_name, email, phone, member_type, region_id, university_id, \
     small_group_id, alumni_group_id, created_at, updated_at";

/// Repository for member operations.
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    /// Creates a new member repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists members visible under `filter`.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &RowFilter) -> Result<Vec<MemberRecord>, sqlx::Error> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT ");
        query.push(MEMBER_COLUMNS).push(" FROM members WHERE ");
        push_row_filter(&mut query, filter, FULL_COORDINATE);
        query.push(" ORDER BY full_name, id");

        let rows: Vec<MemberRow> = query.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(MemberRow::try_into_record).collect()
    }

    /// Finds a member by ID, regardless of scope.
    #[instrument(skip(self), fields(member_id = %id))]
    pub async fn find_by_id(&self, id: MemberId) -> Result<Option<MemberRecord>, sqlx::Error> {
        let row: Option<MemberRow> = sqlx::query_as(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE id = $1"
        ))
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;

        row.map(MemberRow::try_into_record).transpose()
    }

    /// Creates a member at `coordinate`.
    #[instrument(skip(self, fields))]
    pub async fn create(
        &self,
        fields: &MemberFields,
        coordinate: &OrganizationalCoordinate,
    ) -> Result<MemberRecord, sqlx::Error> {
        let row: MemberRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO members
                (full_name, email, phone, member_type,
                 region_id, university_id, small_group_id, alumni_group_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {MEMBER_COLUMNS}
            "#
        ))
        .bind(&fields.full_name)
        .bind(&fields.email)
        .bind(&fields.phone)
        .bind(fields.member_type.as_str())
        .bind(coordinate.region_id.map(|id| id.get()))
        .bind(coordinate.university_id.map(|id| id.get()))
        .bind(coordinate.small_group_id.map(|id| id.get()))
        .bind(coordinate.alumni_group_id.map(|id| id.get()))
        .fetch_one(&self.pool)
        .await?;

        row.try_into_record()
    }

    /// Replaces a member's fields and coordinate.
    ///
    /// Returns `None` if the member no longer exists.
    #[instrument(skip(self, fields), fields(member_id = %id))]
    pub async fn update(
        &self,
        id: MemberId,
        fields: &MemberFields,
        coordinate: &OrganizationalCoordinate,
    ) -> Result<Option<MemberRecord>, sqlx::Error> {
        let row: Option<MemberRow> = sqlx::query_as(&format!(
            r#"
            UPDATE members
            SET full_name = $2, email = $3, phone = $4, member_type = $5,
                region_id = $6, university_id = $7, small_group_id = $8, alumni_group_id = $9,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {MEMBER_COLUMNS}
            "#
        ))
        .bind(id.get())
        .bind(&fields.full_name)
        .bind(&fields.email)
        .bind(&fields.phone)
        .bind(fields.member_type.as_str())
        .bind(coordinate.region_id.map(|id| id.get()))
        .bind(coordinate.university_id.map(|id| id.get()))
        .bind(coordinate.small_group_id.map(|id| id.get()))
        .bind(coordinate.alumni_group_id.map(|id| id.get()))
        .fetch_optional(&self.pool)
        .await?;

        row.map(MemberRow::try_into_record).transpose()
    }

    /// Deletes a member. Returns true if a row was removed.
    #[instrument(skip(self), fields(member_id = %id))]
    pub async fn delete(&self, id: MemberId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flock_core::{RegionId, SmallGroupId};
    use serde_json::json;

    #[test]
    fn member_type_round_trips_through_text() {
        for member_type in [MemberType::Student, MemberType::Alumni] {
            assert_eq!(
                MemberType::from_str(member_type.as_str()).expect("parse"),
                member_type
            );
        }
        assert!(MemberType::from_str("visitor").is_err());
    }

    #[test]
    fn member_fields_read_flat_coordinate() {
        let fields: MemberFields = serde_json::from_value(json!({
            "full_name": "Ada Obi",
            "member_type": "student",
            "region_id": 1,
            "small_group_id": 10
        }))
        .expect("deserialize");

        assert_eq!(fields.full_name, "Ada Obi");
        assert!(fields.email.is_none());
        assert_eq!(fields.coordinate.region_id, Some(RegionId::new(1)));
        assert_eq!(fields.coordinate.small_group_id, Some(SmallGroupId::new(10)));
        assert!(fields.coordinate.university_id.is_none());
    }

    #[test]
    fn member_record_serializes_flat_coordinate() {
        let record = MemberRecord {
            id: MemberId::new(5),
            full_name: "Ada Obi".to_string(),
            email: None,
            phone: None,
            member_type: MemberType::Alumni,
            coordinate: OrganizationalCoordinate::new().with_region(RegionId::new(2)),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(value["id"], 5);
        assert_eq!(value["member_type"], "alumni");
        assert_eq!(value["region_id"], 2);
        assert!(value["university_id"].is_null());
    }
}

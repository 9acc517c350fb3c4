//! Database repository for contributions.
//!
//! Like attendance, a contribution is scoped by the coordinate of its member.

use chrono::{DateTime, NaiveDate, Utc};
use flock_authz::{OrganizationalCoordinate, RowFilter};
use flock_core::{ContributionId, MemberId};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use super::attendance::MEMBER_COORDINATE;
use super::{CoordinateRow, push_row_filter};

/// A contribution record from the database.
#[derive(Debug, Clone, Serialize)]
pub struct ContributionRecord {
    pub id: ContributionId,
    pub member_id: MemberId,
    /// Amount in the smallest currency unit.
    pub amount_cents: i64,
    pub contribution_type: String,
    pub contributed_on: NaiveDate,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub member_coordinate: OrganizationalCoordinate,
}

/// The fields of a new contribution.
#[derive(Debug, Clone, Deserialize)]
pub struct NewContribution {
    pub member_id: MemberId,
    pub amount_cents: i64,
    pub contribution_type: String,
    pub contributed_on: NaiveDate,
    #[serde(default)]
    pub note: Option<String>,
}

/// Row type for contribution queries.
#[derive(FromRow)]
struct ContributionRow {
    id: i64,
    member_id: i64,
    amount_cents: i64,
    contribution_type: String,
    contributed_on: NaiveDate,
    note: Option<String>,
    created_at: DateTime<Utc>,
    #[sqlx(flatten)]
    coordinate: CoordinateRow,
}

impl From<ContributionRow> for ContributionRecord {
    fn from(row: ContributionRow) -> Self {
        Self {
            id: ContributionId::new(row.id),
            member_id: MemberId::new(row.member_id),
            amount_cents: row.amount_cents,
            contribution_type: row.contribution_type,
            contributed_on: row.contributed_on,
            note: row.note,
            created_at: row.created_at,
            member_coordinate: row.coordinate.into(),
        }
    }
}

const CONTRIBUTION_SELECT: &str = "SELECT c.id, c.member_id, c.amount_cents, \
     c.contribution_type, c.contributed_on, c.note, c.created_at, \
     m.region_id, m.university_id, m.small_group_id, m.alumni_group_id \
     FROM contributions c JOIN members m ON m.id = c.member_id";

/// Repository for contribution operations.
pub struct ContributionRepository {
    pool: PgPool,
}

impl ContributionRepository {
    /// Creates a new contribution repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists contributions of members visible under `filter`, newest first.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: &RowFilter,
        member_id: Option<MemberId>,
    ) -> Result<Vec<ContributionRecord>, sqlx::Error> {
        let mut query = QueryBuilder::<Postgres>::new(CONTRIBUTION_SELECT);
        query.push(" WHERE ");
        push_row_filter(&mut query, filter, MEMBER_COORDINATE);
        if let Some(member_id) = member_id {
            query.push(" AND c.member_id = ").push_bind(member_id.get());
        }
        query.push(" ORDER BY c.contributed_on DESC, c.id");

        let rows: Vec<ContributionRow> = query.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Finds a contribution by ID, regardless of scope.
    #[instrument(skip(self), fields(contribution_id = %id))]
    pub async fn find_by_id(
        &self,
        id: ContributionId,
    ) -> Result<Option<ContributionRecord>, sqlx::Error> {
        let row: Option<ContributionRow> =
            sqlx::query_as(&format!("{CONTRIBUTION_SELECT} WHERE c.id = $1"))
                .bind(id.get())
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Into::into))
    }

    /// Records a contribution.
    #[instrument(skip(self, contribution), fields(member_id = %contribution.member_id))]
    pub async fn create(
        &self,
        contribution: &NewContribution,
    ) -> Result<ContributionRecord, sqlx::Error> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO contributions
                (member_id, amount_cents, contribution_type, contributed_on, note)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(contribution.member_id.get())
        .bind(contribution.amount_cents)
        .bind(&contribution.contribution_type)
        .bind(contribution.contributed_on)
        .bind(&contribution.note)
        .fetch_one(&self.pool)
        .await?;

        self.find_by_id(ContributionId::new(id))
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Deletes a contribution. Returns true if a row was removed.
    #[instrument(skip(self), fields(contribution_id = %id))]
    pub async fn delete(&self, id: ContributionId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contributions WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_contribution_reads_plain_date() {
        let contribution: NewContribution = serde_json::from_value(json!({
            "member_id": 9,
            "amount_cents": 2500,
            "contribution_type": "tithe",
            "contributed_on": "2026-01-04"
        }))
        .expect("deserialize");

        assert_eq!(contribution.member_id, MemberId::new(9));
        assert_eq!(contribution.amount_cents, 2500);
        assert_eq!(
            contribution.contributed_on,
            NaiveDate::from_ymd_opt(2026, 1, 4).expect("date")
        );
        assert!(contribution.note.is_none());
    }
}

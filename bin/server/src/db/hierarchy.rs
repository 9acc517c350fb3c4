//! Database repository for the organizational hierarchy.
//!
//! Regions, universities, small groups and alumni groups are reference data.
//! Besides listing them under a row filter, this repository fetches the
//! parent lookups a write needs and packs them into a [`HierarchySnapshot`].

use flock_authz::{CoordinateField, HierarchySnapshot, OrganizationalCoordinate, RowFilter};
use flock_core::{AlumniGroupId, RegionId, SmallGroupId, UniversityId};
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use super::{CoordinateColumns, push_row_filter};

const REGION_COLUMNS: CoordinateColumns = &[(CoordinateField::Region, "id")];

const UNIVERSITY_COLUMNS: CoordinateColumns = &[
    (CoordinateField::Region, "region_id"),
    (CoordinateField::University, "id"),
];

const SMALL_GROUP_COLUMNS: CoordinateColumns = &[
    (CoordinateField::Region, "region_id"),
    (CoordinateField::University, "university_id"),
    (CoordinateField::SmallGroup, "id"),
];

const ALUMNI_GROUP_COLUMNS: CoordinateColumns = &[
    (CoordinateField::Region, "region_id"),
    (CoordinateField::AlumniGroup, "id"),
];

/// A region.
#[derive(Debug, Clone, Serialize)]
pub struct RegionRecord {
    pub id: RegionId,
    pub name: String,
}

/// A university and the region it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct UniversityRecord {
    pub id: UniversityId,
    pub name: String,
    pub region_id: RegionId,
}

/// A small group and its parents.
#[derive(Debug, Clone, Serialize)]
pub struct SmallGroupRecord {
    pub id: SmallGroupId,
    pub name: String,
    pub university_id: UniversityId,
    pub region_id: RegionId,
}

/// An alumni small group and the region it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct AlumniGroupRecord {
    pub id: AlumniGroupId,
    pub name: String,
    pub region_id: RegionId,
}

#[derive(FromRow)]
struct RegionRow {
    id: i64,
    name: String,
}

#[derive(FromRow)]
struct UniversityRow {
    id: i64,
    name: String,
    region_id: i64,
}

#[derive(FromRow)]
struct SmallGroupRow {
    id: i64,
    name: String,
    university_id: i64,
    region_id: i64,
}

#[derive(FromRow)]
struct AlumniGroupRow {
    id: i64,
    name: String,
    region_id: i64,
}

impl From<RegionRow> for RegionRecord {
    fn from(row: RegionRow) -> Self {
        Self {
            id: RegionId::new(row.id),
            name: row.name,
        }
    }
}

impl From<UniversityRow> for UniversityRecord {
    fn from(row: UniversityRow) -> Self {
        Self {
            id: UniversityId::new(row.id),
            name: row.name,
            region_id: RegionId::new(row.region_id),
        }
    }
}

impl From<SmallGroupRow> for SmallGroupRecord {
    fn from(row: SmallGroupRow) -> Self {
        Self {
            id: SmallGroupId::new(row.id),
            name: row.name,
            university_id: UniversityId::new(row.university_id),
            region_id: RegionId::new(row.region_id),
        }
    }
}

impl From<AlumniGroupRow> for AlumniGroupRecord {
    fn from(row: AlumniGroupRow) -> Self {
        Self {
            id: AlumniGroupId::new(row.id),
            name: row.name,
            region_id: RegionId::new(row.region_id),
        }
    }
}

/// Repository for the organizational hierarchy.
pub struct HierarchyRepository {
    pool: PgPool,
}

impl HierarchyRepository {
    /// Creates a new hierarchy repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists regions visible under `filter`.
    #[instrument(skip(self))]
    pub async fn list_regions(&self, filter: &RowFilter) -> Result<Vec<RegionRecord>, sqlx::Error> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT id, name FROM regions WHERE ");
        push_row_filter(&mut query, filter, REGION_COLUMNS);
        query.push(" ORDER BY name");

        let rows: Vec<RegionRow> = query.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Lists universities visible under `filter`.
    #[instrument(skip(self))]
    pub async fn list_universities(
        &self,
        filter: &RowFilter,
    ) -> Result<Vec<UniversityRecord>, sqlx::Error> {
        let mut query =
            QueryBuilder::<Postgres>::new("SELECT id, name, region_id FROM universities WHERE ");
        push_row_filter(&mut query, filter, UNIVERSITY_COLUMNS);
        query.push(" ORDER BY name");

        let rows: Vec<UniversityRow> = query.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Lists small groups visible under `filter`.
    #[instrument(skip(self))]
    pub async fn list_small_groups(
        &self,
        filter: &RowFilter,
    ) -> Result<Vec<SmallGroupRecord>, sqlx::Error> {
        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT id, name, university_id, region_id FROM small_groups WHERE ",
        );
        push_row_filter(&mut query, filter, SMALL_GROUP_COLUMNS);
        query.push(" ORDER BY name");

        let rows: Vec<SmallGroupRow> = query.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Lists alumni groups visible under `filter`.
    #[instrument(skip(self))]
    pub async fn list_alumni_groups(
        &self,
        filter: &RowFilter,
    ) -> Result<Vec<AlumniGroupRecord>, sqlx::Error> {
        let mut query =
            QueryBuilder::<Postgres>::new("SELECT id, name, region_id FROM alumni_groups WHERE ");
        push_row_filter(&mut query, filter, ALUMNI_GROUP_COLUMNS);
        query.push(" ORDER BY name");

        let rows: Vec<AlumniGroupRow> = query.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Fetches the parents of every id in `coordinate`.
    ///
    /// Unknown ids are simply absent from the snapshot, which the authorizer
    /// reports as an inconsistent chain.
    #[instrument(skip(self))]
    pub async fn snapshot_for(
        &self,
        coordinate: &OrganizationalCoordinate,
    ) -> Result<HierarchySnapshot, sqlx::Error> {
        let mut snapshot = HierarchySnapshot::new();
        let mut universities = Vec::new();

        if let Some(id) = coordinate.small_group_id {
            let row: Option<SmallGroupRow> = sqlx::query_as(
                r#"
                SELECT id, name, university_id, region_id
                FROM small_groups
                WHERE id = $1
                "#,
            )
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;

            if let Some(row) = row {
                let group = SmallGroupRecord::from(row);
                snapshot.insert_small_group(group.id, group.university_id, group.region_id);
                universities.push(group.university_id);
            }
        }

        universities.extend(coordinate.university_id);
        universities.dedup();
        for id in universities {
            let region: Option<i64> =
                sqlx::query_scalar("SELECT region_id FROM universities WHERE id = $1")
                    .bind(id.get())
                    .fetch_optional(&self.pool)
                    .await?;
            if let Some(region) = region {
                snapshot.insert_university(id, RegionId::new(region));
            }
        }

        if let Some(id) = coordinate.alumni_group_id {
            let region: Option<i64> =
                sqlx::query_scalar("SELECT region_id FROM alumni_groups WHERE id = $1")
                    .bind(id.get())
                    .fetch_optional(&self.pool)
                    .await?;
            if let Some(region) = region {
                snapshot.insert_alumni_group(id, RegionId::new(region));
            }
        }

        Ok(snapshot)
    }
}

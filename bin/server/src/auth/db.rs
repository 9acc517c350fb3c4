//! Database repositories for users, sessions and role assignments.

use chrono::{DateTime, Utc};
use flock_authz::{ScopeAssignment, ScopeKind};
use flock_core::{AlumniGroupId, RegionId, RoleAssignmentId, SmallGroupId, UniversityId, UserId};
use flock_platform_access::{
    RoleAssignment, Session, SessionId, User, select_active_assignment,
};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use tracing::instrument;

use crate::db::invalid_column;

/// Row type for user queries.
#[derive(FromRow)]
struct UserRow {
    id: String,
    email: String,
    display_name: Option<String>,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn try_into_user(self) -> Result<User, sqlx::Error> {
        let id = UserId::from_str(&self.id).map_err(|e| invalid_column("user id", &self.id, e))?;
        Ok(User::with_all_fields(
            id,
            self.email,
            self.display_name,
            self.password_hash,
            self.created_at,
            self.updated_at,
        ))
    }
}

/// Row type for session queries.
#[derive(FromRow)]
struct SessionRow {
    id: String,
    user_id: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl SessionRow {
    fn try_into_session(self) -> Result<Session, sqlx::Error> {
        let user_id = UserId::from_str(&self.user_id)
            .map_err(|e| invalid_column("user id", &self.user_id, e))?;
        Ok(Session::with_all_fields(
            SessionId::new(self.id),
            user_id,
            self.created_at,
            self.expires_at,
        ))
    }
}

/// Row type for role assignment queries.
#[derive(FromRow)]
struct RoleRow {
    id: i64,
    user_id: String,
    scope: String,
    region_id: Option<i64>,
    university_id: Option<i64>,
    small_group_id: Option<i64>,
    alumni_group_id: Option<i64>,
    assigned_at: DateTime<Utc>,
}

impl RoleRow {
    fn try_into_assignment(self) -> Result<RoleAssignment, sqlx::Error> {
        let user_id = UserId::from_str(&self.user_id)
            .map_err(|e| invalid_column("user id", &self.user_id, e))?;
        let kind =
            ScopeKind::from_str(&self.scope).map_err(|e| invalid_column("scope", &self.scope, e))?;

        let scope = ScopeAssignment {
            scope: kind,
            region_id: self.region_id.map(RegionId::new),
            university_id: self.university_id.map(UniversityId::new),
            small_group_id: self.small_group_id.map(SmallGroupId::new),
            alumni_group_id: self.alumni_group_id.map(AlumniGroupId::new),
        };

        Ok(RoleAssignment::new(
            RoleAssignmentId::new(self.id),
            user_id,
            scope,
            self.assigned_at,
        ))
    }
}

/// Repository for user operations.
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds a user by login email. Emails are compared case-insensitively.
    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, email, display_name, password_hash, created_at, updated_at
            FROM users
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::try_into_user).transpose()
    }

    /// Finds a user by their internal ID.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, email, display_name, password_hash, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::try_into_user).transpose()
    }

    /// Creates a new user.
    #[instrument(skip(self, user), fields(user_id = %user.id()))]
    pub async fn create(&self, user: &User) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, display_name, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id().to_string())
        .bind(user.email())
        .bind(user.display_name())
        .bind(user.password_hash())
        .bind(user.created_at())
        .bind(user.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Repository for session operations.
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Creates a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds a session by ID.
    pub async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, sqlx::Error> {
        let row: Option<SessionRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, created_at, expires_at
            FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(SessionRow::try_into_session).transpose()
    }

    /// Creates a new session.
    #[instrument(skip(self, session), fields(user_id = %session.user_id()))]
    pub async fn create(&self, session: &Session) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_id, created_at, expires_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(session.id().as_str())
        .bind(session.user_id().to_string())
        .bind(session.created_at())
        .bind(session.expires_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes a session by ID (logout).
    pub async fn delete(&self, id: &SessionId) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes expired sessions.
    pub async fn delete_expired(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE expires_at < NOW()
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

const ROLE_COLUMNS: &str = "id, user_id, scope, region_id, university_id, small_group_id, \
     alumni_group_id, assigned_at";

/// Repository for role assignments.
pub struct RoleAssignmentRepository {
    pool: PgPool,
}

impl RoleAssignmentRepository {
    /// Creates a new role assignment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists role assignments, optionally for a single user.
    #[instrument(skip(self))]
    pub async fn list(&self, user_id: Option<UserId>) -> Result<Vec<RoleAssignment>, sqlx::Error> {
        let rows: Vec<RoleRow> = match user_id {
            Some(user_id) => {
                sqlx::query_as(&format!(
                    "SELECT {ROLE_COLUMNS} FROM user_roles WHERE user_id = $1 ORDER BY id"
                ))
                .bind(user_id.to_string())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(&format!("SELECT {ROLE_COLUMNS} FROM user_roles ORDER BY id"))
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.into_iter().map(RoleRow::try_into_assignment).collect()
    }

    /// Returns the user's active role assignment, if they hold any.
    #[instrument(skip(self))]
    pub async fn find_active_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<RoleAssignment>, sqlx::Error> {
        let assignments = self.list(Some(user_id)).await?;
        Ok(select_active_assignment(&assignments).cloned())
    }

    /// Assigns a scope to a user. The new assignment becomes the active one.
    #[instrument(skip(self, scope), fields(scope = %scope.scope))]
    pub async fn create(
        &self,
        user_id: UserId,
        scope: &ScopeAssignment,
    ) -> Result<RoleAssignment, sqlx::Error> {
        let row: RoleRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO user_roles
                (user_id, scope, region_id, university_id, small_group_id, alumni_group_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ROLE_COLUMNS}
            "#
        ))
        .bind(user_id.to_string())
        .bind(scope.scope.as_str())
        .bind(scope.region_id.map(|id| id.get()))
        .bind(scope.university_id.map(|id| id.get()))
        .bind(scope.small_group_id.map(|id| id.get()))
        .bind(scope.alumni_group_id.map(|id| id.get()))
        .fetch_one(&self.pool)
        .await?;

        row.try_into_assignment()
    }
}

/// Generates a unique session ID using ULID.
pub fn generate_session_id() -> SessionId {
    SessionId::new(ulid::Ulid::new().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role_row(scope: &str) -> RoleRow {
        RoleRow {
            id: 3,
            user_id: UserId::new().to_string(),
            scope: scope.to_string(),
            region_id: None,
            university_id: Some(4),
            small_group_id: None,
            alumni_group_id: None,
            assigned_at: Utc::now(),
        }
    }

    #[test]
    fn role_row_converts_to_assignment() {
        let assignment = role_row("university").try_into_assignment().expect("convert");
        assert_eq!(
            assignment.scope(),
            &ScopeAssignment::university(UniversityId::new(4))
        );
        assert_eq!(assignment.id(), RoleAssignmentId::new(3));
    }

    #[test]
    fn role_row_with_unknown_scope_fails_to_decode() {
        assert!(role_row("deacon").try_into_assignment().is_err());
    }

    #[test]
    fn user_row_accepts_prefixed_id() {
        let id = UserId::new();
        let row = UserRow {
            id: id.to_string(),
            email: "a@example.org".to_string(),
            display_name: None,
            password_hash: "hash".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(row.try_into_user().expect("convert").id(), id);
    }

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(generate_session_id(), generate_session_id());
    }
}

//! Contributions, scoped by the member who gave them.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use flock_authz::{Operation, OrganizationalCoordinate, ScopeAssignment, ScopeAuthorizer};
use flock_core::{ContributionId, MemberId};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};

use super::{authorize_member_record, ensure_allowed, listing_filter};
use crate::auth::{AppState, RequireScope};
use crate::db::{ContributionRecord, ContributionRepository, MemberRepository, NewContribution};
use crate::error::ApiError;

/// Optional narrowing of a contribution listing.
#[derive(Debug, Default, Deserialize)]
pub struct ContributionQuery {
    pub member_id: Option<MemberId>,
}

/// Lists contributions of the members the caller can see.
pub async fn list_contributions(
    State(state): State<Arc<AppState>>,
    RequireScope { scope, .. }: RequireScope,
    Query(narrow): Query<ContributionQuery>,
) -> Result<Json<Vec<ContributionRecord>>, ApiError> {
    let filter = listing_filter(&state, &scope)?;
    let repo = ContributionRepository::new(state.db_pool.clone());
    Ok(Json(repo.list(&filter, narrow.member_id).await?))
}

/// Authorizes a contribution for a member at `member`, then checks its fields.
///
/// A caller outside the member's scope gets 403 even for a malformed body.
fn check_new_contribution(
    authorizer: &ScopeAuthorizer,
    scope: &ScopeAssignment,
    member: &OrganizationalCoordinate,
    contribution: &NewContribution,
) -> Result<(), ApiError> {
    ensure_allowed(&authorize_member_record(authorizer, scope, member, None))?;

    if contribution.amount_cents <= 0 {
        return Err(ApiError::bad_request("amount_cents must be positive"));
    }
    if contribution.contribution_type.trim().is_empty() {
        return Err(ApiError::bad_request("contribution_type must not be empty"));
    }
    Ok(())
}

/// Records a contribution for a member in scope.
#[instrument(skip_all, fields(member_id = %contribution.member_id))]
pub async fn create_contribution(
    State(state): State<Arc<AppState>>,
    RequireScope { caller, scope }: RequireScope,
    Json(contribution): Json<NewContribution>,
) -> Result<(StatusCode, Json<ContributionRecord>), ApiError> {
    let member = MemberRepository::new(state.db_pool.clone())
        .find_by_id(contribution.member_id)
        .await?
        .ok_or(ApiError::NotFound { resource: "member" })?;

    check_new_contribution(&state.authorizer, &scope, &member.coordinate, &contribution)?;

    let repo = ContributionRepository::new(state.db_pool.clone());
    let record = repo.create(&contribution).await?;
    info!(contribution_id = %record.id, user_id = %caller.user_id(), "contribution recorded");

    Ok((StatusCode::CREATED, Json(record)))
}

/// Deletes a contribution.
#[instrument(skip_all, fields(contribution_id = %id))]
pub async fn delete_contribution(
    State(state): State<Arc<AppState>>,
    RequireScope { caller, scope }: RequireScope,
    Path(id): Path<ContributionId>,
) -> Result<StatusCode, ApiError> {
    let repo = ContributionRepository::new(state.db_pool.clone());
    let record = repo.find_by_id(id).await?.ok_or(ApiError::NotFound {
        resource: "contribution",
    })?;

    ensure_allowed(&state.authorizer.can_access(
        &scope,
        &record.member_coordinate,
        Operation::Delete,
    ))?;

    if !repo.delete(id).await? {
        return Err(ApiError::NotFound {
            resource: "contribution",
        });
    }
    info!(user_id = %caller.user_id(), "contribution deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use flock_core::{AlumniGroupId, RegionId, UniversityId};

    fn contribution(amount_cents: i64, contribution_type: &str) -> NewContribution {
        NewContribution {
            member_id: MemberId::new(7),
            amount_cents,
            contribution_type: contribution_type.to_string(),
            contributed_on: NaiveDate::from_ymd_opt(2026, 3, 1).expect("date"),
            note: None,
        }
    }

    fn member() -> OrganizationalCoordinate {
        OrganizationalCoordinate::new()
            .with_region(RegionId::new(1))
            .with_university(UniversityId::new(7))
            .with_alumni_group(AlumniGroupId::new(5))
    }

    #[test]
    fn university_leader_records_for_alumni_linked_member() {
        let scope = ScopeAssignment::university(UniversityId::new(7));
        let result = check_new_contribution(
            &ScopeAuthorizer::new(),
            &scope,
            &member(),
            &contribution(2500, "tithe"),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn out_of_scope_caller_is_forbidden_before_field_checks() {
        let scope = ScopeAssignment::university(UniversityId::new(8));
        let err = check_new_contribution(
            &ScopeAuthorizer::new(),
            &scope,
            &member(),
            &contribution(-5, ""),
        )
        .expect_err("denied");

        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.body()["reason"], "scope_mismatch");
    }

    #[test]
    fn in_scope_caller_gets_field_errors() {
        let scope = ScopeAssignment::region(RegionId::new(1));
        let authorizer = ScopeAuthorizer::new();

        let err = check_new_contribution(&authorizer, &scope, &member(), &contribution(0, "tithe"))
            .expect_err("zero amount");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = check_new_contribution(&authorizer, &scope, &member(), &contribution(100, " "))
            .expect_err("blank type");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}

//! Member CRUD.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use flock_authz::Operation;
use flock_core::MemberId;
use std::sync::Arc;
use tracing::{info, instrument};

use super::{ensure_allowed, listing_filter, resolve_coordinate};
use crate::auth::{AppState, RequireScope};
use crate::db::{MemberFields, MemberRecord, MemberRepository};
use crate::error::ApiError;

const RESOURCE: &str = "member";

/// Lists the members the caller can see.
pub async fn list_members(
    State(state): State<Arc<AppState>>,
    RequireScope { scope, .. }: RequireScope,
) -> Result<Json<Vec<MemberRecord>>, ApiError> {
    let filter = listing_filter(&state, &scope)?;
    let repo = MemberRepository::new(state.db_pool.clone());
    Ok(Json(repo.list(&filter).await?))
}

/// Fetches a single member.
#[instrument(skip_all, fields(member_id = %id))]
pub async fn get_member(
    State(state): State<Arc<AppState>>,
    RequireScope { scope, .. }: RequireScope,
    Path(id): Path<MemberId>,
) -> Result<Json<MemberRecord>, ApiError> {
    let repo = MemberRepository::new(state.db_pool.clone());
    let member = repo
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound { resource: RESOURCE })?;

    ensure_allowed(
        &state
            .authorizer
            .can_access(&scope, &member.coordinate, Operation::Read),
    )?;
    Ok(Json(member))
}

/// Creates a member inside the caller's scope.
#[instrument(skip_all)]
pub async fn create_member(
    State(state): State<Arc<AppState>>,
    RequireScope { caller, scope }: RequireScope,
    Json(fields): Json<MemberFields>,
) -> Result<(StatusCode, Json<MemberRecord>), ApiError> {
    let (coordinate, snapshot) = resolve_coordinate(&state, &fields.coordinate).await?;
    ensure_allowed(&state.authorizer.can_assign(
        &scope,
        &coordinate,
        Operation::Create,
        &snapshot,
    ))?;

    let repo = MemberRepository::new(state.db_pool.clone());
    let member = repo.create(&fields, &coordinate).await?;
    info!(member_id = %member.id, user_id = %caller.user_id(), "member created");

    Ok((StatusCode::CREATED, Json(member)))
}

/// Replaces a member's fields, possibly moving them in the hierarchy.
#[instrument(skip_all, fields(member_id = %id))]
pub async fn update_member(
    State(state): State<Arc<AppState>>,
    RequireScope { caller, scope }: RequireScope,
    Path(id): Path<MemberId>,
    Json(fields): Json<MemberFields>,
) -> Result<Json<MemberRecord>, ApiError> {
    let repo = MemberRepository::new(state.db_pool.clone());
    let current = repo
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound { resource: RESOURCE })?;

    let (coordinate, snapshot) = resolve_coordinate(&state, &fields.coordinate).await?;
    ensure_allowed(&state.authorizer.authorize_update(
        &scope,
        &current.coordinate,
        &coordinate,
        &snapshot,
    ))?;

    let member = repo
        .update(id, &fields, &coordinate)
        .await?
        .ok_or(ApiError::NotFound { resource: RESOURCE })?;
    info!(user_id = %caller.user_id(), "member updated");

    Ok(Json(member))
}

/// Deletes a member together with their attendance and contributions.
#[instrument(skip_all, fields(member_id = %id))]
pub async fn delete_member(
    State(state): State<Arc<AppState>>,
    RequireScope { caller, scope }: RequireScope,
    Path(id): Path<MemberId>,
) -> Result<StatusCode, ApiError> {
    let repo = MemberRepository::new(state.db_pool.clone());
    let member = repo
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound { resource: RESOURCE })?;

    ensure_allowed(
        &state
            .authorizer
            .can_access(&scope, &member.coordinate, Operation::Delete),
    )?;

    if !repo.delete(id).await? {
        return Err(ApiError::NotFound { resource: RESOURCE });
    }
    info!(user_id = %caller.user_id(), "member deleted");

    Ok(StatusCode::NO_CONTENT)
}

//! Event CRUD.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use flock_authz::Operation;
use flock_core::EventId;
use std::sync::Arc;
use tracing::{info, instrument};

use super::{ensure_allowed, listing_filter, resolve_coordinate};
use crate::auth::{AppState, RequireScope};
use crate::db::{EventFields, EventRecord, EventRepository};
use crate::error::ApiError;

const RESOURCE: &str = "event";

/// Lists the events the caller can see.
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    RequireScope { scope, .. }: RequireScope,
) -> Result<Json<Vec<EventRecord>>, ApiError> {
    let filter = listing_filter(&state, &scope)?;
    let repo = EventRepository::new(state.db_pool.clone());
    Ok(Json(repo.list(&filter).await?))
}

/// Fetches a single event.
#[instrument(skip_all, fields(event_id = %id))]
pub async fn get_event(
    State(state): State<Arc<AppState>>,
    RequireScope { scope, .. }: RequireScope,
    Path(id): Path<EventId>,
) -> Result<Json<EventRecord>, ApiError> {
    let repo = EventRepository::new(state.db_pool.clone());
    let event = repo
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound { resource: RESOURCE })?;

    ensure_allowed(
        &state
            .authorizer
            .can_access(&scope, &event.coordinate, Operation::Read),
    )?;
    Ok(Json(event))
}

/// Creates an event inside the caller's scope.
#[instrument(skip_all)]
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    RequireScope { caller, scope }: RequireScope,
    Json(fields): Json<EventFields>,
) -> Result<(StatusCode, Json<EventRecord>), ApiError> {
    let (coordinate, snapshot) = resolve_coordinate(&state, &fields.coordinate).await?;
    ensure_allowed(&state.authorizer.can_assign(
        &scope,
        &coordinate,
        Operation::Create,
        &snapshot,
    ))?;

    let repo = EventRepository::new(state.db_pool.clone());
    let event = repo.create(&fields, &coordinate).await?;
    info!(event_id = %event.id, user_id = %caller.user_id(), "event created");

    Ok((StatusCode::CREATED, Json(event)))
}

/// Replaces an event's fields, possibly moving it to another host unit.
#[instrument(skip_all, fields(event_id = %id))]
pub async fn update_event(
    State(state): State<Arc<AppState>>,
    RequireScope { caller, scope }: RequireScope,
    Path(id): Path<EventId>,
    Json(fields): Json<EventFields>,
) -> Result<Json<EventRecord>, ApiError> {
    let repo = EventRepository::new(state.db_pool.clone());
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

    let event = repo
        .update(id, &fields, &coordinate)
        .await?
        .ok_or(ApiError::NotFound { resource: RESOURCE })?;
    info!(user_id = %caller.user_id(), "event updated");

    Ok(Json(event))
}

/// Deletes an event together with its attendance.
#[instrument(skip_all, fields(event_id = %id))]
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    RequireScope { caller, scope }: RequireScope,
    Path(id): Path<EventId>,
) -> Result<StatusCode, ApiError> {
    let repo = EventRepository::new(state.db_pool.clone());
    let event = repo
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound { resource: RESOURCE })?;

    ensure_allowed(
        &state
            .authorizer
            .can_access(&scope, &event.coordinate, Operation::Delete),
    )?;

    if !repo.delete(id).await? {
        return Err(ApiError::NotFound { resource: RESOURCE });
    }
    info!(user_id = %caller.user_id(), "event deleted");

    Ok(StatusCode::NO_CONTENT)
}

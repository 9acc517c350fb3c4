//! Attendance records.
//!
//! An attendance row is scoped by its member. Recording one requires that the
//! caller can see both the member and the event.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use flock_authz::Operation;
use flock_core::{AttendanceId, EventId, MemberId};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};

use super::{authorize_member_record, ensure_allowed, listing_filter};
use crate::auth::{AppState, RequireScope};
use crate::db::{
    AttendanceQuery, AttendanceRecord, AttendanceRepository, EventRepository, MemberRepository,
};
use crate::error::ApiError;

/// Body of an attendance record request.
#[derive(Debug, Deserialize)]
pub struct NewAttendance {
    pub member_id: MemberId,
    pub event_id: EventId,
}

/// Lists attendance of the members the caller can see.
pub async fn list_attendance(
    State(state): State<Arc<AppState>>,
    RequireScope { scope, .. }: RequireScope,
    Query(narrow): Query<AttendanceQuery>,
) -> Result<Json<Vec<AttendanceRecord>>, ApiError> {
    let filter = listing_filter(&state, &scope)?;
    let repo = AttendanceRepository::new(state.db_pool.clone());
    Ok(Json(repo.list(&filter, narrow).await?))
}

/// Records that a member attended an event.
#[instrument(skip_all, fields(member_id = %request.member_id, event_id = %request.event_id))]
pub async fn create_attendance(
    State(state): State<Arc<AppState>>,
    RequireScope { caller, scope }: RequireScope,
    Json(request): Json<NewAttendance>,
) -> Result<(StatusCode, Json<AttendanceRecord>), ApiError> {
    let member = MemberRepository::new(state.db_pool.clone())
        .find_by_id(request.member_id)
        .await?
        .ok_or(ApiError::NotFound { resource: "member" })?;
    let event = EventRepository::new(state.db_pool.clone())
        .find_by_id(request.event_id)
        .await?
        .ok_or(ApiError::NotFound { resource: "event" })?;

    ensure_allowed(&authorize_member_record(
        &state.authorizer,
        &scope,
        &member.coordinate,
        Some(&event.coordinate),
    ))?;

    let repo = AttendanceRepository::new(state.db_pool.clone());
    let record = repo.create(member.id, event.id).await?;
    info!(attendance_id = %record.id, user_id = %caller.user_id(), "attendance recorded");

    Ok((StatusCode::CREATED, Json(record)))
}

/// Deletes an attendance record.
#[instrument(skip_all, fields(attendance_id = %id))]
pub async fn delete_attendance(
    State(state): State<Arc<AppState>>,
    RequireScope { caller, scope }: RequireScope,
    Path(id): Path<AttendanceId>,
) -> Result<StatusCode, ApiError> {
    let repo = AttendanceRepository::new(state.db_pool.clone());
    let record = repo.find_by_id(id).await?.ok_or(ApiError::NotFound {
        resource: "attendance",
    })?;

    ensure_allowed(&state.authorizer.can_access(
        &scope,
        &record.member_coordinate,
        Operation::Delete,
    ))?;

    if !repo.delete(id).await? {
        return Err(ApiError::NotFound {
            resource: "attendance",
        });
    }
    info!(user_id = %caller.user_id(), "attendance deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_attendance_reads_integer_ids() {
        let request: NewAttendance =
            serde_json::from_value(json!({ "member_id": 7, "event_id": 3 })).expect("deserialize");
        assert_eq!(request.member_id, MemberId::new(7));
        assert_eq!(request.event_id, EventId::new(3));
    }

    #[test]
    fn new_attendance_requires_an_event() {
        let result: Result<NewAttendance, _> = serde_json::from_value(json!({ "member_id": 7 }));
        assert!(result.is_err());
    }
}

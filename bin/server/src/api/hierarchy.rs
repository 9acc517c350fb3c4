//! Listings of the organizational hierarchy.
//!
//! A table only matches a scope whose field it carries. A university leader
//! sees their university and its small groups, but no region rows.

use axum::{Json, extract::State};
use std::sync::Arc;

use super::listing_filter;
use crate::auth::{AppState, RequireScope};
use crate::db::{
    AlumniGroupRecord, HierarchyRepository, RegionRecord, SmallGroupRecord, UniversityRecord,
};
use crate::error::ApiError;

pub async fn list_regions(
    State(state): State<Arc<AppState>>,
    RequireScope { scope, .. }: RequireScope,
) -> Result<Json<Vec<RegionRecord>>, ApiError> {
    let filter = listing_filter(&state, &scope)?;
    let repo = HierarchyRepository::new(state.db_pool.clone());
    Ok(Json(repo.list_regions(&filter).await?))
}

pub async fn list_universities(
    State(state): State<Arc<AppState>>,
    RequireScope { scope, .. }: RequireScope,
) -> Result<Json<Vec<UniversityRecord>>, ApiError> {
    let filter = listing_filter(&state, &scope)?;
    let repo = HierarchyRepository::new(state.db_pool.clone());
    Ok(Json(repo.list_universities(&filter).await?))
}

pub async fn list_small_groups(
    State(state): State<Arc<AppState>>,
    RequireScope { scope, .. }: RequireScope,
) -> Result<Json<Vec<SmallGroupRecord>>, ApiError> {
    let filter = listing_filter(&state, &scope)?;
    let repo = HierarchyRepository::new(state.db_pool.clone());
    Ok(Json(repo.list_small_groups(&filter).await?))
}

pub async fn list_alumni_groups(
    State(state): State<Arc<AppState>>,
    RequireScope { scope, .. }: RequireScope,
) -> Result<Json<Vec<AlumniGroupRecord>>, ApiError> {
    let filter = listing_filter(&state, &scope)?;
    let repo = HierarchyRepository::new(state.db_pool.clone());
    Ok(Json(repo.list_alumni_groups(&filter).await?))
}

//! Check-in API handlers

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::ApiError;
use super::handlers::AppState;
use crate::cursor::CursorData;
use crate::models::{
    CheckIn, CheckInFilter, NewCheckInRequest, SortDirection, UpdateCheckInRequest,
};
use crate::storage::PageRequest;
use crate::travel::{self, TravelStats};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInListQuery {
    pub course_name: Option<String>,
    pub username: Option<String>,
    /// `ASC` or `DESC`, case-insensitive; anything else means the endpoint's default
    pub direction: Option<String>,
    pub limit: Option<i64>,
    /// Opaque cursor from a previous page's `nextCursor`
    pub cursor: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInPage {
    pub items: Vec<CheckIn>,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DistanceResponse {
    pub distance: f64,
}

impl AppState {
    /// Build a keyset page request, fetching one extra row to detect a next page
    fn page_request(
        &self,
        query: &CheckInListQuery,
        default_direction: SortDirection,
    ) -> Result<(PageRequest, i64), ApiError> {
        let limit = self.pagination.page_size(query.limit);
        let after = query
            .cursor
            .as_deref()
            .map(|c| self.cursors.decode(c))
            .transpose()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        let page = PageRequest {
            limit: limit.saturating_add(1),
            direction: SortDirection::from_param(query.direction.as_deref(), default_direction),
            after,
        };
        Ok((page, limit))
    }

    fn into_page(&self, mut items: Vec<CheckIn>, limit: i64) -> Result<CheckInPage, ApiError> {
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        let next_cursor = if items.len() > limit {
            items.truncate(limit);
            items
                .last()
                .map(|last| {
                    self.cursors.encode(&CursorData {
                        checked_in_at: last.checked_in_at,
                        id: last.id,
                    })
                })
                .transpose()?
        } else {
            None
        };

        Ok(CheckInPage { items, next_cursor })
    }
}

/// All check-ins, newest first unless `direction=ASC`
pub async fn list_check_ins(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CheckInListQuery>, QueryRejection>,
) -> Result<Json<CheckInPage>, ApiError> {
    let Query(query) = query?;
    let (page, limit) = state.page_request(&query, SortDirection::Desc)?;
    let filter = CheckInFilter {
        course_name: query.course_name.clone(),
        username: query.username.clone(),
    };

    let items = state.storage.list_check_ins(&filter, &page).await?;
    Ok(Json(state.into_page(items, limit)?))
}

/// Check-ins for one disc, oldest first unless `direction=DESC`
pub async fn list_disc_check_ins(
    State(state): State<Arc<AppState>>,
    Path(disc_id): Path<String>,
    query: Result<Query<CheckInListQuery>, QueryRejection>,
) -> Result<Json<CheckInPage>, ApiError> {
    let Query(query) = query?;
    if state.storage.get_disc(&disc_id).await?.is_none() {
        return Err(ApiError::NotFound(format!(
            "No check ins for disc id {disc_id} found!"
        )));
    }

    let (page, limit) = state.page_request(&query, SortDirection::Asc)?;
    let items = state
        .storage
        .list_check_ins_for_disc(&disc_id, &page)
        .await?;
    Ok(Json(state.into_page(items, limit)?))
}

pub async fn list_user_check_ins(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    query: Result<Query<CheckInListQuery>, QueryRejection>,
) -> Result<Json<CheckInPage>, ApiError> {
    let Query(query) = query?;
    let (page, limit) = state.page_request(&query, SortDirection::Desc)?;
    let items = state
        .storage
        .list_check_ins_for_user(&username, &page)
        .await?;
    Ok(Json(state.into_page(items, limit)?))
}

pub async fn create_check_in(
    State(state): State<Arc<AppState>>,
    Path(disc_id): Path<String>,
    payload: Result<Json<NewCheckInRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CheckIn>), ApiError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let check_in = state.storage.create_check_in(&disc_id, &payload).await?;
    tracing::info!(
        check_in_id = check_in.id,
        disc_id = %disc_id,
        course = %check_in.course_name,
        "Check in recorded"
    );
    Ok((StatusCode::CREATED, Json(check_in)))
}

pub async fn get_check_in(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<CheckIn>, ApiError> {
    let Path(id) = id?;
    state
        .storage
        .get_check_in(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Cannot find check in with id: {id}")))
}

pub async fn update_check_in(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateCheckInRequest>, JsonRejection>,
) -> Result<Json<CheckIn>, ApiError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    payload.validate()?;

    state
        .storage
        .update_check_in(id, &payload)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No check in found of id {id}!")))
}

pub async fn delete_check_in(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    if state.storage.delete_check_in(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("No check in found of id {id}!")))
    }
}

/// Distance traveled plus distinct state, user, country and course counts
pub async fn disc_stats(
    State(state): State<Arc<AppState>>,
    Path(disc_id): Path<String>,
) -> Result<Json<TravelStats>, ApiError> {
    let stats = travel::stats_for_disc(state.storage.as_ref(), &disc_id).await?;
    Ok(Json(stats))
}

pub async fn disc_distance(
    State(state): State<Arc<AppState>>,
    Path(disc_id): Path<String>,
) -> Result<Json<DistanceResponse>, ApiError> {
    let distance = travel::distance_for_disc(state.storage.as_ref(), &disc_id).await?;
    Ok(Json(DistanceResponse { distance }))
}

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::ApiError;
use crate::config::PaginationConfig;
use crate::cursor::CursorCodec;
use crate::models::{Course, CreateDiscRequest, Disc, DiscFilter, UpdateDiscRequest};
use crate::storage::Storage;

pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub cursors: CursorCodec,
    pub pagination: PaginationConfig,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct DiscListQuery {
    pub name: Option<String>,
    pub manufacturer: Option<String>,
    pub plastic: Option<String>,
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseListQuery {
    pub course_name: Option<String>,
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: i64,
}

/// List discs, optionally filtered by name, manufacturer or plastic
pub async fn list_discs(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DiscListQuery>, QueryRejection>,
) -> Result<Json<Vec<Disc>>, ApiError> {
    let Query(query) = query?;
    let limit = state.pagination.page_size(query.limit);
    let filter = DiscFilter {
        name: query.name,
        manufacturer: query.manufacturer,
        plastic: query.plastic,
    };

    let discs = state
        .storage
        .list_discs(&filter, limit, query.offset.max(0))
        .await?;
    Ok(Json(discs))
}

pub async fn create_disc(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateDiscRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Disc>), ApiError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let disc = state.storage.create_disc(&payload).await?;
    tracing::info!(disc_id = %disc.id, "Disc created");
    Ok((StatusCode::CREATED, Json(disc)))
}

pub async fn get_disc(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Disc>, ApiError> {
    state
        .storage
        .get_disc(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Couldn't find disc with id of {id}")))
}

pub async fn update_disc(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateDiscRequest>, JsonRejection>,
) -> Result<Json<Disc>, ApiError> {
    let Json(payload) = payload?;
    if payload.is_empty() {
        return Err(ApiError::BadRequest("No disc fields to update".to_string()));
    }
    payload.validate()?;

    state
        .storage
        .update_disc(&id, &payload)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No disc of id {id}")))
}

pub async fn delete_disc(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.storage.delete_disc(&id).await? {
        tracing::info!(disc_id = %id, "Disc deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Couldn't find disc with id of {id}")))
    }
}

pub async fn list_courses(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CourseListQuery>, QueryRejection>,
) -> Result<Json<Vec<Course>>, ApiError> {
    let Query(query) = query?;
    let limit = state.pagination.page_size(query.limit);
    let courses = state
        .storage
        .list_courses(query.course_name.as_deref(), limit, query.offset.max(0))
        .await?;
    Ok(Json(courses))
}

/// Health check endpoint
pub async fn health_check() -> Json<SuccessResponse> {
    Json(SuccessResponse {
        message: "OK".to_string(),
    })
}

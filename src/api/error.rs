use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::models::ValidationError;
use crate::storage::StorageError;
use crate::travel::{GeoError, TravelError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    status: u16,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                message,
                status: status.as_u16(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict(_) => ApiError::Conflict(err.to_string()),
            StorageError::NotFound(_) => ApiError::NotFound(err.to_string()),
            StorageError::Other(inner) => ApiError::Internal(inner),
        }
    }
}

impl From<GeoError> for ApiError {
    fn from(err: GeoError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<TravelError> for ApiError {
    fn from(err: TravelError) -> Self {
        match err {
            TravelError::NotFound(what) => ApiError::NotFound(format!("{what} not found")),
            TravelError::InvalidCoordinate { .. } => ApiError::BadRequest(err.to_string()),
            TravelError::Storage(inner) => ApiError::Internal(inner),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

// Extractor failures use the same JSON error body as every other error
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

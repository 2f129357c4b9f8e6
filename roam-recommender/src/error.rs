//! Error types for roam-recommender.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::schema::CanonicalField;
use crate::table::Category;

/// Recommender errors.
#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    /// A canonical column could not be resolved; the record set is unusable.
    #[error("Schema error for {category} data: unresolved columns {missing:?} (available: {available:?})")]
    Schema {
        category: Category,
        missing: Vec<CanonicalField>,
        available: Vec<String>,
    },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Failed to load {path}: {reason}")]
    Load { path: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<roam_common::Error> for RecommendError {
    fn from(err: roam_common::Error) -> Self {
        match err {
            roam_common::Error::InvalidInput(message) => Self::InvalidQuery(message),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// API error response.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl IntoResponse for RecommendError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            RecommendError::InvalidQuery(_) => (StatusCode::BAD_REQUEST, "INVALID_QUERY"),
            RecommendError::Schema { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "SCHEMA_ERROR"),
            RecommendError::Load { .. } => (StatusCode::SERVICE_UNAVAILABLE, "LOAD_FAILED"),
            RecommendError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = serde_json::json!({
            "success": false,
            "error": ApiError {
                code: code.to_string(),
                message: self.to_string(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

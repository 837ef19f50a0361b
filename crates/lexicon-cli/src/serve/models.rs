//! Request, response and error types for the taxonomy API.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use lexicon_core::CatalogError;

// =============================================================================
// Requests
// =============================================================================

/// Query parameters for `/api/lexicon/navigate`.
#[derive(Debug, Deserialize)]
pub struct NavigateQuery {
    /// Label to center on (case-insensitive).
    pub term: String,
}

// =============================================================================
// Errors
// =============================================================================

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// An HTTP status plus a message, rendered as [`ErrorBody`].
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(subject: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("Term not found: {subject}"))
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        let status = match &err {
            CatalogError::Conflict(_) => StatusCode::CONFLICT,
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::RootProtected => StatusCode::FORBIDDEN,
            CatalogError::InvalidLabel => StatusCode::BAD_REQUEST,
            CatalogError::Malformed(_) | CatalogError::Io { .. } | CatalogError::Json(_) => {
                tracing::error!(error = %err, "catalog write failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/*
 * Responsibility
 * - Application-wide AppError
 * - IntoResponse (HTTP status + JSON error body with timestamp/status/error/message/path)
 * - Map authorization outcomes (Denial / PermissionError) into HTTP failures
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use crate::services::authz::{Denial, PermissionError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub timestamp: String,
    pub status: u16,
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized")]
    Unauthorized { path: Option<String> },
    #[error("{message}")]
    Forbidden {
        message: String,
        path: Option<String>,
    },
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn unauthorized(path: impl Into<String>) -> Self {
        Self::Unauthorized {
            path: Some(path.into()),
        }
    }

    pub fn forbidden(denial: &Denial, path: impl Into<String>) -> Self {
        Self::Forbidden {
            message: denial.to_string(),
            path: Some(path.into()),
        }
    }

    /// Turn a permission-check failure into an HTTP failure for `path`.
    ///
    /// Unsupported target types are a wiring bug, so they surface as 500 and are
    /// logged at error level instead of being reported as an access denial.
    pub fn from_permission(err: PermissionError, path: &str) -> Self {
        match err {
            PermissionError::Denied(denial) => Self::forbidden(&denial, path),
            PermissionError::UnsupportedTargetType(target_type) => {
                tracing::error!(%target_type, path, "permission check used an unsupported target type");
                Self::Internal
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, path) = match self {
            AppError::Unauthorized { path } => (
                StatusCode::UNAUTHORIZED,
                "Missing or invalid Authorization token".to_string(),
                path,
            ),
            AppError::Forbidden { message, path } => (StatusCode::FORBIDDEN, message, path),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
                None,
            ),
        };

        let body = ErrorResponse {
            timestamp: Utc::now().to_rfc3339(),
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Error"),
            message,
            path,
        };

        (status, Json(body)).into_response()
    }
}

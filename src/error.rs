//! HTTP-facing error type.
//!
//! Bodies are intentionally small:
//!
//! - `400` → `{"error": "<reason>"}`
//! - `403` → empty
//! - `404` → empty
//! - `500` → `{"error": "internal error"}`; the real cause is only logged

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::domain::StoreError;

/// Generic body for internal failures.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal error";

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String },

    #[error("forbidden")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("{message}")]
    Internal { message: String },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn forbidden() -> Self {
        Self::Forbidden
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::internal(e.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{field} is invalid"))
                })
            })
            .next()
            .unwrap_or_else(|| "invalid request".to_string());

        AppError::bad_request(message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            AppError::Validation { message } => {
                (status, Json(ErrorBody { error: message })).into_response()
            }
            AppError::Forbidden | AppError::NotFound => status.into_response(),
            AppError::Internal { message } => {
                tracing::error!(error = %message, "Internal error");
                (
                    status,
                    Json(ErrorBody {
                        error: INTERNAL_ERROR_MESSAGE.to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }
}

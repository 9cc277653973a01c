//! Error handling for the Staybook HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// Standard error response format for all HTTP errors
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
    pub trace_id: String,
    pub timestamp: String,
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("bad request: {message}")]
    BadRequest { message: String, code: String },

    #[error("not found: {message}")]
    NotFound { message: String, code: String },

    /// An upstream collaborator failed; `message` names the failing stage and
    /// `detail` carries the collaborator's own message.
    #[error("{message}: {detail}")]
    Upstream {
        message: String,
        code: String,
        detail: String,
    },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            code: "bad_request".to_string(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            code: "not_found".to_string(),
        }
    }

    /// Create an upstream failure
    pub fn upstream(
        code: impl Into<String>,
        message: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::Upstream {
            message: message.into(),
            code: code.into(),
            detail: detail.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Upstream { .. } | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let timestamp = OffsetDateTime::now_utc().to_string();
        let status = self.status();

        // Collaborator details stay out of release responses; the stage tag is always kept.
        let hide_details = cfg!(not(debug_assertions));

        let (error_code, message) = match self {
            AppError::BadRequest { message, code } | AppError::NotFound { message, code } => {
                (code, message)
            }
            AppError::Upstream {
                message,
                code,
                detail,
            } => {
                tracing::error!(error_id = %error_id, error_code = %code, %detail, "upstream failure");
                if hide_details {
                    (code, message)
                } else {
                    (code, format!("{message}: {detail}"))
                }
            }
            AppError::Internal(e) => {
                tracing::error!(error_id = %error_id, error = %e, "internal failure");
                let message = if hide_details {
                    "An internal server error occurred".to_string()
                } else {
                    e.to_string()
                };
                ("internal_error".to_string(), message)
            }
        };

        tracing::warn!(
            error_id = %error_id,
            error_code = %error_code,
            status_code = %status.as_u16(),
            "Request error"
        );

        let body = ErrorBody {
            error: message,
            code: error_code,
            trace_id: error_id.to_string(),
            timestamp,
        };

        (status, Json(body)).into_response()
    }
}

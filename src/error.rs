//! Error types for the gantt-bridge service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors surfaced by the read and write-back endpoints.
#[derive(Debug, Error)]
pub enum GanttError {
    /// Caller-supplied input failed validation
    #[error("validation failed: {0}")]
    Validation(String),

    /// Caller lacks the required permission on the host platform
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Referenced record does not exist in the host store
    #[error("{doctype} {name} not found")]
    NotFound {
        doctype: &'static str,
        name: String,
    },

    /// Host store rejected or failed the request
    #[error("host store error: {0}")]
    Store(String),

    /// HTTP request to the host store failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GanttError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::PermissionDenied(_) => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Store(_) | Self::Http(_) => StatusCode::BAD_GATEWAY,
            Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short message safe to show to the widget user. Store and transport
    /// detail stays in the server log.
    fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::PermissionDenied(_) => {
                "You do not have permission to perform this action".to_string()
            }
            Self::NotFound { doctype, name } => format!("{doctype} {name} not found"),
            Self::Store(_) | Self::Http(_) | Self::Serialization(_) => {
                "Error talking to the project store. Please try again later".to_string()
            }
        }
    }
}

impl IntoResponse for GanttError {
    fn into_response(self) -> Response {
        error!(error = %self, "request failed");
        let body = Json(json!({
            "status": "error",
            "message": self.user_message(),
        }));
        (self.status_code(), body).into_response()
    }
}

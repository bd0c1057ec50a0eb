//! Error types for Switchboard
//!
//! Request-time failures are translated into fixed JSON envelopes at the
//! response boundary; internal details are logged, never leaked to callers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::auth::CredentialError;

/// Errors surfaced while handling a proxied request
#[derive(Debug, Error)]
pub enum AppError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("credential acquisition failed: {0}")]
    Credential(#[from] CredentialError),

    #[error("upstream transport failure: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::UnknownProvider(name) => {
                warn!(provider = %name, "Rejected request for unknown provider");
                (StatusCode::NOT_FOUND, json!({"error": "Unknown provider"}))
            }
            AppError::Credential(e) => {
                error!(error = %e, "Credential acquisition failed");
                (StatusCode::BAD_GATEWAY, json!({"error": "Upstream failure"}))
            }
            AppError::Upstream(e) => {
                error!(error = %e, "Failed to reach upstream");
                (StatusCode::BAD_GATEWAY, json!({"error": "Upstream failure"}))
            }
            AppError::Internal(e) => {
                error!(error = %e, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": "Internal error"}),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

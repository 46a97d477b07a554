use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::pricing::store::StoreError;

/// Application error types
///
/// Extraction never produces these; they cover the request envelope only.
#[derive(Debug)]
pub enum AppError {
    /// Unknown provider in the request path
    ProviderNotFound(String),
    /// Request deadline exceeded
    Timeout(String),
    /// Raw pricing store unreachable
    StoreUnavailable(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProviderNotFound(msg) => write!(f, "Provider not found: {}", msg),
            Self::Timeout(msg) => write!(f, "Timed out: {}", msg),
            Self::StoreUnavailable(msg) => write!(f, "Pricing store unavailable: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::ProviderNotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Timeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg.clone()),
            Self::StoreUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "type": error_type_name(&self),
            }
        }));

        (status, body).into_response()
    }
}

fn error_type_name(error: &AppError) -> &'static str {
    match error {
        AppError::ProviderNotFound(_) => "provider_not_found",
        AppError::Timeout(_) => "timeout",
        AppError::StoreUnavailable(_) => "store_unavailable",
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::outreach::json_extract::OutputParseError;
use crate::outreach::validation::SchemaValidationError;
use crate::scrape::FetchError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// The status separates "your input was bad" (4xx), "the target site is bad"
/// (502) and "our pipeline is bad" (500).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        details: Vec<String>,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error(transparent)]
    OutputParse(#[from] OutputParseError),

    #[error(transparent)]
    SchemaValidation(#[from] SchemaValidationError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Configuration(msg) => AppError::Configuration(msg),
            other => AppError::Provider(other.to_string()),
        }
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String, Vec<String>) {
        match self {
            AppError::Validation { message, details } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                message.clone(),
                details.clone(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), vec![]),
            AppError::Fetch(e) => (
                StatusCode::BAD_GATEWAY,
                "scrape_failed",
                e.to_string(),
                vec!["Check that the company website URL is correct and reachable.".to_string()],
            ),
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "configuration_error",
                    "The generation backend is not configured".to_string(),
                    vec![],
                )
            }
            AppError::Provider(msg) => {
                tracing::error!("Provider error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "provider_error",
                    "The generation backend call failed".to_string(),
                    vec![],
                )
            }
            AppError::OutputParse(e) => {
                tracing::error!("Output parse error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "agent_error",
                    e.to_string(),
                    e.details(),
                )
            }
            AppError::SchemaValidation(e) => {
                tracing::error!("Schema validation error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "schema_validation_error",
                    format!("{} agent output did not match its schema", e.stage),
                    e.details.clone(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal server error occurred".to_string(),
                    vec![],
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
                "details": details
            }
        }));

        (status, body).into_response()
    }
}

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::flow::{InvocationFailure, ValidationStage};

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Flow(#[from] InvocationFailure),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl AppError {
    fn flow_parts(failure: &InvocationFailure) -> (StatusCode, &'static str) {
        match failure {
            InvocationFailure::MissingCredential { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "MISSING_CREDENTIAL")
            }
            InvocationFailure::ValidationFailed {
                stage: ValidationStage::Input,
                ..
            } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            InvocationFailure::ValidationFailed {
                stage: ValidationStage::Output,
                ..
            } => (StatusCode::BAD_GATEWAY, "MODEL_OUTPUT_INVALID"),
            InvocationFailure::ModelUnavailable { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "MODEL_UNAVAILABLE")
            }
            InvocationFailure::ModelRefused { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "MODEL_REFUSED")
            }
            InvocationFailure::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "MODEL_TIMEOUT"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Flow(failure) => {
                let (status, code) = Self::flow_parts(failure);
                if status.is_server_error() {
                    tracing::error!(flow = failure.flow(), "Flow failed: {failure}");
                }
                (status, code, failure.user_message())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
        };

        // Field-level detail is only returned for the caller's own input.
        let body = match &self {
            AppError::Flow(InvocationFailure::ValidationFailed {
                stage: ValidationStage::Input,
                errors,
                ..
            }) => json!({
                "error": {
                    "code": code,
                    "message": message,
                    "fields": errors
                }
            }),
            _ => json!({
                "error": {
                    "code": code,
                    "message": message
                }
            }),
        };

        (status, Json(body)).into_response()
    }
}

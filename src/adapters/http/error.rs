//! JSON error responses shared by every endpoint.

use std::collections::HashMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::application::StartSessionError;
use crate::domain::conversation::SubmitRejected;
use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};
use crate::ports::CatalogError;

/// Standard error body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub details: HashMap<String, String>,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }
}

impl From<DomainError> for ErrorResponse {
    fn from(err: DomainError) -> Self {
        Self {
            error_code: err.code.to_string(),
            message: err.message,
            details: err.details,
        }
    }
}

/// Error wrapper that converts domain errors into HTTP responses.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.code {
            ErrorCode::ValidationFailed | ErrorCode::EmptyField | ErrorCode::InvalidFormat => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::SessionNotFound
            | ErrorCode::PersonaNotFound
            | ErrorCode::CategoryNotFound
            | ErrorCode::ConceptNotFound => StatusCode::NOT_FOUND,
            ErrorCode::TurnInFlight => StatusCode::CONFLICT,
            ErrorCode::CatalogError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }
        (status, Json(ErrorResponse::from(self.0))).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        Self(err.into())
    }
}

impl From<StartSessionError> for ApiError {
    fn from(err: StartSessionError) -> Self {
        Self(err.into())
    }
}

impl From<SubmitRejected> for ApiError {
    fn from(err: SubmitRejected) -> Self {
        Self(err.into())
    }
}

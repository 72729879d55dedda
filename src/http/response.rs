//! Response envelope and error mapping for the HTTP API.
//!
//! Every body has the shape `{success, message | error, data?, count?, status}`.

use std::any::Any;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::user_actor::UserError;
use crate::validation::InvalidField;

/// Successful response body.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub status: u16,
    #[serde(skip)]
    code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            count: None,
            timestamp: None,
            status: code.as_u16(),
            code,
        }
    }

    pub fn with_data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.code, Json(self)).into_response()
    }
}

/// Result type for HTTP handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Everything a request can fail with, as seen by the caller.
#[derive(Debug, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    #[error("{0}")]
    Validation(#[from] InvalidField),

    #[error("Invalid JSON body")]
    InvalidBody,

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Invalid user ID format")]
    InvalidUserId,

    #[error("Email already exists")]
    DuplicateEmail,

    #[error("User not found")]
    UserNotFound,

    #[error("Endpoint not found")]
    EndpointNotFound,

    // ==================
    // Server Errors (5xx)
    // ==================
    /// The detail is logged, never sent.
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::InvalidBody
            | ApiError::InvalidUserId
            | ApiError::DuplicateEmail => StatusCode::BAD_REQUEST,
            ApiError::UserNotFound | ApiError::EndpointNotFound => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => ApiError::UserNotFound,
            UserError::DuplicateEmail(_) => ApiError::DuplicateEmail,
            UserError::ActorCommunicationError(detail) => ApiError::Internal(detail),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub status: u16,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            success: false,
            error: err.to_string(),
            status: err.status_code().as_u16(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            error!(error = %detail, "Request failed with internal error");
        }
        let status = self.status_code();
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}

/// Renders a panic raised inside a handler as the generic 500 body.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else {
        "handler panicked".to_string()
    };
    ApiError::Internal(detail).into_response()
}

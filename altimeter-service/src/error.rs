//! Mapping of request failures to HTTP responses.

use std::any::Any;
use std::collections::BTreeMap;

use altimeter::BackendError;
use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Message of every 404.
pub const NOT_FOUND_MESSAGE: &str = "The resource could not be found. Use GET /altitude instead.";

/// Message returned for faults whose details stay in the server log.
pub const INTERNAL_MESSAGE: &str = "An error occured. check the log file on the server.";

/// Validation messages keyed by parameter name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Body of every non-validation error.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: u16,
    pub title: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: status.as_u16(),
            title: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }
}

/// A request that ends in an error response.
#[derive(Debug)]
pub enum ApiError {
    /// No route for this method and path.
    RouteNotFound,
    /// `lat` / `lng` missing or not numbers.
    Validation(FieldErrors),
    /// The backend failed the lookup.
    Upstream(BackendError),
    /// A request-level HTTP failure, e.g. an unreadable form body.
    Http { status: StatusCode, message: String },
    /// Anything else. The detail is logged, never sent.
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(BackendError::Declared { status, .. }) => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            ApiError::Upstream(BackendError::Other(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Http { status, .. } => *status,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        ApiError::Upstream(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            ApiError::RouteNotFound => {
                tracing::debug!("Route not found");
                (status, Json(ErrorResponse::new(status, NOT_FOUND_MESSAGE))).into_response()
            }
            ApiError::Validation(errors) => {
                tracing::debug!(?errors, "Invalid parameters");
                (status, Json(errors)).into_response()
            }
            ApiError::Upstream(BackendError::Declared { message, .. }) => {
                tracing::error!(
                    status = status.as_u16(),
                    error = %message,
                    "Backend lookup failed"
                );
                (status, Json(ErrorResponse::new(status, message))).into_response()
            }
            ApiError::Upstream(BackendError::Other(e)) => {
                tracing::error!(error = %e, "Backend lookup failed");
                internal_response()
            }
            ApiError::Http { message, .. } => {
                tracing::debug!(status = status.as_u16(), error = %message, "Rejected request");
                (status, Json(ErrorResponse::new(status, message))).into_response()
            }
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "Internal error");
                internal_response()
            }
        }
    }
}

fn internal_response() -> Response {
    let status = StatusCode::INTERNAL_SERVER_ERROR;
    (status, Json(ErrorResponse::new(status, INTERNAL_MESSAGE))).into_response()
}

/// Panic handler for `CatchPanicLayer`.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    tracing::error!(panic = %detail, "Request handler panicked");

    let body = serde_json::to_vec(&ErrorResponse::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        INTERNAL_MESSAGE,
    ))
    .unwrap_or_default();

    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

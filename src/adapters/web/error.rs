//! HTTP error responses for the web adapter.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::domain::error::TradesimError;

/// An error rendered as `{"error": message}` with `status`.
#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

pub fn status_from_error(err: &TradesimError) -> StatusCode {
    match err {
        TradesimError::ConfigMissing { .. }
        | TradesimError::ConfigInvalid { .. }
        | TradesimError::ConfigParse { .. } => StatusCode::BAD_REQUEST,
        TradesimError::NoData { .. } => StatusCode::NOT_FOUND,
        TradesimError::DataFormat { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        TradesimError::Database { .. }
        | TradesimError::DatabaseQuery { .. }
        | TradesimError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<TradesimError> for WebError {
    fn from(err: TradesimError) -> Self {
        Self::new(status_from_error(&err), err.to_string())
    }
}

impl From<JsonRejection> for WebError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = %self.message, "request failed");
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

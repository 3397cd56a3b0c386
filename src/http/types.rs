//! JSON shapes and status mapping shared by the HTTP handlers.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::error::TodoError;

/// Body of every non-success response: `{"error": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError { pub error: String }

impl ApiError {
    pub fn new(error: impl Into<String>) -> Self { Self { error: error.into() } }

    pub fn with_status(self, status: StatusCode) -> Response { (status, Json(self)).into_response() }
}

/// `axum::Json` whose rejection is reported as a [`TodoError::InvalidBody`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(TodoError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for TodoError {
    fn from(rejection: JsonRejection) -> Self {
        TodoError::InvalidBody(rejection.body_text())
    }
}

/// `axum::extract::Path` whose rejection (e.g. an id that is not valid UTF-8)
/// is reported as a [`TodoError::InvalidIdentifier`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(TodoError))]
pub struct ApiPath<T>(pub T);

impl From<PathRejection> for TodoError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("path rejected: {}", rejection.body_text());
        TodoError::InvalidIdentifier
    }
}

fn status_for(error: &TodoError) -> StatusCode {
    match error {
        TodoError::InvalidIdentifier
        | TodoError::MissingTitle
        | TodoError::EmptyTitle
        | TodoError::InvalidBody(_) => StatusCode::BAD_REQUEST,
        TodoError::NotFound => StatusCode::NOT_FOUND,
        TodoError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for TodoError {
    fn into_response(self) -> Response {
        // The cause stays in the log; clients only see the generic message.
        if self.is_client_error() {
            tracing::debug!(error = %self, "request rejected");
        } else if let TodoError::Storage { operation, source } = &self {
            tracing::error!(%operation, "storage failure: {source:#}");
        }
        ApiError::new(self.to_string()).with_status(status_for(&self))
    }
}

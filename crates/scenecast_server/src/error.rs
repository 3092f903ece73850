//! API error types and HTTP response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use scenecast_render::RenderError;
use scenecast_storage::StoreError;
use serde::{Deserialize, Serialize};

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// JSON error body
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiErrorBody {
    /// Client-facing message
    pub error: String,
    /// Engine or store output, when there is any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// HTTP API error
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    details: Option<String>,
}

impl ApiError {
    /// 401 with the fixed `Unauthorized` message
    #[must_use]
    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    /// 400
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 500
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Attach details
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Returns the HTTP status code for this error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the client-facing message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the details, if any
    #[must_use]
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ApiErrorBody {
                error: self.message,
                details: self.details,
            }),
        )
            .into_response()
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Timeout { .. } => Self::internal("Manim rendering timed out"),
            RenderError::Failed { stderr, .. } => {
                Self::internal("Manim execution failed").with_details(stderr)
            }
            RenderError::Spawn { program, reason } => Self::internal("Failed to start renderer")
                .with_details(format!("{program}: {reason}")),
            RenderError::OutputMissing { .. } => Self::internal("Rendered video file not found."),
            RenderError::Io { reason } => Self::internal("Render workspace error").with_details(reason),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::internal("Upload failed").with_details(err.to_string())
    }
}

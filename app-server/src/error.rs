//! HTTP error responses.
//!
//! Every failure leaves the server as `{"error": ..., "details": ..., "stage": ...}`,
//! with `details` and `stage` omitted when absent.

use std::fmt;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use toolsmith_completions::CompletionError;
use toolsmith_tool_gen::{SynthesisError, ToolError};
use tracing::error;

/// An error returned to an HTTP client.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<String>,
    pub stage: Option<&'static str>,
}

/// Result type alias for request handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details: None,
            stage: None,
        }
    }

    /// Attach a human-readable cause.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    /// The completion service failed while choosing a tool.
    pub fn llm(err: CompletionError) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, "LLM API failed").with_details(err.to_string())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{}: {details}", self.error),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<ToolError> for ApiError {
    fn from(err: ToolError) -> Self {
        let details = err.to_string();
        match err {
            ToolError::InvalidName(_) => {
                Self::bad_request("Invalid tool name").with_details(details)
            }
            ToolError::Rejected(_) => {
                Self::bad_request("Tool execution failed").with_details(details)
            }
            ToolError::ExecutionFailed(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Tool execution failed")
                    .with_details(details)
            }
            ToolError::Synthesis(err) => err.into(),
            ToolError::Storage(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Tool storage failed")
                    .with_details(details)
            }
        }
    }
}

impl From<SynthesisError> for ApiError {
    fn from(err: SynthesisError) -> Self {
        let status = match err {
            SynthesisError::Generation(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            stage: Some(err.stage()),
            ..Self::new(status, "Error generating tool").with_details(err.to_string())
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request("Invalid request body").with_details(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<&'static str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(status = self.status.as_u16(), "{self}");

        let body = ErrorBody {
            error: &self.error,
            details: self.details.as_deref(),
            stage: self.stage,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use toolsmith_tool_gen::StorageError;

    #[test]
    fn test_tool_error_statuses() {
        let cases = [
            (ToolError::InvalidName("a/b".into()), StatusCode::BAD_REQUEST, "Invalid tool name"),
            (ToolError::Rejected("nope".into()), StatusCode::BAD_REQUEST, "Tool execution failed"),
            (
                ToolError::ExecutionFailed("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "Tool execution failed",
            ),
            (
                ToolError::Synthesis(SynthesisError::Extraction),
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error generating tool",
            ),
            (
                ToolError::Synthesis(SynthesisError::Generation(
                    CompletionError::ProviderNotConfigured,
                )),
                StatusCode::BAD_GATEWAY,
                "Error generating tool",
            ),
        ];

        for (err, status, message) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.status, status);
            assert_eq!(api.error, message);
        }
    }

    #[test]
    fn test_rejection_details_are_verbatim() {
        let api: ApiError = ToolError::Rejected("Both parameters must be numbers.".into()).into();
        assert_eq!(api.details.as_deref(), Some("Both parameters must be numbers."));
        assert_eq!(api.stage, None);
    }

    #[test]
    fn test_synthesis_stage_is_reported() {
        let api: ApiError =
            SynthesisError::Persistence(StorageError::InvalidName("x".into())).into();
        assert_eq!(api.stage, Some("persistence"));

        let api: ApiError = SynthesisError::NotFound("Missing".into()).into();
        assert_eq!(api.stage, Some("not_found"));
    }
}

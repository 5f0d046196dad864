use std::borrow::Cow;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// HTTP error response representation.
///
/// Serialized as `{"error": "..."}`; the status code is carried alongside.
#[must_use = "error responses do nothing unless serialized"]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse<'a> {
    /// User-facing error message
    pub error: Cow<'a, str>,
    /// HTTP status code (not serialized in JSON)
    #[serde(skip, default = "default_status")]
    pub status: StatusCode,
}

fn default_status() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

impl<'a> ErrorResponse<'a> {
    // 4xx Client Errors
    pub const BAD_REQUEST: Self = Self::new("bad request", StatusCode::BAD_REQUEST);
    pub const MISSING_INPUT: Self = Self::new("missing input", StatusCode::BAD_REQUEST);
    pub const NOT_FOUND: Self = Self::new("not found", StatusCode::NOT_FOUND);
    pub const PAYLOAD_TOO_LARGE: Self =
        Self::new("payload too large", StatusCode::PAYLOAD_TOO_LARGE);
    pub const UNSUPPORTED_TYPE: Self = Self::new("unsupported file type", StatusCode::BAD_REQUEST);

    // 5xx Server Errors
    pub const INTERNAL_SERVER_ERROR: Self =
        Self::new("internal server error", StatusCode::INTERNAL_SERVER_ERROR);
    pub const OCR_FAILURE: Self =
        Self::new("ocr recognition failed", StatusCode::INTERNAL_SERVER_ERROR);
    pub const SERVICE_UNAVAILABLE: Self =
        Self::new("service unavailable", StatusCode::SERVICE_UNAVAILABLE);
    pub const STORAGE_FAILURE: Self =
        Self::new("file processing failed", StatusCode::INTERNAL_SERVER_ERROR);

    /// Creates a new error response.
    #[inline]
    pub const fn new(error: &'a str, status: StatusCode) -> Self {
        Self {
            error: Cow::Borrowed(error),
            status,
        }
    }

    /// Replaces the default message.
    pub fn with_error(mut self, error: impl Into<Cow<'a, str>>) -> Self {
        self.error = error.into();
        self
    }
}

impl Default for ErrorResponse<'_> {
    #[inline]
    fn default() -> Self {
        Self::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for ErrorResponse<'_> {
    #[inline]
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_only_the_message() {
        let response = ErrorResponse::MISSING_INPUT.with_error("no file provided");
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json, serde_json::json!({ "error": "no file provided" }));
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn default_is_internal_server_error() {
        let response = ErrorResponse::default();
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.error, "internal server error");
    }
}

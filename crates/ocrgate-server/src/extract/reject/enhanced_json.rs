//! Enhanced JSON extractor with improved error handling.
//!
//! This module provides [`Json`], an enhanced version of [`axum::Json`] whose
//! rejections become JSON `{"error"}` responses.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Json as AxumJson, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use derive_more::{Deref, DerefMut, From};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::handler::{Error, ErrorKind};

/// Enhanced JSON extractor with improved error handling.
///
/// Malformed bodies, missing content types and oversized payloads are all
/// reported with a short description of what went wrong.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Creates a new [`Json`] wrapper around the provided value.
    #[inline]
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    /// Returns the inner value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let extractor = <AxumJson<T> as FromRequest<S>>::from_request(req, state).await;
        extractor.map(|x| Self::new(x.0)).map_err(Into::into)
    }
}

impl<T> IntoResponse for Json<T>
where
    T: Serialize,
{
    #[inline]
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}

impl From<JsonRejection> for Error<'static> {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ErrorKind::PayloadTooLarge
                .with_message("request body too large")
                .with_context(rejection.body_text());
        }

        match rejection {
            JsonRejection::JsonDataError(err) => ErrorKind::BadRequest.with_message(format!(
                "invalid request data: {}",
                sanitize_error_message(&err.body_text())
            )),
            JsonRejection::JsonSyntaxError(err) => ErrorKind::BadRequest.with_message(format!(
                "invalid json syntax: {}",
                sanitize_error_message(&err.body_text())
            )),
            JsonRejection::MissingJsonContentType(_) => ErrorKind::BadRequest
                .with_message("request must have Content-Type set to 'application/json'"),
            JsonRejection::BytesRejection(err) => ErrorKind::BadRequest
                .with_message("failed to read request body")
                .with_context(err.body_text()),
            other => ErrorKind::InternalServerError
                .with_message("request processing failed")
                .with_context(other.body_text()),
        }
    }
}

/// Keeps rejection messages short enough to echo back to clients.
fn sanitize_error_message(message: &str) -> String {
    let lines = message.lines().take(3).collect::<Vec<_>>();
    lines.join(" ").chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_truncates_long_messages() {
        let long = "x".repeat(500);
        assert_eq!(sanitize_error_message(&long).len(), 200);

        let multiline = "a\nb\nc\nd";
        assert_eq!(sanitize_error_message(multiline), "a b c");
    }
}

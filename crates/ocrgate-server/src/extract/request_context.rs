//! Per-request identifier and timing.

use std::convert::Infallible;
use std::time::{Duration, Instant};

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jiff::Timestamp;
use uuid::Uuid;

use crate::middleware::REQUEST_ID_HEADER;
use crate::service::ArtifactKind;

/// Identifier and timing of one request.
///
/// The identifier reuses the `x-request-id` header when it holds a UUID so
/// handler logs line up with the HTTP trace.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: Uuid,
    started_at: Timestamp,
    started: Instant,
    kind: Option<ArtifactKind>,
}

impl RequestContext {
    /// Starts a context with the given identifier.
    pub fn new(request_id: Uuid) -> Self {
        Self {
            request_id,
            started_at: Timestamp::now(),
            started: Instant::now(),
            kind: None,
        }
    }

    /// Returns the request identifier.
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Wall-clock time at which the request was accepted.
    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    /// Time elapsed since the request was accepted.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Classified upload kind, once known.
    pub fn kind(&self) -> Option<ArtifactKind> {
        self.kind
    }

    /// Records the classified upload kind.
    pub fn set_kind(&mut self, kind: ArtifactKind) {
        self.kind = Some(kind);
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new(Uuid::new_v4())
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let request_id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok())
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self::new(request_id))
    }
}

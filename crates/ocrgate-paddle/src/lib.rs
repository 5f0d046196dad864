#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

//! # ocrgate-paddle
//!
//! HTTP client for PaddleX OCR serving pipelines.
//!
//! ## Features
//!
//! - **Client**: posts files or URLs to the pipeline's `/ocr` endpoint
//! - **Type Safety**: strongly-typed request and response envelopes
//! - **Observability**: structured logging with per-module tracing targets

use std::time::Duration;

/// Logging target for PaddleX client operations.
pub const PADDLEX_TARGET: &str = "ocrgate_paddle::client";

/// Logging target for OCR pipeline calls.
pub const PADDLEOCR_TARGET: &str = "ocrgate_paddle::ocr";

pub mod client;
mod types;

pub use client::{PdClient, PdConfig, PdConfigBuilder};
pub use types::{FileType, OcrOutput, OcrPageResult, OcrRequest, PrunedResult};

/// Result type for all PaddleX operations in this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error types for PaddleX operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP client errors (connection, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The pipeline returned an error envelope or a non-success status.
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code, or the envelope's `errorCode`
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Invalid or malformed API response
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Description of what's invalid
        message: String,
        /// Optional raw response body for debugging
        body: Option<String>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// Request timeout
    #[error("Request timed out after {timeout:?}")]
    Timeout {
        /// Duration before timeout occurred
        timeout: Duration,
    },

    /// Service unavailable
    #[error("Service unavailable: {message}")]
    ServiceUnavailable {
        /// Description of the unavailability
        message: String,
    },

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unsupported file format or operation
    #[error("Unsupported: {message}")]
    Unsupported {
        /// Description of what's unsupported
        message: String,
    },

    /// Invalid input data
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of what's invalid
        message: String,
    },
}

impl Error {
    /// Create an API error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(message: impl Into<String>, body: Option<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
            body,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(timeout: Duration) -> Self {
        Self::Timeout { timeout }
    }

    /// Create a service unavailable error
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    /// Create an unsupported error
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Get the HTTP status code if this is an HTTP/API error
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Error::Http(_) => "http",
            Error::Api { .. } => "api",
            Error::InvalidResponse { .. } => "invalid_response",
            Error::Serialization(_) => "serialization",
            Error::Config { .. } => "config",
            Error::Timeout { .. } => "timeout",
            Error::ServiceUnavailable { .. } => "service_unavailable",
            Error::Io(_) => "io",
            Error::Unsupported { .. } => "unsupported",
            Error::InvalidInput { .. } => "invalid_input",
        }
    }

    /// Check if this is a client-side error (programming/configuration issue)
    pub fn is_client_error(&self) -> bool {
        match self {
            Error::Config { .. }
            | Error::InvalidInput { .. }
            | Error::Unsupported { .. }
            | Error::Serialization(_)
            | Error::Io(_) => true,
            Error::Api { status, .. } => (400..500).contains(status) && *status != 429,
            _ => false,
        }
    }

    /// Check if this is a server-side error
    pub fn is_server_error(&self) -> bool {
        match self {
            Error::ServiceUnavailable { .. } => true,
            Error::Api { status, .. } => (500..600).contains(status),
            _ => false,
        }
    }
}

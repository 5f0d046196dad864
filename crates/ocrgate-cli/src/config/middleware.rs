//! Middleware configuration for the HTTP server.
//!
//! All middleware configs come from `ocrgate-server` and support both CLI
//! arguments and environment variables.
//!
//! # Example
//!
//! ```bash
//! ocrgate-cli --allowed-origins "https://example.com" --request-timeout 60
//! ```

use anyhow::{Context, anyhow};
use clap::Args;
use ocrgate_server::middleware::{BodyLimitConfig, CorsConfig, RecoveryConfig};
use serde::{Deserialize, Serialize};

use super::TRACING_TARGET_CONFIG;

/// Upper bound for the request timeout in seconds.
const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;

/// Middleware configuration combining CORS, body limit and recovery settings.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// CORS (Cross-Origin Resource Sharing) configuration.
    #[clap(flatten)]
    pub cors: CorsConfig,

    /// Request body size limit.
    #[clap(flatten)]
    pub body_limit: BodyLimitConfig,

    /// Recovery middleware configuration.
    ///
    /// Controls request timeout and panic recovery behavior.
    #[clap(flatten)]
    pub recovery: RecoveryConfig,
}

impl MiddlewareConfig {
    /// Validates middleware settings.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.cors.validate().context("invalid CORS configuration")?;

        if self.body_limit.max_upload_size == 0 {
            return Err(anyhow!("Maximum upload size must be at least 1 byte."));
        }

        if !(1..=MAX_REQUEST_TIMEOUT_SECS).contains(&self.recovery.request_timeout) {
            return Err(anyhow!(
                "Request timeout {} seconds is invalid. Must be between 1 and {} seconds.",
                self.recovery.request_timeout,
                MAX_REQUEST_TIMEOUT_SECS
            ));
        }

        Ok(())
    }

    /// Logs middleware configuration at info level.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            origins = ?self.cors.allowed_origins,
            credentials = self.cors.allow_credentials,
            max_age_secs = self.cors.max_age_seconds,
            "CORS configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            max_upload_size = self.body_limit.max_upload_size,
            request_timeout_secs = self.recovery.request_timeout,
            "Request limits configuration"
        );
    }
}

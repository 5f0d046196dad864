//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── server: ServerConfig          # Host, port, shutdown
//! ├── middleware: MiddlewareConfig  # CORS, body limit, recovery/timeouts
//! └── service: ServiceConfig        # PaddleX, concurrency, scratch space
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! ocrgate-cli --paddlex-url "http://paddlex:8080" --port 9000
//!
//! # Or via environment variables
//! PADDLEX_URL="http://paddlex:8080" PORT=9000 ocrgate-cli
//! ```

mod middleware;
mod server;

use std::process;

use anyhow::Context;
use clap::Parser;
pub use middleware::MiddlewareConfig;
use ocrgate_server::service::ServiceConfig;
use serde::{Deserialize, Serialize};
pub use server::ServerConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "ocrgate")]
#[command(about = "OCR gateway in front of a PaddleX serving pipeline")]
#[command(version)]
pub struct Cli {
    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// HTTP middleware configuration (CORS, body limit, timeouts).
    #[clap(flatten)]
    pub middleware: MiddlewareConfig,

    /// OCR engine and scratch space configuration.
    #[clap(flatten)]
    pub service: ServiceConfig,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded first so that clap's `env` lookups see its values.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    ///
    /// Reads `RUST_LOG`, falling back to `info`.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;
        self.middleware
            .validate()
            .context("invalid middleware configuration")?;
        self.service
            .validate()
            .context("invalid service configuration")?;
        Ok(())
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        Self::log_build_info();
        self.server.log();
        self.middleware.log();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            paddlex_url = %self.service.paddlex_url,
            paddlex_api_key = self.service.paddlex_api_key.is_some(),
            paddlex_timeout_secs = self.service.paddlex_timeout,
            paddlex_visualize = self.service.paddlex_visualize,
            ocr_max_concurrency = ?self.service.ocr_max_concurrency,
            scratch_dir = ?self.service.scratch_dir,
            image_order = ?self.service.image_order,
            "OCR service configuration"
        );
    }

    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use ocrgate_server::service::ImageOrder;

    use super::*;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "ocrgate",
            "--port",
            "9000",
            "--paddlex-url",
            "http://paddlex:8080",
            "--image-order",
            "numeric",
            "--ocr-max-concurrency",
            "2",
            "--allow-credentials",
            "false",
            "--request-timeout",
            "30",
        ])
        .unwrap();

        assert_eq!(cli.server.port, 9000);
        assert_eq!(cli.service.paddlex_url, "http://paddlex:8080");
        assert_eq!(cli.service.image_order, ImageOrder::Numeric);
        assert_eq!(cli.service.ocr_max_concurrency, Some(2));
        assert!(!cli.middleware.cors.allow_credentials);
        assert_eq!(cli.middleware.recovery.request_timeout, 30);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn invalid_values_fail_validation() {
        let cli = Cli::try_parse_from(["ocrgate", "--ocr-max-concurrency", "0"]).unwrap();
        assert!(cli.validate().is_err());

        let cli = Cli::try_parse_from(["ocrgate", "--port", "80"]).unwrap();
        assert!(cli.validate().is_err());
    }
}

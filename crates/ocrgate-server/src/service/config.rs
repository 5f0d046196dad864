//! Service configuration.

use std::path::PathBuf;
use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use ocrgate_paddle::{PdClient, PdConfig};
use serde::{Deserialize, Serialize};

use crate::service::{ImageOrder, OcrEngineHandle, ResultAssembler, ScratchSpace};
use crate::{Error, Result};

/// Default values for configuration options.
mod defaults {
    /// Default PaddleX serving endpoint for development.
    pub const PADDLEX_URL: &str = "http://127.0.0.1:8080";

    /// Default PaddleX request timeout in seconds.
    pub const PADDLEX_TIMEOUT_SECS: u64 = 120;
}

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    /// Base URL of the PaddleX OCR serving pipeline.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "PADDLEX_URL", default_value = defaults::PADDLEX_URL)
    )]
    pub paddlex_url: String,

    /// Bearer token sent to the PaddleX pipeline.
    #[cfg_attr(feature = "config", arg(long, env = "PADDLEX_API_KEY"))]
    #[serde(skip_serializing)]
    pub paddlex_api_key: Option<String>,

    /// PaddleX request timeout in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "PADDLEX_TIMEOUT", default_value_t = defaults::PADDLEX_TIMEOUT_SECS)
    )]
    pub paddlex_timeout: u64,

    /// Whether PaddleX renders annotated page images.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "PADDLEX_VISUALIZE", default_value_t = true, action = clap::ArgAction::Set)
    )]
    pub paddlex_visualize: bool,

    /// Maximum number of concurrent OCR calls (unbounded when unset).
    #[cfg_attr(feature = "config", arg(long, env = "OCR_MAX_CONCURRENCY"))]
    pub ocr_max_concurrency: Option<usize>,

    /// Directory under which request workspaces are created.
    ///
    /// Defaults to the system temporary directory.
    #[cfg_attr(feature = "config", arg(long, env = "SCRATCH_DIR"))]
    pub scratch_dir: Option<PathBuf>,

    /// Order of annotation images in upload responses.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "IMAGE_ORDER", value_enum, default_value_t = ImageOrder::Lexicographic)
    )]
    pub image_order: ImageOrder,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            paddlex_url: defaults::PADDLEX_URL.to_owned(),
            paddlex_api_key: None,
            paddlex_timeout: defaults::PADDLEX_TIMEOUT_SECS,
            paddlex_visualize: true,
            ocr_max_concurrency: None,
            scratch_dir: None,
            image_order: ImageOrder::default(),
        }
    }
}

impl ServiceConfig {
    /// Checks values that clap cannot validate on its own.
    pub fn validate(&self) -> Result<()> {
        if !(1..=600).contains(&self.paddlex_timeout) {
            return Err(Error::config(format!(
                "paddlex timeout must be between 1 and 600 seconds, got {}",
                self.paddlex_timeout
            )));
        }

        if self.ocr_max_concurrency == Some(0) {
            return Err(Error::config("ocr max concurrency must be at least 1"));
        }

        if let Some(dir) = &self.scratch_dir
            && !dir.is_dir()
        {
            return Err(Error::config(format!(
                "scratch directory '{}' does not exist",
                dir.display()
            )));
        }

        Ok(())
    }

    /// Returns the PaddleX request timeout as a Duration.
    pub fn paddlex_timeout(&self) -> Duration {
        Duration::from_secs(self.paddlex_timeout)
    }

    /// Builds the PaddleX client and wraps it in an engine handle.
    pub fn connect_engine(&self) -> Result<OcrEngineHandle> {
        let mut config = PdConfig::new(&self.paddlex_url)
            .map_err(invalid_paddlex_config)?
            .with_timeout(self.paddlex_timeout())
            .with_visualize(self.paddlex_visualize);

        if let Some(api_key) = &self.paddlex_api_key {
            config = config.with_api_key(api_key);
        }

        let client = PdClient::new(config).map_err(invalid_paddlex_config)?;
        Ok(OcrEngineHandle::new(client).with_max_concurrency(self.ocr_max_concurrency))
    }

    /// Returns the scratch space for request workspaces.
    pub fn scratch_space(&self) -> ScratchSpace {
        self.scratch_dir
            .as_ref()
            .map(ScratchSpace::new)
            .unwrap_or_default()
    }

    /// Returns the result assembler.
    pub fn result_assembler(&self) -> ResultAssembler {
        ResultAssembler::new(self.image_order)
    }
}

/// Startup faults from the PaddleX client are operator configuration errors.
fn invalid_paddlex_config(error: ocrgate_paddle::Error) -> Error {
    Error::config(format!("invalid paddlex configuration: {error}")).with_source(error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ServiceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.paddlex_timeout(), Duration::from_secs(120));
        assert_eq!(config.result_assembler().order(), ImageOrder::Lexicographic);
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let config = ServiceConfig {
            ocr_max_concurrency: Some(0),
            ..ServiceConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_scratch_dir_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let config = ServiceConfig {
            scratch_dir: Some(root.path().join("missing")),
            ..ServiceConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ServiceConfig {
            scratch_dir: Some(root.path().to_path_buf()),
            ..ServiceConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.scratch_space().root(), root.path());
    }

    #[test]
    fn invalid_paddlex_url_fails_to_connect() {
        let config = ServiceConfig {
            paddlex_url: "not a url".to_owned(),
            ..ServiceConfig::default()
        };
        let error = config.connect_engine().unwrap_err();
        assert_eq!(error.kind(), crate::ErrorKind::Config);
        assert!(error.message().starts_with("invalid paddlex configuration"));
        assert!(std::error::Error::source(&error).is_some());
    }
}

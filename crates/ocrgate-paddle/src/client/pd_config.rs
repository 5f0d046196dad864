//! Configuration for PaddleX HTTP client.

use std::time::Duration;

use url::Url;

use crate::{Error, Result};

/// Default request timeout; OCR on multi-page PDFs is slow.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for the PaddleX HTTP client.
///
/// # Examples
///
/// ```ignore
/// use ocrgate_paddle::PdConfig;
/// use std::time::Duration;
///
/// // Basic configuration
/// let config = PdConfig::new("http://localhost:8080")?;
///
/// // Advanced configuration
/// let config = PdConfig::builder()
///     .base_url("http://paddlex-service:8080")
///     .timeout(Duration::from_secs(60))
///     .api_key("my-secret-key")
///     .visualize(false)
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct PdConfig {
    /// Base URL of the PaddleX service, always ending with `/`
    base_url: Url,

    /// API key for authentication (if required)
    api_key: Option<String>,

    /// Request timeout duration
    timeout: Duration,

    /// User agent string for HTTP requests
    user_agent: String,

    /// Whether to verify SSL certificates
    verify_ssl: bool,

    /// Custom HTTP headers to include in all requests
    custom_headers: Vec<(String, String)>,

    /// Whether to request annotated images
    visualize: bool,
}

impl PdConfig {
    /// Create a new configuration with the given base URL and default settings.
    ///
    /// A path prefix such as `http://gateway/paddle` is kept; endpoint paths
    /// are resolved relative to it.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let mut base_url = Url::parse(base_url.as_ref()).map_err(|e| {
            Error::config(format!("Invalid base URL '{}': {}", base_url.as_ref(), e))
        })?;

        if base_url.cannot_be_a_base() {
            return Err(Error::config(format!(
                "Base URL '{}' cannot be used as a base",
                base_url
            )));
        }

        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("ocrgate-paddle/{}", env!("CARGO_PKG_VERSION")),
            verify_ssl: true,
            custom_headers: Vec::new(),
            visualize: true,
        })
    }

    /// Create a new configuration builder.
    pub fn builder() -> PdConfigBuilder {
        PdConfigBuilder::default()
    }

    /// Get the base URL of the PaddleX service.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an endpoint path against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::config(format!("Failed to construct '{}' URL: {}", path, e)))
    }

    /// Get the API key (if configured).
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Get the request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get the user agent string.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Get whether SSL verification is enabled.
    pub fn verify_ssl(&self) -> bool {
        self.verify_ssl
    }

    /// Get custom headers.
    pub fn custom_headers(&self) -> &[(String, String)] {
        &self.custom_headers
    }

    /// Get whether annotated images are requested.
    pub fn visualize(&self) -> bool {
        self.visualize
    }

    /// Set the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set whether to verify SSL certificates.
    pub fn with_verify_ssl(mut self, verify: bool) -> Self {
        self.verify_ssl = verify;
        self
    }

    /// Add a custom header to all requests.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.push((key.into(), value.into()));
        self
    }

    /// Set whether annotated images are requested.
    pub fn with_visualize(mut self, visualize: bool) -> Self {
        self.visualize = visualize;
        self
    }
}

/// Builder for [`PdConfig`].
#[derive(Debug, Default)]
pub struct PdConfigBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    verify_ssl: Option<bool>,
    custom_headers: Vec<(String, String)>,
    visualize: Option<bool>,
}

impl PdConfigBuilder {
    /// Set the base URL of the PaddleX service.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the API key for authentication.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Set whether to verify SSL certificates.
    pub fn verify_ssl(mut self, verify: bool) -> Self {
        self.verify_ssl = Some(verify);
        self
    }

    /// Add a custom header to all requests.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.push((key.into(), value.into()));
        self
    }

    /// Set whether annotated images are requested.
    pub fn visualize(mut self, visualize: bool) -> Self {
        self.visualize = Some(visualize);
        self
    }

    /// Build the configuration.
    ///
    /// Returns an error if the base URL is not set or is invalid.
    pub fn build(self) -> Result<PdConfig> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::config("Base URL is required"))?;

        let mut config = PdConfig::new(base_url)?;

        if let Some(api_key) = self.api_key {
            config = config.with_api_key(api_key);
        }

        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }

        if let Some(user_agent) = self.user_agent {
            config = config.with_user_agent(user_agent);
        }

        if let Some(verify_ssl) = self.verify_ssl {
            config = config.with_verify_ssl(verify_ssl);
        }

        if let Some(visualize) = self.visualize {
            config = config.with_visualize(visualize);
        }

        for (key, value) in self.custom_headers {
            config = config.with_header(key, value);
        }

        Ok(config)
    }
}

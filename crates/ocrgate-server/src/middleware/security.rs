//! Security middleware: CORS and request body limits.

use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::http::header::HeaderName;
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::{Error, Result};

/// Tracing target for security middleware.
const TRACING_TARGET: &str = "ocrgate_server::middleware::security";

/// Default values for configuration options.
mod defaults {
    /// Preflight cache lifetime in seconds.
    pub const CORS_MAX_AGE_SECS: u64 = 3600;

    /// Largest accepted request body (100 MiB).
    pub const MAX_UPLOAD_SIZE: usize = 100 * 1024 * 1024;
}

/// Extension trait for `axum::`[`Router`] to apply security middleware.
pub trait RouterSecurityExt<S> {
    /// Layers the CORS policy and the request body limit.
    ///
    /// Bodies over the limit are rejected by the extractors with a JSON
    /// `413` response.
    fn with_security(self, cors: &CorsConfig, body_limit: &BodyLimitConfig) -> Self;

    /// Layers security middlewares with default configurations.
    fn with_default_security(self) -> Self;
}

impl<S> RouterSecurityExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_security(self, cors: &CorsConfig, body_limit: &BodyLimitConfig) -> Self {
        tracing::debug!(
            target: TRACING_TARGET,
            origins = ?cors.allowed_origins,
            allow_credentials = cors.allow_credentials,
            max_upload_size = body_limit.max_upload_size,
            "applying security middleware"
        );

        self.layer(DefaultBodyLimit::max(body_limit.max_upload_size))
            .layer(cors.to_layer())
    }

    fn with_default_security(self) -> Self {
        self.with_security(&CorsConfig::default(), &BodyLimitConfig::default())
    }
}

/// CORS (Cross-Origin Resource Sharing) configuration.
///
/// With no configured origins the request origin, method and headers are
/// mirrored back, which accepts any caller while still allowing credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct CorsConfig {
    /// List of allowed CORS origins.
    ///
    /// If empty, any origin is accepted.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CORS_ORIGINS", value_delimiter = ',')
    )]
    pub allowed_origins: Vec<String>,

    /// Maximum age for CORS preflight requests in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CORS_MAX_AGE", default_value_t = defaults::CORS_MAX_AGE_SECS)
    )]
    pub max_age_seconds: u64,

    /// Whether to allow credentials in CORS requests.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CORS_ALLOW_CREDENTIALS", default_value_t = true, action = clap::ArgAction::Set)
    )]
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_age_seconds: defaults::CORS_MAX_AGE_SECS,
            allow_credentials: true,
        }
    }
}

impl CorsConfig {
    /// Returns the CORS max age as a Duration.
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_seconds)
    }

    /// Rejects origins that are not valid header values.
    pub fn validate(&self) -> Result<()> {
        match self
            .allowed_origins
            .iter()
            .find(|origin| HeaderValue::from_str(origin).is_err())
        {
            Some(origin) => Err(Error::config(format!("invalid cors origin '{}'", origin))),
            None => Ok(()),
        }
    }

    /// Builds the CORS layer.
    pub fn to_layer(&self) -> CorsLayer {
        let origins = if self.allowed_origins.is_empty() {
            AllowOrigin::mirror_request()
        } else {
            AllowOrigin::list(
                self.allowed_origins
                    .iter()
                    .filter_map(|origin| origin.parse::<HeaderValue>().ok()),
            )
        };

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .expose_headers([HeaderName::from_static("x-request-id")])
            .allow_credentials(self.allow_credentials)
            .max_age(self.max_age())
    }
}

/// Request body size configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct BodyLimitConfig {
    /// Maximum request body size in bytes, uploads included.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "MAX_UPLOAD_SIZE", default_value_t = defaults::MAX_UPLOAD_SIZE)
    )]
    pub max_upload_size: usize,
}

impl Default for BodyLimitConfig {
    fn default() -> Self {
        Self {
            max_upload_size: defaults::MAX_UPLOAD_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{StatusCode, header};
    use axum::routing::post;
    use axum_test::TestServer;
    use axum_test::multipart::{MultipartForm, Part};
    use bytes::Bytes;
    use serde_json::json;

    use super::*;
    use crate::extract::{Json, Multipart};
    use crate::handler::Result as HandlerResult;

    async fn echo(Json(body): Json<serde_json::Value>) -> Json<serde_json::Value> {
        Json(body)
    }

    async fn upload(Multipart(mut multipart): Multipart) -> HandlerResult<String> {
        let mut total = 0;
        while let Some(field) = multipart.next_field().await? {
            total += field.bytes().await?.len();
        }
        Ok(total.to_string())
    }

    fn server(cors: &CorsConfig, limit: usize) -> anyhow::Result<TestServer> {
        let router = Router::new()
            .route("/echo", post(echo))
            .route("/upload", post(upload))
            .with_security(cors, &BodyLimitConfig { max_upload_size: limit });
        Ok(TestServer::new(router)?)
    }

    #[test]
    fn default_config() {
        let config = CorsConfig::default();
        assert!(config.allowed_origins.is_empty());
        assert!(config.allow_credentials);
        assert_eq!(config.max_age(), Duration::from_secs(3600));
        assert!(config.validate().is_ok());
        assert_eq!(BodyLimitConfig::default().max_upload_size, 104_857_600);
    }

    #[test]
    fn invalid_origin_is_rejected() {
        let config = CorsConfig {
            allowed_origins: vec!["https://ok.example".into(), "bad\norigin".into()],
            ..CorsConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn empty_origin_list_mirrors_caller() -> anyhow::Result<()> {
        let server = server(&CorsConfig::default(), 1024)?;

        let response = server
            .post("/echo")
            .add_header(header::ORIGIN, HeaderValue::from_static("https://app.example"))
            .json(&json!({ "a": 1 }))
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.header(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            "https://app.example"
        );
        assert_eq!(
            response.header(header::ACCESS_CONTROL_ALLOW_CREDENTIALS),
            "true"
        );
        Ok(())
    }

    #[tokio::test]
    async fn explicit_origin_list_filters_callers() -> anyhow::Result<()> {
        let cors = CorsConfig {
            allowed_origins: vec!["https://app.example".into()],
            ..CorsConfig::default()
        };
        let server = server(&cors, 1024)?;

        let response = server
            .post("/echo")
            .add_header(header::ORIGIN, HeaderValue::from_static("https://evil.example"))
            .json(&json!({ "a": 1 }))
            .await;

        assert!(
            response
                .maybe_header(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );
        Ok(())
    }

    #[tokio::test]
    async fn oversized_json_is_payload_too_large() -> anyhow::Result<()> {
        let server = server(&CorsConfig::default(), 16)?;

        let response = server
            .post("/echo")
            .json(&json!({ "padding": "x".repeat(64) }))
            .await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        response.assert_json(&json!({ "error": "request body too large" }));
        Ok(())
    }

    #[tokio::test]
    async fn oversized_upload_is_payload_too_large() -> anyhow::Result<()> {
        let server = server(&CorsConfig::default(), 64)?;

        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(Bytes::from(vec![0_u8; 1024]))
                .file_name("big.png")
                .mime_type("image/png"),
        );
        let response = server.post("/upload").multipart(form).await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        response.assert_json(&json!({ "error": "file exceeds the maximum upload size" }));
        Ok(())
    }
}

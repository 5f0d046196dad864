//! PaddleX HTTP client implementation.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, StatusCode};
use tracing::{debug, error, info, warn};

use crate::types::ApiResponse;
use crate::{
    Error, FileType, OcrOutput, OcrRequest, PADDLEOCR_TARGET, PADDLEX_TARGET, PdConfig, Result,
};

/// HTTP client for the PaddleX OCR pipeline.
///
/// # Examples
///
/// ```ignore
/// use ocrgate_paddle::{PdClient, PdConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), ocrgate_paddle::Error> {
///     let config = PdConfig::new("http://localhost:8080")?;
///     let client = PdClient::new(config)?;
///
///     let output = client.recognize_file("invoice.pdf").await?;
///     for page in &output.ocr_results {
///         println!("{}", page.rec_texts().join("\n"));
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PdClient {
    /// HTTP client
    http_client: Client,

    /// Configuration
    config: PdConfig,
}

impl PdClient {
    /// Create a new PaddleX client with the given configuration.
    pub fn new(config: PdConfig) -> Result<Self> {
        let mut client_builder = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent())
            .danger_accept_invalid_certs(!config.verify_ssl());

        let mut headers = reqwest::header::HeaderMap::new();
        for (key, value) in config.custom_headers() {
            let header_name = reqwest::header::HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| Error::config(format!("Invalid header name '{}': {}", key, e)))?;
            let header_value = reqwest::header::HeaderValue::from_str(value)
                .map_err(|e| Error::config(format!("Invalid header value '{}': {}", value, e)))?;
            headers.insert(header_name, header_value);
        }

        if let Some(api_key) = config.api_key() {
            let mut value = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| Error::config(format!("Invalid API key: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        if !headers.is_empty() {
            client_builder = client_builder.default_headers(headers);
        }

        let http_client = client_builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        debug!(
            target: PADDLEX_TARGET,
            base_url = %config.base_url(),
            timeout = ?config.timeout(),
            visualize = config.visualize(),
            "PaddleX client initialized"
        );

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Get a reference to the client configuration.
    pub fn config(&self) -> &PdConfig {
        &self.config
    }

    /// Run OCR on a local file.
    ///
    /// The file type is inferred from the extension; the contents are sent
    /// inline as base64.
    pub async fn recognize_file(&self, file_path: impl AsRef<Path>) -> Result<OcrOutput> {
        let file_path = file_path.as_ref();

        let extension = file_path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::invalid_input("File has no extension"))?;
        let file_type = FileType::from_extension(extension)?;

        let file_bytes = tokio::fs::read(file_path).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read file '{}': {}", file_path.display(), e),
            ))
        })?;

        info!(
            target: PADDLEOCR_TARGET,
            path = ?file_path,
            size = file_bytes.len(),
            file_type = ?file_type,
            "Recognizing local file"
        );

        self.recognize_bytes(&file_bytes, file_type).await
    }

    /// Run OCR on in-memory file contents.
    pub async fn recognize_bytes(
        &self,
        file_bytes: &[u8],
        file_type: FileType,
    ) -> Result<OcrOutput> {
        if file_bytes.is_empty() {
            return Err(Error::invalid_input("File is empty"));
        }

        let request = OcrRequest {
            file: STANDARD.encode(file_bytes),
            file_type: Some(file_type),
            visualize: self.config.visualize(),
        };

        self.execute(&request).await
    }

    /// Run OCR on a document the PaddleX server downloads itself.
    ///
    /// The file type is left for the server to infer from the URL.
    pub async fn recognize_url(&self, document_url: &str) -> Result<OcrOutput> {
        let document_url = url::Url::parse(document_url).map_err(|e| {
            Error::invalid_input(format!("Invalid document URL '{}': {}", document_url, e))
        })?;

        info!(
            target: PADDLEOCR_TARGET,
            url = %document_url,
            "Recognizing remote document"
        );

        let request = OcrRequest {
            file: document_url.into(),
            file_type: None,
            visualize: self.config.visualize(),
        };

        self.execute(&request).await
    }

    /// Send an OCR request and unwrap the envelope.
    async fn execute(&self, request: &OcrRequest) -> Result<OcrOutput> {
        let url = self.config.endpoint("ocr")?;

        debug!(
            target: PADDLEOCR_TARGET,
            url = %url,
            payload_len = request.file.len(),
            "Sending request to PaddleX"
        );

        let response = self
            .http_client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let output = self.handle_response(response).await.inspect_err(|e| {
            error!(
                target: PADDLEX_TARGET,
                category = e.category(),
                error = %e,
                "OCR request failed"
            );
        })?;

        debug!(
            target: PADDLEOCR_TARGET,
            pages = output.ocr_results.len(),
            "OCR request completed"
        );

        Ok(output)
    }

    fn map_transport_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::timeout(self.config.timeout())
        } else {
            Error::Http(error)
        }
    }

    /// Handle HTTP response and convert to result.
    async fn handle_response(&self, response: reqwest::Response) -> Result<OcrOutput> {
        let status = response.status();

        debug!(
            target: PADDLEX_TARGET,
            status = status.as_u16(),
            "Received response from PaddleX"
        );

        if status.is_success() {
            let body = response.text().await.map_err(|e| self.map_transport_error(e))?;
            let envelope: ApiResponse<OcrOutput> = serde_json::from_str(&body).map_err(|e| {
                Error::invalid_response(
                    format!("Failed to parse success response: {}", e),
                    Some(body.clone()),
                )
            })?;

            if envelope.error_code != 0 {
                return Err(Error::api(
                    u16::try_from(envelope.error_code).unwrap_or(500),
                    envelope
                        .error_msg
                        .unwrap_or_else(|| "Unknown error".to_string()),
                ));
            }

            return Ok(envelope.result.unwrap_or_else(|| {
                warn!(
                    target: PADDLEX_TARGET,
                    log_id = envelope.log_id.as_deref(),
                    "API returned success but no result"
                );
                OcrOutput::default()
            }));
        }

        let body_text = response.text().await.ok();

        let error = match status {
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
                Error::service_unavailable("Service temporarily unavailable")
            }
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                Error::timeout(self.config.timeout())
            }
            _ => match body_text.as_deref() {
                Some(body) => match serde_json::from_str::<ApiResponse<serde_json::Value>>(body) {
                    Ok(envelope) => Error::api(
                        status.as_u16(),
                        envelope
                            .error_msg
                            .unwrap_or_else(|| "Unknown error".to_string()),
                    ),
                    Err(_) => Error::api(status.as_u16(), body.to_string()),
                },
                None => Error::api(status.as_u16(), status.to_string()),
            },
        };

        Err(error)
    }

    /// Health check for the PaddleX service.
    pub async fn health_check(&self) -> Result<()> {
        let url = self.config.endpoint("health")?;

        debug!(target: PADDLEX_TARGET, url = %url, "Performing health check");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Error::service_unavailable(format!(
                "Health check failed with status {}",
                response.status()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    use super::*;

    /// Serves `router` on an ephemeral port and returns its base URL.
    async fn spawn_server(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client_for(base_url: &str) -> PdClient {
        PdClient::new(PdConfig::new(base_url).unwrap()).unwrap()
    }

    /// Echoes the request fields back as recognized text.
    async fn echo_ocr(Json(body): Json<Value>) -> Json<Value> {
        let file_type = body["fileType"].clone();
        let visualize = body["visualize"].clone();
        Json(json!({
            "logId": "test",
            "errorCode": 0,
            "errorMsg": "Success",
            "result": {
                "ocrResults": [{
                    "prunedResult": {
                        "rec_texts": [
                            body["file"].as_str().unwrap_or_default(),
                            file_type.to_string(),
                            visualize.to_string(),
                        ]
                    },
                    "ocrImage": STANDARD.encode(b"annotated"),
                }],
                "dataInfo": {}
            }
        }))
    }

    #[test]
    fn test_client_creation() {
        let config = PdConfig::new("http://localhost:8080")
            .unwrap()
            .with_timeout(Duration::from_secs(60))
            .with_api_key("test-key");

        let client = PdClient::new(config);
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_with_invalid_config() {
        let config = PdConfig::new("http://localhost:8080")
            .unwrap()
            .with_header("Invalid\nHeader", "value");

        let result = PdClient::new(config);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_recognize_url_leaves_file_type_to_server() {
        let base = spawn_server(Router::new().route("/ocr", post(echo_ocr))).await;
        let client = client_for(&base);

        let output = client
            .recognize_url("https://example.com/scan.png")
            .await
            .unwrap();

        let texts = output.ocr_results[0].rec_texts();
        assert_eq!(texts[0], "https://example.com/scan.png");
        assert_eq!(texts[1], "null");
        assert_eq!(texts[2], "true");
        assert_eq!(
            output.ocr_results[0].decode_ocr_image().unwrap().unwrap(),
            b"annotated"
        );
    }

    #[tokio::test]
    async fn test_recognize_file_sends_base64_contents() {
        let base = spawn_server(Router::new().route("/ocr", post(echo_ocr))).await;
        let client = client_for(&base);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.pdf");
        tokio::fs::write(&path, b"%PDF-1.7").await.unwrap();

        let output = client.recognize_file(&path).await.unwrap();
        let texts = output.ocr_results[0].rec_texts();
        assert_eq!(texts[0], STANDARD.encode(b"%PDF-1.7"));
        assert_eq!(texts[1], "0");
    }

    #[tokio::test]
    async fn test_recognize_file_rejects_unknown_extension() {
        let client = client_for("http://127.0.0.1:9");
        let err = client.recognize_file("notes.txt").await.unwrap_err();
        assert_eq!(err.category(), "unsupported");
    }

    #[tokio::test]
    async fn test_error_envelope_becomes_api_error() {
        let router = Router::new().route(
            "/ocr",
            post(|| async {
                (
                    axum::http::StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({
                        "logId": "x",
                        "errorCode": 422,
                        "errorMsg": "Invalid file",
                    })),
                )
            }),
        );
        let base = spawn_server(router).await;

        let err = client_for(&base)
            .recognize_url("https://example.com/a.png")
            .await
            .unwrap_err();

        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "Invalid file");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_nonzero_error_code_on_success_status() {
        let router = Router::new().route(
            "/ocr",
            post(|| async {
                Json(json!({
                    "logId": "x",
                    "errorCode": 500,
                    "errorMsg": "Inference failed",
                }))
            }),
        );
        let base = spawn_server(router).await;

        let err = client_for(&base)
            .recognize_url("https://example.com/a.png")
            .await
            .unwrap_err();

        assert!(err.is_server_error());
        assert!(err.to_string().contains("Inference failed"));
    }

    #[tokio::test]
    async fn test_health_check() {
        let healthy = spawn_server(Router::new().route("/health", get(|| async { "ok" }))).await;
        assert!(client_for(&healthy).health_check().await.is_ok());

        let unhealthy = spawn_server(Router::new()).await;
        let err = client_for(&unhealthy).health_check().await.unwrap_err();
        assert_eq!(err.category(), "service_unavailable");
    }
}

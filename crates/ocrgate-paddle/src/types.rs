//! Request and response envelopes of the PaddleX OCR serving API.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Kind of document sent to the pipeline, as encoded in `fileType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum FileType {
    /// Multi-page PDF document.
    Pdf,
    /// Single raster image.
    Image,
}

impl FileType {
    /// Returns the numeric code used by the serving API.
    pub const fn code(self) -> u8 {
        match self {
            Self::Pdf => 0,
            Self::Image => 1,
        }
    }

    /// Infers the file type from a file extension.
    pub fn from_extension(extension: &str) -> Result<Self> {
        match extension.to_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "png" | "jpg" | "jpeg" | "bmp" | "tif" | "tiff" | "webp" | "gif" => Ok(Self::Image),
            ext => Err(Error::unsupported(format!(
                "Unsupported file extension: {}",
                ext
            ))),
        }
    }
}

impl From<FileType> for u8 {
    fn from(value: FileType) -> Self {
        value.code()
    }
}

impl TryFrom<u8> for FileType {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Pdf),
            1 => Ok(Self::Image),
            other => Err(format!("unknown file type code {other}")),
        }
    }
}

/// Body of `POST /ocr`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrRequest {
    /// A URL reachable by the server, or the base64 file contents.
    pub file: String,
    /// `None` lets the server infer the type from the URL.
    pub file_type: Option<FileType>,
    /// Whether the server should render annotated images.
    pub visualize: bool,
}

/// Envelope returned by every PaddleX serving endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiResponse<T> {
    #[serde(default)]
    pub log_id: Option<String>,
    pub error_code: i64,
    #[serde(default)]
    pub error_msg: Option<String>,
    #[serde(default = "Option::default")]
    pub result: Option<T>,
}

/// Result of an OCR pipeline call.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrOutput {
    /// One entry per processed page, in document order.
    #[serde(default)]
    pub ocr_results: Vec<OcrPageResult>,
    /// Input description reported by the server (size, page count).
    #[serde(default)]
    pub data_info: serde_json::Value,
}

/// OCR output of a single page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrPageResult {
    /// Detection and recognition output with the heavy fields removed.
    #[serde(default)]
    pub pruned_result: PrunedResult,
    /// Base64 visualisation of the detected regions, if requested.
    #[serde(default)]
    pub ocr_image: Option<String>,
}

impl OcrPageResult {
    /// Returns the recognized text lines in reading order.
    pub fn rec_texts(&self) -> &[String] {
        &self.pruned_result.rec_texts
    }

    /// Decodes the annotated image, if the server rendered one.
    pub fn decode_ocr_image(&self) -> Result<Option<Vec<u8>>> {
        let Some(encoded) = self.ocr_image.as_deref() else {
            return Ok(None);
        };

        STANDARD
            .decode(encoded.trim())
            .map(Some)
            .map_err(|e| Error::invalid_response(format!("Invalid base64 image: {}", e), None))
    }
}

/// Subset of the pipeline's per-page result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrunedResult {
    /// Recognized text lines.
    #[serde(default)]
    pub rec_texts: Vec<String>,
    /// Recognition confidence per line.
    #[serde(default)]
    pub rec_scores: Vec<f32>,
}

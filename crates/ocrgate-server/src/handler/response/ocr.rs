use serde::{Deserialize, Serialize};

/// Body of a successful `POST /ocr_img_url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrText {
    /// Recognized lines across all pages.
    pub text: Vec<String>,
}

/// Body of a successful `POST /ocr`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrUpload {
    /// Recognized lines across all pages.
    pub result: Vec<String>,
    /// Seconds spent handling the request.
    pub detail_time: f64,
    /// Annotated pages as PNG data URIs.
    pub image_list: Vec<String>,
}

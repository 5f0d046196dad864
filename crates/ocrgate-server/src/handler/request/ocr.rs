use serde::{Deserialize, Serialize};

/// Body of `POST /ocr_img_url`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrImageUrl {
    /// Location of the image or PDF to recognize.
    #[serde(default)]
    pub image_url: Option<String>,
}

impl OcrImageUrl {
    /// Returns the URL unless it is absent or empty.
    pub fn url(&self) -> Option<&str> {
        self.image_url.as_deref().filter(|url| !url.is_empty())
    }
}

//! [`OcrEngine`] backed by a PaddleX serving pipeline.

use std::io::Cursor;

use async_trait::async_trait;
use image::ImageFormat;
use ocrgate_paddle::{OcrOutput, PdClient};

use super::{OcrEngine, OcrPage, OcrSource};
use crate::{Error, Result};

#[async_trait]
impl OcrEngine for PdClient {
    async fn recognize(&self, source: &OcrSource) -> Result<Vec<OcrPage>> {
        let output = match source {
            OcrSource::File { path, kind } => {
                let bytes = tokio::fs::read(path).await.map_err(|e| {
                    Error::file_system(format!("failed to read '{}'", path.display()))
                        .with_source(e)
                })?;
                self.recognize_bytes(&bytes, (*kind).into()).await?
            }
            OcrSource::Url(url) => self.recognize_url(url).await?,
        };

        tokio::task::spawn_blocking(move || into_pages(output))
            .await
            .map_err(|e| Error::internal("paddlex", format!("task join error: {e}")).with_source(e))?
    }

    async fn health_check(&self) -> Result<()> {
        PdClient::health_check(self).await.map_err(Into::into)
    }
}

fn into_pages(output: OcrOutput) -> Result<Vec<OcrPage>> {
    output
        .ocr_results
        .into_iter()
        .map(|result| {
            let page = OcrPage::new(result.rec_texts().to_vec());
            Ok(match result.decode_ocr_image()? {
                Some(raw) => page.with_annotation(encode_png(raw)?),
                None => page,
            })
        })
        .collect()
}

/// Converts a pipeline visualization (JPEG on the wire) to PNG.
fn encode_png(raw: Vec<u8>) -> Result<Vec<u8>> {
    if image::guess_format(&raw).ok() == Some(ImageFormat::Png) {
        return Ok(raw);
    }

    let decoded = image::load_from_memory(&raw).map_err(|e| {
        Error::external("paddlex", format!("undecodable ocr image: {e}")).with_source(e)
    })?;

    let mut png = Vec::new();
    decoded
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| Error::internal("paddlex", format!("png encoding failed: {e}")).with_source(e))?;

    Ok(png)
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use image::{DynamicImage, Rgb, RgbImage};

    use super::*;
    use crate::service::{ResultAssembler, ScratchSpace};

    const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn output(value: serde_json::Value) -> OcrOutput {
        serde_json::from_value(value).unwrap()
    }

    fn jpeg() -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([200, 30, 30])));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
            .unwrap();
        bytes
    }

    #[test]
    fn pages_keep_order_and_annotations() {
        let pages = into_pages(output(serde_json::json!({
            "ocrResults": [
                { "prunedResult": { "rec_texts": ["a", "b"] }, "ocrImage": STANDARD.encode(jpeg()) },
                { "prunedResult": { "rec_texts": ["c"] } }
            ]
        })))
        .unwrap();

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].recognized_texts(), ["a", "b"]);
        assert!(pages[0].has_annotation());
        assert_eq!(pages[1].recognized_texts(), ["c"]);
        assert!(!pages[1].has_annotation());
    }

    #[tokio::test]
    async fn jpeg_annotation_is_saved_as_png() {
        let jpeg = jpeg();
        assert!(jpeg.starts_with(&[0xFF, 0xD8, 0xFF]));

        let pages = into_pages(output(serde_json::json!({
            "ocrResults": [{ "prunedResult": { "rec_texts": ["x"] }, "ocrImage": STANDARD.encode(&jpeg) }]
        })))
        .unwrap();

        let root = tempfile::tempdir().unwrap();
        let workspace = ScratchSpace::new(root.path()).acquire().unwrap();
        let assembled = ResultAssembler::default()
            .assemble(&pages, &workspace)
            .await
            .unwrap();

        let saved = std::fs::read(workspace.path().join("1.png")).unwrap();
        assert!(saved.starts_with(PNG_SIGNATURE));
        assert_eq!(image::guess_format(&saved).unwrap(), ImageFormat::Png);

        let encoded = assembled.images[0]
            .strip_prefix("data:image/png;base64,")
            .unwrap();
        assert!(STANDARD.decode(encoded).unwrap().starts_with(PNG_SIGNATURE));
    }

    #[test]
    fn png_annotation_is_kept_as_is() {
        let jpeg = jpeg();
        let png = encode_png(jpeg).unwrap();
        assert_eq!(encode_png(png.clone()).unwrap(), png);
    }

    #[test]
    fn corrupt_annotation_is_an_external_error() {
        let error = into_pages(output(serde_json::json!({
            "ocrResults": [{ "prunedResult": { "rec_texts": [] }, "ocrImage": "%%%" }]
        })))
        .unwrap_err();

        assert_eq!(error.kind(), crate::ErrorKind::External);
    }

    #[test]
    fn undecodable_annotation_is_an_external_error() {
        let error = into_pages(output(serde_json::json!({
            "ocrResults": [{ "prunedResult": { "rec_texts": [] }, "ocrImage": STANDARD.encode(b"\xFF\xD8\xFF\xE0 truncated") }]
        })))
        .unwrap_err();

        assert_eq!(error.kind(), crate::ErrorKind::External);
        assert!(error.message().contains("undecodable ocr image"));
    }
}

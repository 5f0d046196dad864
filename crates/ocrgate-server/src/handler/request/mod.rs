//! Request bodies.

mod ocr;

pub use ocr::OcrImageUrl;

//! Response bodies.

mod error_response;
mod monitors;
mod ocr;

pub use error_response::ErrorResponse;
pub use monitors::{HealthStatus, MonitorStatus};
pub use ocr::{OcrText, OcrUpload};

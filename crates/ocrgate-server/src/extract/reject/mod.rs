//! Enhanced request extractors with improved error handling.
//!
//! These are drop-in replacements for their standard axum counterparts whose
//! rejections are converted into the handler error type.

pub mod enhanced_json;
pub mod enhanced_multipart;

pub use self::enhanced_json::Json;
pub use self::enhanced_multipart::Multipart;

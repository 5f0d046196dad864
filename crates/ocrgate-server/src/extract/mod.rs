//! Enhanced HTTP request extractors with improved error handling.
//!
//! All extractors reject with [`handler::Error`] so that every failure is
//! rendered as a JSON `{"error"}` body.
//!
//! - [`Json`] - JSON deserialization with descriptive rejections
//! - [`Multipart`] - multipart parsing with size-limit aware rejections
//! - [`RequestContext`] - per-request identifier and timing
//!
//! [`handler::Error`]: crate::handler::Error

pub mod reject;
mod request_context;

pub use crate::extract::reject::{Json, Multipart};
pub use crate::extract::request_context::RequestContext;

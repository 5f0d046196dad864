//! PaddleX HTTP client module.
//!
//! This module provides the client interface for the OCR pipeline exposed by
//! PaddleX serving.

mod pd_client;
mod pd_config;

pub use pd_client::PdClient;
pub use pd_config::{PdConfig, PdConfigBuilder};

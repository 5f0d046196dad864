//! Application services and dependency injection.

mod assembler;
mod classifier;
mod config;
mod engine;
mod state;
mod workspace;

pub use crate::service::assembler::{Assembled, ImageOrder, ResultAssembler};
pub use crate::service::classifier::{ArtifactKind, UnsupportedType};
pub use crate::service::config::ServiceConfig;
#[cfg(any(test, feature = "test-utils"))]
pub use crate::service::engine::MockEngine;
pub use crate::service::engine::{OcrEngine, OcrEngineHandle, OcrPage, OcrSource};
pub use crate::service::state::ServiceState;
pub use crate::service::workspace::{ScratchSpace, Workspace};
// Re-export error types from crate root for convenience
pub use crate::{Error, ErrorKind, Result};

//! Application state and dependency injection.

use crate::service::{OcrEngineHandle, Result, ResultAssembler, ScratchSpace, ServiceConfig};

/// Tracing target for state initialization.
const TRACING_TARGET: &str = "ocrgate_server::service::state";

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    engine: OcrEngineHandle,
    scratch: ScratchSpace,
    assembler: ResultAssembler,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// Builds the engine client and probes it once; an unreachable engine is
    /// logged but does not prevent startup.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        config.validate()?;

        let engine = config.connect_engine()?;
        if let Err(error) = engine.health_check().await {
            tracing::warn!(
                target: TRACING_TARGET,
                error = %error,
                "ocr engine is not reachable yet"
            );
        }

        Ok(Self::new(
            engine,
            config.scratch_space(),
            config.result_assembler(),
        ))
    }

    /// Assembles state from already constructed services.
    pub fn new(engine: OcrEngineHandle, scratch: ScratchSpace, assembler: ResultAssembler) -> Self {
        Self {
            engine,
            scratch,
            assembler,
        }
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(engine: OcrEngineHandle);
impl_di!(scratch: ScratchSpace);
impl_di!(assembler: ResultAssembler);

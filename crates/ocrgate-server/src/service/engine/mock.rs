//! In-memory engine for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{OcrEngine, OcrPage, OcrSource};
use crate::{Error, Result};

/// Engine that returns canned pages and records every call.
///
/// Clones share the call log.
#[derive(Debug, Clone)]
pub struct MockEngine {
    outcome: Result<Vec<OcrPage>, String>,
    healthy: bool,
    calls: Arc<AtomicUsize>,
    sources: Arc<Mutex<Vec<OcrSource>>>,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::with_pages(Vec::new())
    }
}

impl MockEngine {
    /// Returns `pages` on every call.
    pub fn with_pages(pages: Vec<OcrPage>) -> Self {
        Self {
            outcome: Ok(pages),
            healthy: true,
            calls: Arc::default(),
            sources: Arc::default(),
        }
    }

    /// Fails every call with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
            ..Self::default()
        }
    }

    /// Makes the health check fail.
    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    /// Number of `recognize` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Sources passed to `recognize`, in call order.
    pub fn sources(&self) -> Vec<OcrSource> {
        self.sources
            .lock()
            .map(|sources| sources.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl OcrEngine for MockEngine {
    async fn recognize(&self, source: &OcrSource) -> Result<Vec<OcrPage>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut sources) = self.sources.lock() {
            sources.push(source.clone());
        }

        if let OcrSource::File { path, .. } = source
            && !path.is_file()
        {
            return Err(Error::file_system(format!(
                "staged file '{}' does not exist",
                path.display()
            )));
        }

        self.outcome
            .clone()
            .map_err(|message| Error::external("mock", message))
    }

    async fn health_check(&self) -> Result<()> {
        if self.healthy {
            Ok(())
        } else {
            Err(Error::external("mock", "engine unavailable"))
        }
    }
}

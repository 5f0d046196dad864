//! OCR engine seam.
//!
//! Handlers reach the engine only through [`OcrEngineHandle`], which wraps an
//! [`OcrEngine`] implementation built once at startup and carried in the
//! router state.

#[cfg(any(test, feature = "test-utils"))]
mod mock;
mod paddle;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Semaphore;

#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub use self::mock::MockEngine;
use crate::service::ArtifactKind;
use crate::{Error, Result};

/// Tracing target for engine calls.
const TRACING_TARGET: &str = "ocrgate_server::service::engine";

/// Document handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OcrSource {
    /// A file staged in a request workspace.
    File {
        /// Location of the staged artifact.
        path: PathBuf,
        /// Classified kind of the artifact.
        kind: ArtifactKind,
    },
    /// A remote document the engine fetches itself.
    Url(String),
}

/// OCR output of one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OcrPage {
    texts: Vec<String>,
    annotation: Option<Bytes>,
}

impl OcrPage {
    /// Creates a page from its recognized lines.
    pub fn new(texts: Vec<String>) -> Self {
        Self {
            texts,
            annotation: None,
        }
    }

    /// Attaches the PNG-encoded annotated image.
    pub fn with_annotation(mut self, png: impl Into<Bytes>) -> Self {
        self.annotation = Some(png.into());
        self
    }

    /// Recognized text lines in reading order.
    pub fn recognized_texts(&self) -> &[String] {
        &self.texts
    }

    /// Returns `true` if the engine rendered an annotated image.
    pub fn has_annotation(&self) -> bool {
        self.annotation.is_some()
    }

    /// Writes the annotated image to `destination`.
    ///
    /// Returns `false` without touching the file system when the page has no
    /// annotation.
    pub async fn save_annotated_image(&self, destination: &Path) -> std::io::Result<bool> {
        match &self.annotation {
            Some(png) => {
                tokio::fs::write(destination, png).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Narrow interface to an OCR engine.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Runs OCR on `source` and returns one entry per page.
    async fn recognize(&self, source: &OcrSource) -> Result<Vec<OcrPage>>;

    /// Probes whether the engine can serve requests.
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

/// Shared, optionally rate-limited handle to the OCR engine.
#[derive(Clone)]
pub struct OcrEngineHandle {
    engine: Arc<dyn OcrEngine>,
    permits: Option<Arc<Semaphore>>,
}

impl OcrEngineHandle {
    /// Wraps an engine with unbounded concurrency.
    pub fn new(engine: impl OcrEngine + 'static) -> Self {
        Self {
            engine: Arc::new(engine),
            permits: None,
        }
    }

    /// Limits the number of concurrent engine calls.
    ///
    /// `None` removes the limit.
    pub fn with_max_concurrency(mut self, limit: Option<usize>) -> Self {
        self.permits = limit.map(|n| Arc::new(Semaphore::new(n)));
        self
    }

    /// Runs OCR on `source`, waiting for a permit when a limit is set.
    pub async fn recognize(&self, source: &OcrSource) -> Result<Vec<OcrPage>> {
        let _permit = match &self.permits {
            Some(permits) => Some(permits.acquire().await.map_err(|e| {
                Error::internal("engine", "concurrency limiter closed").with_source(e)
            })?),
            None => None,
        };

        tracing::debug!(target: TRACING_TARGET, source = ?source, "invoking ocr engine");
        self.engine.recognize(source).await
    }

    /// Probes the engine.
    pub async fn health_check(&self) -> Result<()> {
        self.engine.health_check().await
    }
}

impl fmt::Debug for OcrEngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OcrEngineHandle")
            .field("max_concurrency", &self.permits.as_ref().map(|_| "bounded"))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    /// Tracks the highest number of overlapping calls.
    #[derive(Default)]
    struct Overlap {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl OcrEngine for Arc<Overlap> {
        async fn recognize(&self, _source: &OcrSource) -> Result<Vec<OcrPage>> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn save_annotated_image_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("1.png");

        let page = OcrPage::new(vec!["a".into()]).with_annotation(&b"png"[..]);
        assert!(page.save_annotated_image(&destination).await.unwrap());
        assert_eq!(std::fs::read(&destination).unwrap(), b"png");

        let page = OcrPage::new(vec!["a".into()]);
        let destination = dir.path().join("2.png");
        assert!(!page.save_annotated_image(&destination).await.unwrap());
        assert!(!destination.exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrency_limit_serialises_calls() {
        let overlap = Arc::new(Overlap::default());
        let handle = OcrEngineHandle::new(overlap.clone()).with_max_concurrency(Some(1));

        let calls = (0..4).map(|_| {
            let handle = handle.clone();
            tokio::spawn(async move {
                handle
                    .recognize(&OcrSource::Url("https://example.com/a.png".into()))
                    .await
            })
        });
        for call in calls.collect::<Vec<_>>() {
            call.await.unwrap().unwrap();
        }

        assert_eq!(overlap.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn default_health_check_passes() {
        let handle = OcrEngineHandle::new(Arc::new(Overlap::default()));
        assert!(handle.health_check().await.is_ok());
    }
}

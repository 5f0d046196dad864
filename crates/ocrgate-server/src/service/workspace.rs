//! Per-request scratch directories.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::service::ArtifactKind;
use crate::{Error, Result};

/// Tracing target for scratch workspace operations.
const TRACING_TARGET: &str = "ocrgate_server::service::workspace";

/// Prefix of every workspace directory name.
const WORKSPACE_PREFIX: &str = "ocrgate-";

/// Root under which request workspaces are created.
#[derive(Debug, Clone)]
pub struct ScratchSpace {
    root: PathBuf,
}

impl ScratchSpace {
    /// Creates a scratch space rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates a scratch space in the system temporary directory.
    pub fn system() -> Self {
        Self::new(std::env::temp_dir())
    }

    /// Returns the scratch root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates a fresh, uniquely named workspace directory.
    ///
    /// Names are random and the directory is created with create-new
    /// semantics, retrying on collision, so concurrent callers never share
    /// a directory.
    pub fn acquire(&self) -> Result<Workspace> {
        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(&self.root)
            .map_err(|e| {
                Error::file_system(format!(
                    "failed to create workspace under '{}'",
                    self.root.display()
                ))
                .with_source(e)
            })?;

        tracing::debug!(
            target: TRACING_TARGET,
            path = %dir.path().display(),
            "workspace acquired"
        );

        Ok(Workspace {
            path: dir.path().to_path_buf(),
            dir: Some(dir),
            staged: None,
        })
    }
}

impl Default for ScratchSpace {
    fn default() -> Self {
        Self::system()
    }
}

/// Exclusively owned scratch directory for one request.
///
/// The directory is removed by [`close`](Self::close) or
/// [`release`](Self::release) or, failing that, when the workspace is dropped.
#[derive(Debug)]
#[must_use = "a workspace is removed as soon as it is dropped"]
pub struct Workspace {
    dir: Option<TempDir>,
    path: PathBuf,
    staged: Option<&'static str>,
}

impl Workspace {
    /// Returns the workspace directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the uploaded bytes as the source artifact and returns its path.
    pub async fn stage(&mut self, kind: ArtifactKind, bytes: &[u8]) -> Result<PathBuf> {
        let file_name = kind.file_name();
        let path = self.path.join(file_name);

        tokio::fs::write(&path, bytes).await.map_err(|e| {
            Error::file_system(format!("failed to write '{}': {}", file_name, e)).with_source(e)
        })?;

        tracing::debug!(
            target: TRACING_TARGET,
            path = %path.display(),
            size = bytes.len(),
            kind = %kind,
            "source artifact staged"
        );

        self.staged = Some(file_name);
        Ok(path)
    }

    /// File name of the staged source artifact, if any.
    pub fn staged_name(&self) -> Option<&'static str> {
        self.staged
    }

    /// Returns `true` once the directory has been released.
    pub fn is_released(&self) -> bool {
        self.dir.is_none()
    }

    /// Deletes the directory and everything in it on the blocking pool.
    ///
    /// Never fails and may be called repeatedly. The removal still completes
    /// if the returned future is dropped while waiting.
    pub async fn close(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };

        match tokio::task::spawn_blocking(move || dir.close()).await {
            Ok(result) => self.log_removal(result),
            Err(error) => tracing::debug!(
                target: TRACING_TARGET,
                path = %self.path.display(),
                error = %error,
                "workspace removal task failed"
            ),
        }
    }

    /// Deletes the directory and everything in it on the current thread.
    ///
    /// Never fails and may be called repeatedly; removal errors are logged
    /// at debug level.
    pub fn release(&mut self) {
        if let Some(dir) = self.dir.take() {
            self.log_removal(dir.close());
        }
    }

    fn log_removal(&self, result: std::io::Result<()>) {
        match result {
            Ok(()) => tracing::debug!(
                target: TRACING_TARGET,
                path = %self.path.display(),
                "workspace released"
            ),
            Err(error) => tracing::debug!(
                target: TRACING_TARGET,
                path = %self.path.display(),
                error = %error,
                "workspace removal failed"
            ),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.release();
    }
}

//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use ocrgate_server::handler::routes;
//! use ocrgate_server::service::{ServiceConfig, ServiceState};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServiceConfig::default();
//! let state = ServiceState::from_config(&config).await?;
//! let router: axum::Router = routes().with_state(state);
//! # Ok(())
//! # }
//! ```
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod error;
mod monitors;
mod ocr;
mod request;
mod response;

use axum::Router;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::request::OcrImageUrl;
pub use crate::handler::response::{HealthStatus, MonitorStatus, OcrText, OcrUpload};
use crate::service::ServiceState;

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with all routes and a JSON `404` fallback.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .merge(ocr::routes())
        .merge(monitors::routes())
        .fallback(handler)
}

#[cfg(test)]
pub(crate) mod test {
    use std::path::PathBuf;

    use axum_test::TestServer;
    use tempfile::TempDir;

    use crate::handler::routes;
    use crate::service::{MockEngine, OcrEngineHandle, ResultAssembler, ScratchSpace, ServiceState};

    /// Test server wired to a [`MockEngine`] and a private scratch root.
    pub struct TestContext {
        pub server: TestServer,
        pub engine: MockEngine,
        pub scratch_root: TempDir,
    }

    impl TestContext {
        /// Returns a new context whose workspaces live in a fresh temp dir.
        pub fn new(engine: MockEngine) -> anyhow::Result<Self> {
            let scratch_root = tempfile::tempdir()?;
            let server = create_test_server(&engine, ScratchSpace::new(scratch_root.path()))?;

            Ok(Self {
                server,
                engine,
                scratch_root,
            })
        }

        /// Rebuilds the server with workspaces created under `root`.
        pub fn with_scratch_root(self, root: PathBuf) -> anyhow::Result<Self> {
            let server = create_test_server(&self.engine, ScratchSpace::new(root))?;
            Ok(Self { server, ..self })
        }
    }

    /// Returns a new [`TestServer`] with the default router.
    pub fn create_test_server(
        engine: &MockEngine,
        scratch: ScratchSpace,
    ) -> anyhow::Result<TestServer> {
        let engine = OcrEngineHandle::new(engine.clone());
        let state = ServiceState::new(engine, scratch, ResultAssembler::default());
        let server = TestServer::new(routes().with_state(state))?;
        Ok(server)
    }

    /// Number of entries left in the scratch root.
    pub fn scratch_entries(ctx: &TestContext) -> usize {
        std::fs::read_dir(ctx.scratch_root.path())
            .map(|entries| entries.count())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn handlers() -> anyhow::Result<()> {
        let ctx = TestContext::new(MockEngine::default())?;
        assert!(ctx.server.is_running());
        Ok(())
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() -> anyhow::Result<()> {
        let ctx = TestContext::new(MockEngine::default())?;

        let response = ctx.server.get("/does-not-exist").await;
        response.assert_status_not_found();
        response.assert_json(&serde_json::json!({ "error": "not found" }));
        Ok(())
    }
}

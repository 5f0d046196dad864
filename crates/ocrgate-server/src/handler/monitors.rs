//! System monitoring handlers.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;

use crate::extract::Json;
use crate::handler::response::{HealthStatus, MonitorStatus};
use crate::service::{OcrEngineHandle, ServiceState};

/// Tracing target for monitoring handlers.
const TRACING_TARGET: &str = "ocrgate_server::handler::monitors";

/// Reports whether the OCR engine is reachable.
async fn health_status(
    State(engine): State<OcrEngineHandle>,
) -> (StatusCode, Json<MonitorStatus>) {
    match engine.health_check().await {
        Ok(()) => {
            tracing::debug!(target: TRACING_TARGET, "health check passed");
            let status = HealthStatus::Healthy;
            (StatusCode::OK, Json(MonitorStatus { status }))
        }
        Err(error) => {
            tracing::warn!(target: TRACING_TARGET, error = %error, "health check failed");
            let status = HealthStatus::Unhealthy;
            (StatusCode::SERVICE_UNAVAILABLE, Json(MonitorStatus { status }))
        }
    }
}

/// Returns a [`Router`] with the monitoring routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/health", get(health_status))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::handler::test::TestContext;
    use crate::service::MockEngine;

    #[tokio::test]
    async fn healthy_engine_reports_ok() -> anyhow::Result<()> {
        let ctx = TestContext::new(MockEngine::default())?;

        let response = ctx.server.get("/health").await;
        response.assert_status_ok();

        let body = response.json::<MonitorStatus>();
        assert_eq!(body.status, HealthStatus::Healthy);
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_engine_reports_unavailable() -> anyhow::Result<()> {
        let ctx = TestContext::new(MockEngine::default().unhealthy())?;

        let response = ctx.server.get("/health").await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        response.assert_json(&serde_json::json!({ "status": "unhealthy" }));
        Ok(())
    }
}

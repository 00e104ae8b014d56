//! Liveness endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use hookwire_core::Dispatcher;
use jiff::Timestamp;

use crate::handler::response::MonitorStatus;
use crate::service::ServiceState;

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "hookwire_server::handler::monitors";

#[tracing::instrument(skip_all)]
async fn health_status(State(dispatcher): State<Dispatcher>) -> (StatusCode, Json<MonitorStatus>) {
    tracing::trace!(target: TRACING_TARGET, "Health status check requested");

    let status = MonitorStatus {
        is_healthy: true,
        version: env!("CARGO_PKG_VERSION").to_owned(),
        registered_handlers: dispatcher.registry().len(),
        updated_at: Timestamp::now(),
    };

    (StatusCode::OK, Json(status))
}

/// Returns a [`Router`] with the monitor routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/health", get(health_status))
}

#[cfg(test)]
mod tests {
    use crate::handler::test::create_test_server;

    #[tokio::test]
    async fn reports_healthy() -> anyhow::Result<()> {
        let context = create_test_server()?;

        let response = context.server.get("/health").await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body["is_healthy"], true);
        assert_eq!(body["registered_handlers"], 0);
        Ok(())
    }
}

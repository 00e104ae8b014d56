//! Operator reads of the persisted handler catalog.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use hookwire_core::Dispatcher;
use hookwire_core::store::HandlerCatalog;

use crate::handler::Result;
use crate::handler::response::{WebhookHandler, WebhookHandlers};
use crate::service::ServiceState;

/// Tracing target for catalog reads.
const TRACING_TARGET: &str = "hookwire_server::handler::webhook_handlers";

#[tracing::instrument(skip_all)]
async fn list_handlers(
    State(catalog): State<Arc<dyn HandlerCatalog>>,
    State(dispatcher): State<Dispatcher>,
) -> Result<(StatusCode, Json<WebhookHandlers>)> {
    let handlers = catalog.list_handlers().await?;

    tracing::debug!(
        target: TRACING_TARGET,
        handler_count = handlers.len(),
        "Webhook handlers listed"
    );

    let handlers = WebhookHandler::from_models(handlers, dispatcher.registry());
    Ok((StatusCode::OK, Json(handlers)))
}

/// Returns a [`Router`] with the handler catalog routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/handlers/", get(list_handlers))
}

#[cfg(test)]
mod tests {
    use hookwire_core::HandlerRegistry;
    use hookwire_core::mock::StaticHandler;
    use hookwire_core::store::HandlerCatalog;
    use hookwire_core::types::HandlerDescriptor;

    use crate::handler::test::create_test_context;

    #[tokio::test]
    async fn lists_catalog_with_registration_state() -> anyhow::Result<()> {
        let mut registry = HandlerRegistry::new();
        registry.register("log-events", "Logs event counts", StaticHandler::handled())?;
        let context = create_test_context(registry)?;

        context
            .store
            .sync_catalog(&[
                HandlerDescriptor::new("log-events", "Logs event counts"),
                HandlerDescriptor::new("retired", "No longer shipped"),
            ])
            .await?;

        let response = context.server.get("/handlers/").await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body[0]["name"], "log-events");
        assert_eq!(body[0]["description"], "Logs event counts");
        assert_eq!(body[0]["is_registered"], true);
        assert_eq!(body[1]["name"], "retired");
        assert_eq!(body[1]["is_registered"], false);
        Ok(())
    }
}

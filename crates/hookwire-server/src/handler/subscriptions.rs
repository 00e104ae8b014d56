//! Operator reads of webhook subscriptions.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use hookwire_core::store::SubscriptionStore;

use crate::extract::Query;
use crate::handler::Result;
use crate::handler::request::PaginationRequest;
use crate::handler::response::{Subscription, Subscriptions};
use crate::service::ServiceState;

/// Tracing target for subscription reads.
const TRACING_TARGET: &str = "hookwire_server::handler::subscriptions";

#[tracing::instrument(skip_all)]
async fn list_subscriptions(
    State(subscriptions): State<Arc<dyn SubscriptionStore>>,
    Query(pagination): Query<PaginationRequest>,
) -> Result<(StatusCode, Json<Subscriptions>)> {
    let records = subscriptions
        .list_subscriptions(pagination.into())
        .await?;

    tracing::debug!(
        target: TRACING_TARGET,
        subscription_count = records.len(),
        "Subscriptions listed"
    );

    Ok((StatusCode::OK, Json(Subscription::from_models(records))))
}

/// Returns a [`Router`] with the subscription routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/subscriptions/", get(list_subscriptions))
}

#[cfg(test)]
mod tests {
    use hookwire_core::store::SubscriptionStore;

    use crate::handler::test::create_test_server;

    #[tokio::test]
    async fn secret_is_never_exposed() -> anyhow::Result<()> {
        let context = create_test_server()?;
        context.subscription("asana-events").await?;
        let verified = context
            .verified_subscription("github-events", "abc123")
            .await?;
        context
            .store
            .assign_handlers(verified.id, &["log-events".to_owned()])
            .await?;

        let response = context.server.get("/subscriptions/").await;
        response.assert_status_ok();
        assert!(!response.text().contains("abc123"));

        let body: serde_json::Value = response.json();
        assert_eq!(body[0]["name"], "github-events");
        assert_eq!(body[0]["has_secret"], true);
        assert_eq!(body[0]["handler_names"], serde_json::json!(["log-events"]));
        assert_eq!(body[1]["name"], "asana-events");
        assert_eq!(body[1]["has_secret"], false);
        assert!(body[0].get("secret").is_none());
        Ok(())
    }
}

//! Operator reads of delivery records.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use hookwire_core::store::{DeliveryStore, SubscriptionStore};
use hookwire_core::types::{self, DeliveryFilter};

use crate::extract::{Path, Query};
use crate::handler::request::{DeliveryPathParams, ListDeliveriesQuery};
use crate::handler::response::{Deliveries, Delivery, DeliverySummary};
use crate::handler::{ErrorKind, Result};
use crate::service::ServiceState;

/// Tracing target for delivery reads.
const TRACING_TARGET: &str = "hookwire_server::handler::deliveries";

#[tracing::instrument(
    skip_all,
    fields(
        subscription = query.subscription.as_deref(),
        status = ?query.status,
    )
)]
async fn list_deliveries(
    State(subscriptions): State<Arc<dyn SubscriptionStore>>,
    State(deliveries): State<Arc<dyn DeliveryStore>>,
    Query(query): Query<ListDeliveriesQuery>,
) -> Result<(StatusCode, Json<Deliveries>)> {
    let subscription_id = match query.subscription.as_deref() {
        Some(name) => {
            let subscription = subscriptions
                .find_subscription_by_name(name)
                .await?
                .ok_or_else(|| {
                    ErrorKind::NotFound
                        .with_message("Webhook subscription does not exist")
                        .with_resource("subscription")
                        .with_context(name.to_owned())
                })?;
            Some(subscription.id)
        }
        None => None,
    };

    let filter = DeliveryFilter {
        subscription_id,
        status: query.status,
    };

    let records = deliveries
        .list_deliveries(&filter, query.pagination())
        .await?;

    tracing::debug!(
        target: TRACING_TARGET,
        delivery_count = records.len(),
        "Deliveries listed"
    );

    Ok((StatusCode::OK, Json(DeliverySummary::from_models(records))))
}

/// Loads a delivery or answers `404`.
async fn find_delivery(
    deliveries: &dyn DeliveryStore,
    path_params: &DeliveryPathParams,
) -> Result<types::Delivery> {
    deliveries
        .find_delivery(path_params.delivery_id)
        .await?
        .ok_or_else(|| {
            ErrorKind::NotFound
                .with_message("Delivery record does not exist")
                .with_resource("delivery")
                .with_context(path_params.delivery_id.to_string())
        })
}

#[tracing::instrument(skip_all, fields(delivery_id = %path_params.delivery_id))]
async fn read_delivery(
    State(deliveries): State<Arc<dyn DeliveryStore>>,
    Path(path_params): Path<DeliveryPathParams>,
) -> Result<(StatusCode, Json<Delivery>)> {
    let delivery = find_delivery(deliveries.as_ref(), &path_params).await?;

    tracing::debug!(
        target: TRACING_TARGET,
        status = %delivery.status,
        "Delivery read"
    );

    Ok((StatusCode::OK, Json(Delivery::from_model(delivery))))
}

#[tracing::instrument(skip_all, fields(delivery_id = %path_params.delivery_id))]
async fn read_delivery_headers(
    State(deliveries): State<Arc<dyn DeliveryStore>>,
    Path(path_params): Path<DeliveryPathParams>,
) -> Result<(StatusCode, Json<BTreeMap<String, String>>)> {
    let delivery = find_delivery(deliveries.as_ref(), &path_params).await?;
    Ok((StatusCode::OK, Json(delivery.headers)))
}

#[tracing::instrument(skip_all, fields(delivery_id = %path_params.delivery_id))]
async fn read_delivery_payload(
    State(deliveries): State<Arc<dyn DeliveryStore>>,
    Path(path_params): Path<DeliveryPathParams>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let delivery = find_delivery(deliveries.as_ref(), &path_params).await?;
    Ok((StatusCode::OK, Json(delivery.payload)))
}

/// Returns a [`Router`] with the delivery routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/deliveries/", get(list_deliveries))
        .route("/deliveries/{delivery_id}/", get(read_delivery))
        .route("/deliveries/{delivery_id}/headers/", get(read_delivery_headers))
        .route("/deliveries/{delivery_id}/payload/", get(read_delivery_payload))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use hookwire_core::store::DeliveryStore;
    use hookwire_core::types::{AdditionalData, HandlerResult, NewDelivery, ProcessingStatus};
    use serde_json::json;
    use uuid::Uuid;

    use crate::handler::test::{TestContext, create_test_server};

    async fn deliver(
        context: &TestContext,
        subscription_id: Uuid,
        payload: serde_json::Value,
    ) -> anyhow::Result<Uuid> {
        let headers = BTreeMap::from([("content-type".to_owned(), "application/json".to_owned())]);
        let delivery = context
            .store
            .create_delivery(NewDelivery::new(subscription_id, headers, payload))
            .await?;
        Ok(delivery.id)
    }

    #[tokio::test]
    async fn lists_newest_first() -> anyhow::Result<()> {
        let context = create_test_server()?;
        let subscription = context.subscription("github-events").await?;
        let first = deliver(&context, subscription.id, json!({ "n": 1 })).await?;
        let second = deliver(&context, subscription.id, json!({ "n": 2 })).await?;

        let response = context.server.get("/deliveries/").await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        let ids: Vec<_> = body
            .as_array()
            .map(|items| items.iter().map(|item| item["id"].clone()).collect())
            .unwrap_or_default();
        assert_eq!(ids, vec![json!(second), json!(first)]);
        assert!(body[0].get("payload").is_none());
        assert!(body[0].get("headers").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn filters_by_subscription_and_status() -> anyhow::Result<()> {
        let context = create_test_server()?;
        let github = context.subscription("github-events").await?;
        let asana = context.subscription("asana-events").await?;
        deliver(&context, github.id, json!({})).await?;
        let done = deliver(&context, asana.id, json!({})).await?;
        deliver(&context, asana.id, json!({})).await?;
        context
            .store
            .complete_delivery(done, ProcessingStatus::NoHandlers, None)
            .await?;

        let response = context
            .server
            .get("/deliveries/")
            .add_query_param("subscription", "asana-events")
            .await;
        let body: serde_json::Value = response.json();
        assert_eq!(body.as_array().map(Vec::len), Some(2));

        let response = context
            .server
            .get("/deliveries/")
            .add_query_param("subscription", "asana-events")
            .add_query_param("status", "no_handlers")
            .await;
        let body: serde_json::Value = response.json();
        assert_eq!(body.as_array().map(Vec::len), Some(1));
        assert_eq!(body[0]["id"], json!(done));
        assert_eq!(body[0]["status"], "no_handlers");

        let response = context
            .server
            .get("/deliveries/")
            .add_query_param("limit", 1)
            .add_query_param("offset", 1)
            .await;
        let body: serde_json::Value = response.json();
        assert_eq!(body.as_array().map(Vec::len), Some(1));
        Ok(())
    }

    #[tokio::test]
    async fn unknown_filters_are_rejected() -> anyhow::Result<()> {
        let context = create_test_server()?;

        let response = context
            .server
            .get("/deliveries/")
            .add_query_param("subscription", "missing")
            .await;
        response.assert_status_not_found();
        let body: serde_json::Value = response.json();
        assert_eq!(body["resource"], "subscription");

        let response = context
            .server
            .get("/deliveries/")
            .add_query_param("status", "exploded")
            .await;
        response.assert_status_bad_request();
        Ok(())
    }

    #[tokio::test]
    async fn reads_record_and_sub_resources() -> anyhow::Result<()> {
        let context = create_test_server()?;
        let subscription = context.subscription("github-events").await?;
        let payload = json!({ "events": [{ "action": "added" }] });
        let id = deliver(&context, subscription.id, payload.clone()).await?;

        let mut data = AdditionalData::default();
        data.handler_results
            .insert("log-events".to_owned(), HandlerResult::handled());
        context
            .store
            .complete_delivery(id, ProcessingStatus::Success, Some(&data))
            .await?;

        let response = context.server.get(&format!("/deliveries/{id}/")).await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "success");
        assert_eq!(body["payload"], payload);
        assert_eq!(
            body["additional_data"]["handler_results"]["log-events"]["is_success"],
            true
        );
        assert!(body["processed_at"].is_string());

        let response = context.server.get(&format!("/deliveries/{id}/headers/")).await;
        response.assert_json(&json!({ "content-type": "application/json" }));

        let response = context.server.get(&format!("/deliveries/{id}/payload/")).await;
        response.assert_json(&payload);
        Ok(())
    }

    #[tokio::test]
    async fn pending_record_has_empty_additional_data() -> anyhow::Result<()> {
        let context = create_test_server()?;
        let subscription = context.subscription("github-events").await?;
        let id = deliver(&context, subscription.id, json!({})).await?;

        let response = context.server.get(&format!("/deliveries/{id}/")).await;
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "pending");
        assert_eq!(body["additional_data"], json!({}));
        assert!(body["processed_at"].is_null());
        Ok(())
    }

    #[tokio::test]
    async fn missing_or_malformed_ids() -> anyhow::Result<()> {
        let context = create_test_server()?;

        let response = context
            .server
            .get(&format!("/deliveries/{}/", Uuid::now_v7()))
            .await;
        response.assert_status_not_found();
        let body: serde_json::Value = response.json();
        assert_eq!(body["resource"], "delivery");

        let response = context.server.get("/deliveries/not-a-uuid/").await;
        response.assert_status_bad_request();
        Ok(())
    }
}

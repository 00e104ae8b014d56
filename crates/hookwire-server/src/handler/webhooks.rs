//! Webhook intake.
//!
//! `POST /webhook/{subscription_name}/` runs the admission handshake and,
//! once a secret is established, persists the delivery and enqueues it for
//! asynchronous dispatch. Handlers never run on the request path.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use hookwire_core::store::{DeliveryStore, DispatchQueue};
use hookwire_core::types::{DispatchJob, NewDelivery};
use hookwire_core::{AdmissionGate, AdmissionOutcome};

use crate::extract::{HOOK_SECRET_HEADER, HookSecret, Path};
use crate::handler::request::SubscriptionPathParams;
use crate::handler::response::{WebhookAccepted, WebhookRejected, WebhookVerified};
use crate::handler::{ErrorKind, Result};
use crate::service::ServiceState;

/// Tracing target for webhook intake.
const TRACING_TARGET: &str = "hookwire_server::handler::webhooks";

#[tracing::instrument(
    skip_all,
    fields(
        subscription = %path_params.subscription_name,
        presented_secret = secret.as_deref().is_some(),
    )
)]
#[allow(clippy::too_many_arguments)]
async fn receive_webhook(
    State(gate): State<AdmissionGate>,
    State(deliveries): State<Arc<dyn DeliveryStore>>,
    State(queue): State<Arc<dyn DispatchQueue>>,
    Path(path_params): Path<SubscriptionPathParams>,
    secret: HookSecret,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let name = path_params.subscription_name;
    let outcome = gate.admit(&name, secret.as_deref()).await?;

    tracing::debug!(
        target: TRACING_TARGET,
        outcome = outcome.as_str(),
        "Webhook admission decided"
    );

    let (subscription, secret) = match outcome {
        AdmissionOutcome::NotFound => {
            return Err(ErrorKind::NotFound
                .with_message("Webhook subscription does not exist")
                .with_resource("subscription")
                .with_context(name));
        }
        AdmissionOutcome::RejectedNoSecret { name } => {
            let body = WebhookRejected::no_secret(&name);
            return Ok((StatusCode::BAD_REQUEST, Json(body)).into_response());
        }
        AdmissionOutcome::Established {
            subscription,
            secret,
        } => {
            tracing::info!(
                target: TRACING_TARGET,
                subscription_id = %subscription.id,
                "Webhook secret established"
            );

            let body = WebhookVerified::established(&subscription.name);
            let response = (
                StatusCode::CREATED,
                [(HOOK_SECRET_HEADER, secret)],
                Json(body),
            );
            return Ok(response.into_response());
        }
        AdmissionOutcome::Accept {
            subscription,
            secret,
        } => (subscription, secret),
    };

    let payload = parse_payload(&body)?;
    let headers = collect_headers(&headers);

    let new_delivery = NewDelivery::new(subscription.id, headers.clone(), payload);
    let delivery = deliveries.create_delivery(new_delivery).await?;

    queue.enqueue(DispatchJob::new(delivery.id), None).await?;

    tracing::info!(
        target: TRACING_TARGET,
        subscription_id = %subscription.id,
        delivery_id = %delivery.id,
        "Webhook delivery accepted"
    );

    let body = WebhookAccepted::new(method.as_str(), headers);
    let response = (StatusCode::OK, [(HOOK_SECRET_HEADER, secret)], Json(body));
    Ok(response.into_response())
}

/// Parses the request body as JSON; an empty body is the empty object.
fn parse_payload(body: &[u8]) -> Result<serde_json::Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::Value::Object(serde_json::Map::new()));
    }

    serde_json::from_slice(body).map_err(|err| {
        ErrorKind::BadRequest
            .with_message("Request body is not valid JSON")
            .with_context(err.to_string())
    })
}

/// Flattens request headers; repeated headers are joined with `, `.
fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut collected = BTreeMap::<String, String>::new();

    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        collected
            .entry(name.as_str().to_owned())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }

    collected
}

/// Returns a [`Router`] with the webhook intake route.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/webhook/{subscription_name}/", post(receive_webhook))
}

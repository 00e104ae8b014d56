//! Logs how many events an inbound payload carries.

use hookwire_core::types::{Delivery, HandlerResult};
use hookwire_core::{BoxedError, Handler};
use serde_json::Value;

/// Tracing target for the log-events handler.
const TRACING_TARGET: &str = "hookwire_cli::handlers::log_events";

/// Payload key holding the event list.
const EVENTS_KEY: &str = "events";

/// Reports a delivery as a target event when its payload carries a
/// non-empty `events` array, and logs the number of events.
///
/// A payload without `events`, or with an empty array, is skipped. An
/// `events` value that is not an array fails the handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEventsHandler;

impl LogEventsHandler {
    /// Registry name.
    pub const NAME: &'static str = "log-events";
}

#[async_trait::async_trait]
impl Handler for LogEventsHandler {
    async fn handle(&self, delivery: &Delivery) -> Result<HandlerResult, BoxedError> {
        let events = match delivery.payload.get(EVENTS_KEY) {
            None | Some(Value::Null) => return Ok(HandlerResult::skipped()),
            Some(Value::Array(events)) => events,
            Some(other) => {
                return Err(format!(
                    "payload field '{EVENTS_KEY}' must be an array, got {}",
                    json_kind(other)
                )
                .into());
            }
        };

        if events.is_empty() {
            return Ok(HandlerResult::skipped());
        }

        tracing::info!(
            target: TRACING_TARGET,
            delivery_id = %delivery.id,
            subscription_id = %delivery.subscription_id,
            event_count = events.len(),
            "received webhook events"
        );

        Ok(HandlerResult::handled())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::handlers::test::delivery;

    async fn handle(payload: Value) -> Result<HandlerResult, BoxedError> {
        LogEventsHandler.handle(&delivery(payload)).await
    }

    #[tokio::test]
    async fn handles_non_empty_events() -> anyhow::Result<()> {
        let result = handle(json!({"events": [{"kind": "push"}, {"kind": "tag"}]}))
            .await
            .map_err(|e| anyhow::anyhow!(e))?;

        assert_eq!(result, HandlerResult::handled());
        Ok(())
    }

    #[tokio::test]
    async fn skips_missing_or_empty_events() -> anyhow::Result<()> {
        for payload in [json!({}), json!({"events": []}), json!({"events": null})] {
            let result = handle(payload).await.map_err(|e| anyhow::anyhow!(e))?;
            assert_eq!(result, HandlerResult::skipped());
        }
        Ok(())
    }

    #[tokio::test]
    async fn fails_on_malformed_events() {
        let error = handle(json!({"events": "push"})).await.err();

        assert_eq!(
            error.map(|e| e.to_string()).as_deref(),
            Some("payload field 'events' must be an array, got string")
        );
    }
}

//! Dispatch engine: runs a delivery through its assigned handlers.
//!
//! Each handler runs in isolation. A returned error, a panic, an expired
//! timeout or a name missing from the registry is recorded against that
//! handler and the remaining handlers still run. Only failures to read or
//! persist the delivery itself leave [`Dispatcher::dispatch`] as errors.

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use uuid::Uuid;

use crate::registry::HandlerRegistry;
use crate::store::{DeliveryStore, SubscriptionStore};
use crate::types::{AdditionalData, Delivery, DispatchResult, HandlerResult, ProcessingStatus};
use crate::{Error, Result, TRACING_TARGET_DISPATCH};

/// Outcome of running a single handler.
enum HandlerOutcome {
    Completed(HandlerResult),
    Failed(String),
}

/// Runs deliveries through the handlers assigned to their subscription.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
    subscriptions: Arc<dyn SubscriptionStore>,
    deliveries: Arc<dyn DeliveryStore>,
    handler_timeout: Option<Duration>,
}

impl Dispatcher {
    /// Creates a new dispatcher without a per-handler timeout.
    pub fn new(
        registry: Arc<HandlerRegistry>,
        subscriptions: Arc<dyn SubscriptionStore>,
        deliveries: Arc<dyn DeliveryStore>,
    ) -> Self {
        Self {
            registry,
            subscriptions,
            deliveries,
            handler_timeout: None,
        }
    }

    /// Bounds every handler invocation by `timeout`.
    pub fn with_handler_timeout(mut self, timeout: Duration) -> Self {
        self.handler_timeout = Some(timeout);
        self
    }

    /// Sets or clears the per-handler timeout.
    pub fn with_optional_handler_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.handler_timeout = timeout;
        self
    }

    /// Returns the handler registry.
    #[inline]
    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    /// Loads a delivery and dispatches it.
    ///
    /// A delivery that already reached a terminal status is not dispatched
    /// again; its stored outcome is returned instead.
    pub async fn dispatch_by_id(&self, delivery_id: Uuid) -> Result<DispatchResult> {
        let delivery = self
            .deliveries
            .find_delivery(delivery_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("delivery {delivery_id} not found")))?;

        if delivery.status.is_terminal() {
            tracing::warn!(
                target: TRACING_TARGET_DISPATCH,
                delivery_id = %delivery_id,
                status = %delivery.status,
                "delivery already dispatched, skipping"
            );
            return Ok(DispatchResult::from_parts(
                delivery.id,
                delivery.status,
                delivery.additional_data,
            ));
        }

        self.dispatch(&delivery).await
    }

    /// Dispatches a delivery and persists the terminal status.
    pub async fn dispatch(&self, delivery: &Delivery) -> Result<DispatchResult> {
        let subscription = self
            .subscriptions
            .find_subscription(delivery.subscription_id)
            .await?
            .ok_or_else(|| {
                Error::not_found(format!(
                    "subscription {} of delivery {} not found",
                    delivery.subscription_id, delivery.id
                ))
            })?;

        if !subscription.has_handlers() {
            tracing::info!(
                target: TRACING_TARGET_DISPATCH,
                delivery_id = %delivery.id,
                subscription = %subscription.name,
                "no handlers assigned"
            );

            self.deliveries
                .complete_delivery(delivery.id, ProcessingStatus::NoHandlers, None)
                .await?;
            return Ok(DispatchResult::from_parts(
                delivery.id,
                ProcessingStatus::NoHandlers,
                None,
            ));
        }

        let data = self.run_handlers(delivery, &subscription.handler_names).await;
        let status = data.status();

        tracing::info!(
            target: TRACING_TARGET_DISPATCH,
            delivery_id = %delivery.id,
            subscription = %subscription.name,
            status = %status,
            results = data.handler_results.len(),
            errors = data.errors.len(),
            "delivery dispatched"
        );

        self.deliveries
            .complete_delivery(delivery.id, status, Some(&data))
            .await?;

        Ok(DispatchResult::from_parts(delivery.id, status, Some(data)))
    }

    /// Runs every named handler and collects results and errors.
    async fn run_handlers(&self, delivery: &Delivery, names: &BTreeSet<String>) -> AdditionalData {
        let mut handler_results = BTreeMap::new();
        let mut errors = BTreeMap::new();

        for name in names {
            match self.run_handler(delivery, name).await {
                HandlerOutcome::Completed(result) => {
                    handler_results.insert(name.clone(), result);
                }
                HandlerOutcome::Failed(error) => {
                    tracing::warn!(
                        target: TRACING_TARGET_DISPATCH,
                        delivery_id = %delivery.id,
                        handler = %name,
                        error = %error,
                        "handler failed"
                    );
                    errors.insert(name.clone(), error);
                }
            }
        }

        AdditionalData {
            handler_results,
            errors,
        }
    }

    async fn run_handler(&self, delivery: &Delivery, name: &str) -> HandlerOutcome {
        let Some(handler) = self.registry.lookup(name) else {
            return HandlerOutcome::Failed(format!("handler '{name}' not found in registry"));
        };

        let started = Instant::now();
        let invocation = AssertUnwindSafe(handler.handle(delivery)).catch_unwind();

        let outcome = match self.handler_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, invocation).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    return HandlerOutcome::Failed(format!(
                        "handler '{name}' timed out after {}s",
                        timeout.as_secs()
                    ));
                }
            },
            None => invocation.await,
        };

        let outcome = match outcome {
            Ok(Ok(result)) => HandlerOutcome::Completed(result),
            Ok(Err(error)) => HandlerOutcome::Failed(error.to_string()),
            Err(panic) => HandlerOutcome::Failed(panic_message(panic.as_ref())),
        };

        tracing::debug!(
            target: TRACING_TARGET_DISPATCH,
            delivery_id = %delivery.id,
            handler = %name,
            completed = matches!(outcome, HandlerOutcome::Completed(_)),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "handler finished"
        );

        outcome
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "handler panicked".to_owned())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use super::*;
    use crate::mock::{FailingHandler, MemoryStore, PanickingHandler, SlowHandler, StaticHandler};
    use crate::store::DeliveryStore;
    use crate::types::{NewDelivery, NewSubscription};

    struct Fixture {
        store: Arc<MemoryStore>,
        dispatcher: Dispatcher,
        delivery: Delivery,
    }

    async fn fixture(registry: HandlerRegistry, assigned: &[&str]) -> anyhow::Result<Fixture> {
        let store = Arc::new(MemoryStore::new());
        let subscription = store
            .create_subscription(NewSubscription {
                name: "name".into(),
                resource_id: "123".into(),
                resource_type: "project".into(),
            })
            .await?;

        let assigned: Vec<String> = assigned.iter().map(|name| (*name).to_owned()).collect();
        store.assign_handlers(subscription.id, &assigned).await?;

        let delivery = store
            .create_delivery(NewDelivery::new(
                subscription.id,
                BTreeMap::new(),
                json!({ "events": [] }),
            ))
            .await?;

        let dispatcher = Dispatcher::new(Arc::new(registry), store.clone(), store.clone());
        Ok(Fixture {
            store,
            dispatcher,
            delivery,
        })
    }

    fn registry() -> anyhow::Result<HandlerRegistry> {
        let mut registry = HandlerRegistry::new();
        registry.register("success_target", "", StaticHandler::handled())?;
        registry.register("success_not_target", "", StaticHandler::skipped())?;
        registry.register("error_handler", "", StaticHandler::unsuccessful("error"))?;
        registry.register("raise_error_handler", "", FailingHandler::new("boom"))?;
        registry.register("panicking_handler", "", PanickingHandler)?;
        Ok(registry)
    }

    async fn stored(fixture: &Fixture) -> anyhow::Result<Delivery> {
        fixture
            .store
            .find_delivery(fixture.delivery.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("delivery missing"))
    }

    #[tokio::test]
    async fn test_no_handlers() -> anyhow::Result<()> {
        let fixture = fixture(registry()?, &[]).await?;
        let result = fixture.dispatcher.dispatch(&fixture.delivery).await?;

        assert_eq!(result.status, ProcessingStatus::NoHandlers);
        assert!(result.handler_results.is_empty());
        assert!(result.errors.is_empty());

        let delivery = stored(&fixture).await?;
        assert_eq!(delivery.status, ProcessingStatus::NoHandlers);
        assert_eq!(delivery.additional_data, None);
        assert!(delivery.processed_at.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_all_handlers_succeed() -> anyhow::Result<()> {
        let fixture = fixture(
            registry()?,
            &["success_target", "success_not_target", "error_handler"],
        )
        .await?;
        let result = fixture.dispatcher.dispatch(&fixture.delivery).await?;

        assert_eq!(result.status, ProcessingStatus::Success);
        assert!(result.errors.is_empty());
        assert_eq!(result.handler_results.len(), 3);
        assert_eq!(
            result.handler_results.get("error_handler"),
            Some(&HandlerResult::unsuccessful("error"))
        );
        assert_eq!(
            result.handler_results.get("success_not_target"),
            Some(&HandlerResult::skipped())
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_partial_on_raised_error() -> anyhow::Result<()> {
        let fixture = fixture(registry()?, &["success_target", "raise_error_handler"]).await?;
        let result = fixture.dispatcher.dispatch(&fixture.delivery).await?;

        assert_eq!(result.status, ProcessingStatus::Partial);
        assert_eq!(
            result.handler_results,
            BTreeMap::from([("success_target".to_owned(), HandlerResult::handled())])
        );
        assert_eq!(
            result.errors,
            BTreeMap::from([("raise_error_handler".to_owned(), "boom".to_owned())])
        );

        let delivery = stored(&fixture).await?;
        assert_eq!(delivery.status, ProcessingStatus::Partial);
        assert_eq!(delivery.additional_data, result.additional_data());
        Ok(())
    }

    #[tokio::test]
    async fn test_unresolvable_handler_fails() -> anyhow::Result<()> {
        let fixture = fixture(registry()?, &["ghost"]).await?;
        let result = fixture.dispatcher.dispatch(&fixture.delivery).await?;

        assert_eq!(result.status, ProcessingStatus::Failed);
        assert!(result.handler_results.is_empty());
        assert_eq!(
            result.errors.get("ghost").map(String::as_str),
            Some("handler 'ghost' not found in registry")
        );

        let delivery = stored(&fixture).await?;
        let data = delivery.additional_data.unwrap_or_default();
        assert_eq!(delivery.status, ProcessingStatus::Failed);
        assert_eq!(data.errors, result.errors);
        Ok(())
    }

    #[tokio::test]
    async fn test_panic_is_isolated() -> anyhow::Result<()> {
        let fixture = fixture(
            registry()?,
            &["panicking_handler", "raise_error_handler", "success_target"],
        )
        .await?;
        let result = fixture.dispatcher.dispatch(&fixture.delivery).await?;

        assert_eq!(result.status, ProcessingStatus::Partial);
        assert_eq!(
            result.errors.get("panicking_handler").map(String::as_str),
            Some("handler exploded")
        );
        assert!(result.handler_results.contains_key("success_target"));
        assert!(!result.errors.contains_key("success_target"));
        Ok(())
    }

    #[tokio::test]
    async fn test_every_handler_errors() -> anyhow::Result<()> {
        let fixture = fixture(registry()?, &["raise_error_handler", "ghost"]).await?;
        let result = fixture.dispatcher.dispatch(&fixture.delivery).await?;

        assert_eq!(result.status, ProcessingStatus::Failed);
        assert!(result.handler_results.is_empty());
        assert_eq!(result.errors.len(), 2);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_handler_timeout() -> anyhow::Result<()> {
        let mut registry = registry()?;
        registry.register("slow", "", SlowHandler::new(Duration::from_secs(60)))?;

        let mut fixture = fixture(registry, &["slow", "success_target"]).await?;
        fixture.dispatcher = fixture
            .dispatcher
            .clone()
            .with_handler_timeout(Duration::from_secs(5));

        let result = fixture.dispatcher.dispatch(&fixture.delivery).await?;
        assert_eq!(result.status, ProcessingStatus::Partial);
        assert_eq!(
            result.errors.get("slow").map(String::as_str),
            Some("handler 'slow' timed out after 5s")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_dispatch_by_id_skips_terminal_delivery() -> anyhow::Result<()> {
        let fixture = fixture(registry()?, &["success_target"]).await?;

        let first = fixture.dispatcher.dispatch_by_id(fixture.delivery.id).await?;
        let second = fixture.dispatcher.dispatch_by_id(fixture.delivery.id).await?;

        assert_eq!(first.status, ProcessingStatus::Success);
        assert_eq!(first, second);
        Ok(())
    }

    #[tokio::test]
    async fn test_dispatch_by_id_missing_delivery() -> anyhow::Result<()> {
        let fixture = fixture(registry()?, &[]).await?;
        let error = fixture.dispatcher.dispatch_by_id(Uuid::now_v7()).await.err();
        assert_eq!(error.map(|e| e.kind()), Some(crate::ErrorKind::NotFound));
        Ok(())
    }
}

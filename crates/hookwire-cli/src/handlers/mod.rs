//! Built-in webhook handlers and the registry bootstrap.
//!
//! Every handler the binary ships is registered here, once, before any
//! traffic is served. Adding a handler means implementing
//! [`Handler`](hookwire_core::Handler) and adding one `register` call.

mod log_events;
mod noop;

use hookwire_core::HandlerRegistry;

pub use log_events::LogEventsHandler;
pub use noop::NoopHandler;

/// Builds the registry of built-in handlers.
///
/// # Errors
///
/// Fails when two handlers share a name; the process must not start.
pub fn build_registry() -> hookwire_core::Result<HandlerRegistry> {
    let mut registry = HandlerRegistry::new();

    registry.register(
        LogEventsHandler::NAME,
        "Logs the number of events carried by the payload's `events` array",
        LogEventsHandler,
    )?;
    registry.register(
        NoopHandler::NAME,
        "Accepts every delivery without acting on it",
        NoopHandler,
    )?;

    Ok(registry)
}

#[cfg(test)]
pub(crate) mod test {
    use std::collections::BTreeMap;

    use hookwire_core::types::{Delivery, ProcessingStatus};
    use jiff::Timestamp;
    use uuid::Uuid;

    /// Builds a pending delivery carrying `payload`.
    pub fn delivery(payload: serde_json::Value) -> Delivery {
        Delivery {
            id: Uuid::now_v7(),
            subscription_id: Uuid::now_v7(),
            headers: BTreeMap::new(),
            payload,
            status: ProcessingStatus::Pending,
            additional_data: None,
            created_at: Timestamp::now(),
            processed_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use hookwire_core::ErrorKind;

    use super::*;

    #[test]
    fn registers_builtin_handlers() -> anyhow::Result<()> {
        let registry = build_registry()?;

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("log-events"));
        assert!(registry.contains("noop"));
        Ok(())
    }

    #[test]
    fn duplicate_registration_is_fatal() -> anyhow::Result<()> {
        let mut registry = build_registry()?;

        let error = registry
            .register("noop", "second noop", NoopHandler)
            .err()
            .ok_or_else(|| anyhow::anyhow!("duplicate name was accepted"))?;
        assert_eq!(error.kind(), ErrorKind::DuplicateHandler);
        Ok(())
    }
}

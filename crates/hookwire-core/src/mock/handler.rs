//! Handlers with fixed behavior.

use std::time::Duration;

use crate::BoxedError;
use crate::handler::Handler;
use crate::types::{Delivery, HandlerResult};

/// Returns the same result for every delivery.
#[derive(Debug, Clone)]
pub struct StaticHandler {
    result: HandlerResult,
}

impl StaticHandler {
    /// Always returns `result`.
    pub fn new(result: HandlerResult) -> Self {
        Self { result }
    }

    /// Always reports a handled target event.
    pub fn handled() -> Self {
        Self::new(HandlerResult::handled())
    }

    /// Always reports a non-target event.
    pub fn skipped() -> Self {
        Self::new(HandlerResult::skipped())
    }

    /// Always reports an unsuccessful target event.
    pub fn unsuccessful(error: impl Into<String>) -> Self {
        Self::new(HandlerResult::unsuccessful(error))
    }
}

#[async_trait::async_trait]
impl Handler for StaticHandler {
    async fn handle(&self, _delivery: &Delivery) -> Result<HandlerResult, BoxedError> {
        Ok(self.result.clone())
    }
}

/// Fails every delivery with the same message.
#[derive(Debug, Clone)]
pub struct FailingHandler {
    message: String,
}

impl FailingHandler {
    /// Fails with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait::async_trait]
impl Handler for FailingHandler {
    async fn handle(&self, _delivery: &Delivery) -> Result<HandlerResult, BoxedError> {
        Err(self.message.clone().into())
    }
}

/// Panics on every delivery with the message `handler exploded`.
#[derive(Debug, Clone, Copy)]
pub struct PanickingHandler;

#[async_trait::async_trait]
impl Handler for PanickingHandler {
    async fn handle(&self, _delivery: &Delivery) -> Result<HandlerResult, BoxedError> {
        panic!("handler exploded")
    }
}

/// Sleeps before reporting a handled event.
#[derive(Debug, Clone, Copy)]
pub struct SlowHandler {
    delay: Duration,
}

impl SlowHandler {
    /// Sleeps for `delay` on every delivery.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait::async_trait]
impl Handler for SlowHandler {
    async fn handle(&self, _delivery: &Delivery) -> Result<HandlerResult, BoxedError> {
        tokio::time::sleep(self.delay).await;
        Ok(HandlerResult::handled())
    }
}

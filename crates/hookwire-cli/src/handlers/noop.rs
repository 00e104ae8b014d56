use hookwire_core::types::{Delivery, HandlerResult};
use hookwire_core::{BoxedError, Handler};

/// Accepts every delivery as a non-target event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

impl NoopHandler {
    /// Registry name.
    pub const NAME: &'static str = "noop";
}

#[async_trait::async_trait]
impl Handler for NoopHandler {
    async fn handle(&self, _delivery: &Delivery) -> Result<HandlerResult, BoxedError> {
        Ok(HandlerResult::skipped())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::handlers::test::delivery;

    #[tokio::test]
    async fn always_skips() -> anyhow::Result<()> {
        let result = NoopHandler
            .handle(&delivery(json!({"events": [1]})))
            .await
            .map_err(|e| anyhow::anyhow!(e))?;

        assert_eq!(result, HandlerResult::skipped());
        Ok(())
    }
}

//! The capability every webhook handler implements.

use crate::BoxedError;
use crate::types::{Delivery, HandlerResult};

/// A pluggable unit of business logic run for a delivery.
///
/// Implementations decide on their own whether a delivery is relevant
/// (`is_target_event`) and what side effect to perform. Returning `Err`
/// or panicking is recorded against the handler's name by the dispatch
/// engine and never affects other handlers.
#[async_trait::async_trait]
pub trait Handler: Send + Sync {
    /// Handles one delivery.
    async fn handle(&self, delivery: &Delivery) -> Result<HandlerResult, BoxedError>;
}

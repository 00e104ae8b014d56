//! Path parameter types for HTTP handlers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Path parameters of the webhook endpoint.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
pub struct SubscriptionPathParams {
    /// Unique name of the subscription.
    pub subscription_name: String,
}

/// Path parameters for delivery record operations.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
pub struct DeliveryPathParams {
    /// Unique identifier of the delivery record.
    pub delivery_id: Uuid,
}

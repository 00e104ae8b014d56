//! Subscription response types.

use std::collections::BTreeSet;

use hookwire_core::types;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subscription as shown to operators; the secret itself is never exposed.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
pub struct Subscription {
    /// Unique subscription identifier.
    pub id: Uuid,
    /// Unique name used in the delivery URL.
    pub name: String,
    /// Identifier of the upstream resource.
    pub resource_id: String,
    /// Kind of the upstream resource.
    pub resource_type: String,
    /// Whether the handshake has completed.
    pub has_secret: bool,
    /// Names of the assigned handlers.
    pub handler_names: BTreeSet<String>,
    /// Creation timestamp.
    pub created_at: Timestamp,
}

impl Subscription {
    /// Creates a response from the engine record.
    pub fn from_model(subscription: types::Subscription) -> Self {
        Self {
            id: subscription.id,
            has_secret: subscription.has_secret(),
            name: subscription.name,
            resource_id: subscription.resource_id,
            resource_type: subscription.resource_type,
            handler_names: subscription.handler_names,
            created_at: subscription.created_at,
        }
    }

    /// Creates a list of responses from engine records.
    pub fn from_models(subscriptions: Vec<types::Subscription>) -> Vec<Self> {
        subscriptions.into_iter().map(Self::from_model).collect()
    }
}

/// Response for listing subscriptions.
pub type Subscriptions = Vec<Subscription>;

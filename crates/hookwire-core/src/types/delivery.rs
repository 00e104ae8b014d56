//! Delivery records.

use std::collections::BTreeMap;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AdditionalData, ProcessingStatus};

/// One accepted inbound delivery and its processing outcome.
///
/// `headers` and `payload` are captured once and never modified.
/// `status` and `additional_data` are written together by the dispatch engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    /// Unique identifier.
    pub id: Uuid,
    /// Subscription the delivery arrived on.
    pub subscription_id: Uuid,
    /// Request headers as received.
    pub headers: BTreeMap<String, String>,
    /// Request body as received.
    pub payload: serde_json::Value,
    /// Processing status.
    pub status: ProcessingStatus,
    /// Per-handler results and errors, absent until dispatched with handlers.
    pub additional_data: Option<AdditionalData>,
    /// Time the delivery was accepted.
    pub created_at: Timestamp,
    /// Time the dispatch outcome was written.
    pub processed_at: Option<Timestamp>,
}

/// Data for persisting a freshly accepted delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDelivery {
    /// Subscription the delivery arrived on.
    pub subscription_id: Uuid,
    /// Request headers as received.
    pub headers: BTreeMap<String, String>,
    /// Request body as received.
    pub payload: serde_json::Value,
}

impl NewDelivery {
    /// Creates a new delivery for the given subscription.
    pub fn new(
        subscription_id: Uuid,
        headers: BTreeMap<String, String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            subscription_id,
            headers,
            payload,
        }
    }
}

/// Operator filter for listing deliveries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryFilter {
    /// Only deliveries of this subscription.
    pub subscription_id: Option<Uuid>,
    /// Only deliveries in this status.
    pub status: Option<ProcessingStatus>,
}

impl DeliveryFilter {
    /// Returns whether the delivery passes the filter.
    pub fn matches(&self, delivery: &Delivery) -> bool {
        self.subscription_id
            .is_none_or(|id| id == delivery.subscription_id)
            && self.status.is_none_or(|status| status == delivery.status)
    }
}

//! Delivery response types.

use std::collections::BTreeMap;

use hookwire_core::types::{self, AdditionalData, ProcessingStatus};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Delivery listing entry, without headers and payload.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
pub struct DeliverySummary {
    /// Unique delivery identifier.
    pub id: Uuid,
    /// Subscription the delivery arrived on.
    pub subscription_id: Uuid,
    /// Processing status.
    pub status: ProcessingStatus,
    /// Time the delivery was accepted.
    pub created_at: Timestamp,
    /// Time the dispatch outcome was written.
    pub processed_at: Option<Timestamp>,
}

impl DeliverySummary {
    /// Creates a summary from the engine record.
    pub fn from_model(delivery: types::Delivery) -> Self {
        Self {
            id: delivery.id,
            subscription_id: delivery.subscription_id,
            status: delivery.status,
            created_at: delivery.created_at,
            processed_at: delivery.processed_at,
        }
    }

    /// Creates a list of summaries from engine records.
    pub fn from_models(deliveries: Vec<types::Delivery>) -> Vec<Self> {
        deliveries.into_iter().map(Self::from_model).collect()
    }
}

/// Response for listing deliveries.
pub type Deliveries = Vec<DeliverySummary>;

/// Full delivery record.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
pub struct Delivery {
    /// Unique delivery identifier.
    pub id: Uuid,
    /// Subscription the delivery arrived on.
    pub subscription_id: Uuid,
    /// Request headers as received.
    pub headers: BTreeMap<String, String>,
    /// Request body as received.
    pub payload: serde_json::Value,
    /// Processing status.
    pub status: ProcessingStatus,
    /// Per-handler results and errors, `{}` when nothing was recorded.
    pub additional_data: serde_json::Value,
    /// Time the delivery was accepted.
    pub created_at: Timestamp,
    /// Time the dispatch outcome was written.
    pub processed_at: Option<Timestamp>,
}

impl Delivery {
    /// Creates a response from the engine record.
    pub fn from_model(delivery: types::Delivery) -> Self {
        Self {
            additional_data: AdditionalData::to_stored_value(delivery.additional_data.as_ref()),
            id: delivery.id,
            subscription_id: delivery.subscription_id,
            headers: delivery.headers,
            payload: delivery.payload,
            status: delivery.status,
            created_at: delivery.created_at,
            processed_at: delivery.processed_at,
        }
    }
}

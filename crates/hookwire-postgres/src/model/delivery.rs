//! Delivery model for PostgreSQL database operations.

use diesel::prelude::*;
use hookwire_core::types::{self, AdditionalData};
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::deliveries;
use crate::types::ProcessingStatus;

/// A persisted webhook request and its dispatch outcome.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = deliveries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Delivery {
    /// Unique delivery identifier.
    pub id: Uuid,
    /// Reference to the subscription that received the request.
    pub subscription_id: Uuid,
    /// Request headers as a JSON object of strings.
    pub headers: serde_json::Value,
    /// Request body.
    pub payload: serde_json::Value,
    /// Dispatch outcome.
    pub status: ProcessingStatus,
    /// Per-handler results and errors, `{}` until dispatched.
    pub additional_data: serde_json::Value,
    /// Timestamp when the request was accepted.
    pub created_at: Timestamp,
    /// Timestamp when the outcome was written.
    pub processed_at: Option<Timestamp>,
}

/// Data structure for inserting a new delivery.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = deliveries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewDelivery {
    /// Reference to the subscription that received the request.
    pub subscription_id: Uuid,
    /// Request headers as a JSON object of strings.
    pub headers: serde_json::Value,
    /// Request body.
    pub payload: serde_json::Value,
}

/// Changes written when a delivery reaches its terminal status.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = deliveries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CompleteDelivery {
    /// Terminal status.
    pub status: ProcessingStatus,
    /// Per-handler results and errors.
    pub additional_data: serde_json::Value,
}

impl CompleteDelivery {
    /// Builds the changeset for the given outcome.
    pub fn new(status: types::ProcessingStatus, additional_data: Option<&AdditionalData>) -> Self {
        Self {
            status: status.into(),
            additional_data: AdditionalData::to_stored_value(additional_data),
        }
    }
}

impl TryFrom<types::NewDelivery> for NewDelivery {
    type Error = serde_json::Error;

    fn try_from(delivery: types::NewDelivery) -> Result<Self, Self::Error> {
        Ok(Self {
            subscription_id: delivery.subscription_id,
            headers: serde_json::to_value(delivery.headers)?,
            payload: delivery.payload,
        })
    }
}

impl TryFrom<Delivery> for types::Delivery {
    type Error = serde_json::Error;

    fn try_from(delivery: Delivery) -> Result<Self, Self::Error> {
        Ok(Self {
            id: delivery.id,
            subscription_id: delivery.subscription_id,
            headers: serde_json::from_value(delivery.headers)?,
            payload: delivery.payload,
            status: delivery.status.into(),
            additional_data: AdditionalData::from_stored_value(delivery.additional_data)?,
            created_at: delivery.created_at.into(),
            processed_at: delivery.processed_at.map(Into::into),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use hookwire_core::types::HandlerResult;
    use serde_json::json;

    use super::*;

    fn row(additional_data: serde_json::Value) -> Delivery {
        Delivery {
            id: Uuid::now_v7(),
            subscription_id: Uuid::now_v7(),
            headers: json!({ "content-type": "application/json" }),
            payload: json!({ "event": "push" }),
            status: ProcessingStatus::Pending,
            additional_data,
            created_at: jiff::Timestamp::UNIX_EPOCH.into(),
            processed_at: None,
        }
    }

    #[test]
    fn test_pending_row_has_no_additional_data() -> anyhow::Result<()> {
        let delivery = types::Delivery::try_from(row(json!({})))?;
        assert!(delivery.additional_data.is_none());
        assert_eq!(delivery.headers["content-type"], "application/json");
        Ok(())
    }

    #[test]
    fn test_complete_changeset_stores_results() -> anyhow::Result<()> {
        let data = AdditionalData {
            handler_results: BTreeMap::from([("noop".to_owned(), HandlerResult::handled())]),
            errors: BTreeMap::from([("broken".to_owned(), "boom".to_owned())]),
        };

        let changes = CompleteDelivery::new(types::ProcessingStatus::Partial, Some(&data));
        assert_eq!(changes.status, ProcessingStatus::Partial);
        assert_eq!(changes.additional_data["errors"]["broken"], "boom");

        let mut stored = row(changes.additional_data);
        stored.status = changes.status;
        let delivery = types::Delivery::try_from(stored)?;
        assert_eq!(delivery.additional_data, Some(data));
        Ok(())
    }

    #[test]
    fn test_no_handlers_changeset_stores_empty_object() {
        let changes = CompleteDelivery::new(types::ProcessingStatus::NoHandlers, None);
        assert_eq!(changes.additional_data, json!({}));
    }
}

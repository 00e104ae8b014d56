//! Webhook handler catalog model.

use diesel::prelude::*;
use hookwire_core::types::{CatalogHandler, HandlerDescriptor};
use jiff_diesel::Timestamp;

use crate::schema::webhook_handlers;

/// A catalog row mirroring a registered handler.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = webhook_handlers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WebhookHandler {
    /// Registered handler name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Timestamp when this row was created.
    pub created_at: Timestamp,
    /// Timestamp when the description was last synchronized.
    pub updated_at: Timestamp,
}

/// Data structure for inserting a catalog row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = webhook_handlers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewWebhookHandler {
    /// Registered handler name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
}

impl From<&HandlerDescriptor> for NewWebhookHandler {
    fn from(descriptor: &HandlerDescriptor) -> Self {
        Self {
            name: descriptor.name.clone(),
            description: descriptor.description.clone(),
        }
    }
}

impl From<WebhookHandler> for CatalogHandler {
    fn from(handler: WebhookHandler) -> Self {
        Self {
            name: handler.name,
            description: handler.description,
            created_at: handler.created_at.into(),
            updated_at: handler.updated_at.into(),
        }
    }
}

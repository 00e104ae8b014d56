//! Handler catalog response types.

use hookwire_core::HandlerRegistry;
use hookwire_core::types::CatalogHandler;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A persisted handler catalog row.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookHandler {
    /// Unique handler name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Whether this process has an implementation registered under the name.
    pub is_registered: bool,
    /// Creation timestamp.
    pub created_at: Timestamp,
    /// Timestamp of the last synchronization that touched the row.
    pub updated_at: Timestamp,
}

impl WebhookHandler {
    /// Creates a response from a catalog row.
    pub fn from_model(handler: CatalogHandler, registry: &HandlerRegistry) -> Self {
        Self {
            is_registered: registry.contains(&handler.name),
            name: handler.name,
            description: handler.description,
            created_at: handler.created_at,
            updated_at: handler.updated_at,
        }
    }

    /// Creates a list of responses from catalog rows.
    pub fn from_models(handlers: Vec<CatalogHandler>, registry: &HandlerRegistry) -> Vec<Self> {
        handlers
            .into_iter()
            .map(|handler| Self::from_model(handler, registry))
            .collect()
    }
}

/// Response for listing the handler catalog.
pub type WebhookHandlers = Vec<WebhookHandler>;

//! Persisted mirror of the handler registry.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Name and description of a registered handler.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandlerDescriptor {
    /// Unique handler name.
    pub name: String,
    /// Operator-facing description.
    pub description: String,
}

impl HandlerDescriptor {
    /// Creates a new descriptor.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// A row of the persisted handler catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogHandler {
    /// Unique handler name.
    pub name: String,
    /// Operator-facing description.
    pub description: String,
    /// Time the row was created by the synchronizer.
    pub created_at: Timestamp,
    /// Time the row was last rewritten by the synchronizer.
    pub updated_at: Timestamp,
}

/// Counts reported by one catalog synchronization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Catalog rows removed because their handler is no longer registered.
    pub deleted: usize,
    /// Names of the removed rows, sorted.
    #[serde(default)]
    pub deleted_names: Vec<String>,
    /// Catalog rows created for newly registered handlers.
    pub created: usize,
    /// Catalog rows whose description was rewritten.
    pub updated: usize,
}

impl std::fmt::Display for SyncReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "deleted={} created={} updated={}",
            self.deleted, self.created, self.updated
        )
    }
}

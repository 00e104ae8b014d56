//! Storage and job-substrate interfaces consumed by the engine.
//!
//! Backends implement these traits; the engine and the HTTP layer only see
//! `Arc<dyn ...>` handles. Every method is fallible with a storage or queue
//! error, which the engine propagates instead of swallowing.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Result;
use crate::types::{
    AdditionalData, CatalogHandler, Delivery, DeliveryFilter, DispatchJob, HandlerDescriptor,
    NewDelivery, NewSubscription, ProcessingStatus, Subscription, SyncReport,
};

/// Default number of records per page.
pub const DEFAULT_PAGE_LIMIT: i64 = 50;

/// Maximum number of records per page.
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Limit/offset pagination for operator listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Maximum number of records to return.
    pub limit: i64,
    /// Number of records to skip.
    pub offset: i64,
}

impl Pagination {
    /// Creates a new pagination, clamping both values into range.
    pub fn new(limit: i64, offset: i64) -> Self {
        Self {
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
            offset: offset.max(0),
        }
    }

    /// Builds a pagination from optional query values.
    pub fn from_query(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self::new(
            limit.unwrap_or(DEFAULT_PAGE_LIMIT),
            offset.unwrap_or_default(),
        )
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_LIMIT, 0)
    }
}

/// Persistent access to subscriptions.
#[async_trait::async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Finds a subscription by its unique name.
    async fn find_subscription_by_name(&self, name: &str) -> Result<Option<Subscription>>;

    /// Finds a subscription by id.
    async fn find_subscription(&self, id: Uuid) -> Result<Option<Subscription>>;

    /// Stores `secret` unless the subscription already has one.
    ///
    /// Returns `false` when a secret was already established, in which case
    /// nothing is written.
    async fn establish_secret(&self, id: Uuid, secret: &str) -> Result<bool>;

    /// Creates a subscription with no secret and no handlers.
    async fn create_subscription(&self, subscription: NewSubscription) -> Result<Subscription>;

    /// Replaces the set of handler names assigned to a subscription.
    async fn assign_handlers(&self, id: Uuid, handler_names: &[String]) -> Result<Subscription>;

    /// Lists subscriptions, newest first.
    async fn list_subscriptions(&self, pagination: Pagination) -> Result<Vec<Subscription>>;
}

/// Persistent access to delivery records.
#[async_trait::async_trait]
pub trait DeliveryStore: Send + Sync {
    /// Persists a new delivery in the `pending` status.
    async fn create_delivery(&self, delivery: NewDelivery) -> Result<Delivery>;

    /// Finds a delivery by id.
    async fn find_delivery(&self, id: Uuid) -> Result<Option<Delivery>>;

    /// Writes the dispatch outcome in one atomic update.
    ///
    /// Only a `pending` delivery can be completed; completing any other
    /// delivery fails with [`ErrorKind::Conflict`](crate::ErrorKind::Conflict).
    async fn complete_delivery(
        &self,
        id: Uuid,
        status: ProcessingStatus,
        additional_data: Option<&AdditionalData>,
    ) -> Result<Delivery>;

    /// Lists deliveries matching `filter`, newest first.
    async fn list_deliveries(
        &self,
        filter: &DeliveryFilter,
        pagination: Pagination,
    ) -> Result<Vec<Delivery>>;
}

/// The persisted handler catalog operators assign handlers from.
#[async_trait::async_trait]
pub trait HandlerCatalog: Send + Sync {
    /// Reconciles the catalog with `descriptors` inside a single transaction.
    async fn sync_catalog(&self, descriptors: &[HandlerDescriptor]) -> Result<SyncReport>;

    /// Lists catalog rows ordered by name.
    async fn list_handlers(&self) -> Result<Vec<CatalogHandler>>;
}

/// The asynchronous substrate that runs dispatch jobs.
#[async_trait::async_trait]
pub trait DispatchQueue: Send + Sync {
    /// Enqueues a dispatch job, optionally delayed.
    async fn enqueue(&self, job: DispatchJob, delay: Option<Duration>) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_clamps() {
        assert_eq!(Pagination::new(0, -5), Pagination { limit: 1, offset: 0 });
        assert_eq!(Pagination::new(5000, 10).limit, MAX_PAGE_LIMIT);
        assert_eq!(Pagination::from_query(None, None), Pagination::default());
        assert_eq!(Pagination::default().limit, DEFAULT_PAGE_LIMIT);
    }
}

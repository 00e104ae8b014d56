//! In-memory store implementing every storage trait.

use std::collections::{BTreeMap, BTreeSet};

use jiff::Timestamp;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::{DeliveryStore, HandlerCatalog, Pagination, SubscriptionStore};
use crate::sync::SyncPlan;
use crate::types::{
    AdditionalData, CatalogHandler, Delivery, DeliveryFilter, HandlerDescriptor, NewDelivery,
    NewSubscription, ProcessingStatus, Subscription, SyncReport,
};
use crate::{Error, Result};

#[derive(Debug, Default)]
struct Tables {
    subscriptions: BTreeMap<Uuid, Subscription>,
    deliveries: BTreeMap<Uuid, Delivery>,
    handlers: BTreeMap<String, CatalogHandler>,
}

/// Subscriptions, deliveries and the handler catalog kept in memory.
///
/// Ids are UUIDv7, so iterating the maps in reverse yields newest first.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored deliveries.
    pub async fn delivery_count(&self) -> usize {
        self.tables.read().await.deliveries.len()
    }
}

fn paginate<T>(items: impl Iterator<Item = T>, pagination: Pagination) -> Vec<T> {
    items
        .skip(usize::try_from(pagination.offset).unwrap_or_default())
        .take(usize::try_from(pagination.limit).unwrap_or_default())
        .collect()
}

#[async_trait::async_trait]
impl SubscriptionStore for MemoryStore {
    async fn find_subscription_by_name(&self, name: &str) -> Result<Option<Subscription>> {
        let tables = self.tables.read().await;
        Ok(tables
            .subscriptions
            .values()
            .find(|subscription| subscription.name == name)
            .cloned())
    }

    async fn find_subscription(&self, id: Uuid) -> Result<Option<Subscription>> {
        Ok(self.tables.read().await.subscriptions.get(&id).cloned())
    }

    async fn establish_secret(&self, id: Uuid, secret: &str) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let subscription = tables
            .subscriptions
            .get_mut(&id)
            .ok_or_else(|| Error::not_found(format!("subscription {id} not found")))?;

        if subscription.has_secret() {
            return Ok(false);
        }

        subscription.secret = Some(secret.to_owned());
        Ok(true)
    }

    async fn create_subscription(&self, subscription: NewSubscription) -> Result<Subscription> {
        let mut tables = self.tables.write().await;
        if tables
            .subscriptions
            .values()
            .any(|existing| existing.name == subscription.name)
        {
            return Err(Error::conflict(format!(
                "subscription '{}' already exists",
                subscription.name
            )));
        }

        let subscription = Subscription {
            id: Uuid::now_v7(),
            name: subscription.name,
            resource_id: subscription.resource_id,
            resource_type: subscription.resource_type,
            secret: None,
            handler_names: BTreeSet::new(),
            created_at: Timestamp::now(),
        };

        tables
            .subscriptions
            .insert(subscription.id, subscription.clone());
        Ok(subscription)
    }

    async fn assign_handlers(&self, id: Uuid, handler_names: &[String]) -> Result<Subscription> {
        let mut tables = self.tables.write().await;
        let subscription = tables
            .subscriptions
            .get_mut(&id)
            .ok_or_else(|| Error::not_found(format!("subscription {id} not found")))?;

        subscription.handler_names = handler_names.iter().cloned().collect();
        Ok(subscription.clone())
    }

    async fn list_subscriptions(&self, pagination: Pagination) -> Result<Vec<Subscription>> {
        let tables = self.tables.read().await;
        Ok(paginate(
            tables.subscriptions.values().rev().cloned(),
            pagination,
        ))
    }
}

#[async_trait::async_trait]
impl DeliveryStore for MemoryStore {
    async fn create_delivery(&self, delivery: NewDelivery) -> Result<Delivery> {
        let mut tables = self.tables.write().await;
        if !tables.subscriptions.contains_key(&delivery.subscription_id) {
            return Err(Error::not_found(format!(
                "subscription {} not found",
                delivery.subscription_id
            )));
        }

        let delivery = Delivery {
            id: Uuid::now_v7(),
            subscription_id: delivery.subscription_id,
            headers: delivery.headers,
            payload: delivery.payload,
            status: ProcessingStatus::Pending,
            additional_data: None,
            created_at: Timestamp::now(),
            processed_at: None,
        };

        tables.deliveries.insert(delivery.id, delivery.clone());
        Ok(delivery)
    }

    async fn find_delivery(&self, id: Uuid) -> Result<Option<Delivery>> {
        Ok(self.tables.read().await.deliveries.get(&id).cloned())
    }

    async fn complete_delivery(
        &self,
        id: Uuid,
        status: ProcessingStatus,
        additional_data: Option<&AdditionalData>,
    ) -> Result<Delivery> {
        let mut tables = self.tables.write().await;
        let delivery = tables
            .deliveries
            .get_mut(&id)
            .ok_or_else(|| Error::not_found(format!("delivery {id} not found")))?;

        if delivery.status.is_terminal() {
            return Err(Error::conflict(format!(
                "delivery {id} is already {}",
                delivery.status
            )));
        }

        delivery.status = status;
        delivery.additional_data = additional_data.cloned();
        delivery.processed_at = Some(Timestamp::now());
        Ok(delivery.clone())
    }

    async fn list_deliveries(
        &self,
        filter: &DeliveryFilter,
        pagination: Pagination,
    ) -> Result<Vec<Delivery>> {
        let tables = self.tables.read().await;
        Ok(paginate(
            tables
                .deliveries
                .values()
                .rev()
                .filter(|delivery| filter.matches(delivery))
                .cloned(),
            pagination,
        ))
    }
}

#[async_trait::async_trait]
impl HandlerCatalog for MemoryStore {
    async fn sync_catalog(&self, descriptors: &[HandlerDescriptor]) -> Result<SyncReport> {
        let mut tables = self.tables.write().await;
        let plan = SyncPlan::new(tables.handlers.keys().cloned(), descriptors);
        let now = Timestamp::now();

        for name in &plan.to_delete {
            tables.handlers.remove(name);
        }

        for descriptor in &plan.to_update {
            if let Some(handler) = tables.handlers.get_mut(&descriptor.name) {
                handler.description = descriptor.description.clone();
                handler.updated_at = now;
            }
        }

        for descriptor in &plan.to_create {
            tables.handlers.insert(
                descriptor.name.clone(),
                CatalogHandler {
                    name: descriptor.name.clone(),
                    description: descriptor.description.clone(),
                    created_at: now,
                    updated_at: now,
                },
            );
        }

        Ok(plan.report())
    }

    async fn list_handlers(&self) -> Result<Vec<CatalogHandler>> {
        Ok(self.tables.read().await.handlers.values().cloned().collect())
    }
}

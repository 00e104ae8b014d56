//! Engine storage traits implemented for [`PgClient`].

use diesel_async::scoped_futures::ScopedFutureExt;
use hookwire_core::store::{DeliveryStore, HandlerCatalog, Pagination, SubscriptionStore};
use hookwire_core::sync::SyncPlan;
use hookwire_core::types::{
    AdditionalData, CatalogHandler, Delivery, DeliveryFilter, HandlerDescriptor, NewDelivery,
    NewSubscription, ProcessingStatus, Subscription, SyncReport,
};
use hookwire_core::{Error, Result};
use uuid::Uuid;

use crate::model::{self, CompleteDelivery, NewWebhookHandler};
use crate::query::{DeliveryRepository, SubscriptionRepository, WebhookHandlerRepository};
use crate::{PgClient, PgError, TRACING_TARGET_QUERY};

#[async_trait::async_trait]
impl SubscriptionStore for PgClient {
    async fn find_subscription_by_name(&self, name: &str) -> Result<Option<Subscription>> {
        let mut conn = self.get_connection().await?;
        let subscription = conn.find_subscription_by_name(name).await?;
        Ok(subscription.map(Into::into))
    }

    async fn find_subscription(&self, id: Uuid) -> Result<Option<Subscription>> {
        let mut conn = self.get_connection().await?;
        let subscription = conn.find_subscription_by_id(id).await?;
        Ok(subscription.map(Into::into))
    }

    async fn establish_secret(&self, id: Uuid, secret: &str) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        Ok(conn.establish_subscription_secret(id, secret).await?)
    }

    async fn create_subscription(&self, subscription: NewSubscription) -> Result<Subscription> {
        let name = subscription.name.clone();
        let mut conn = self.get_connection().await?;
        let subscription = conn
            .create_subscription(subscription.into())
            .await
            .map_err(|err| {
                if err.is_unique_violation() {
                    Error::conflict(format!("subscription '{name}' already exists"))
                } else {
                    Error::from(err)
                }
            })?;

        Ok(subscription.into())
    }

    async fn assign_handlers(&self, id: Uuid, handler_names: &[String]) -> Result<Subscription> {
        let mut conn = self.get_connection().await?;
        conn.set_subscription_handlers(id, handler_names.to_vec())
            .await?
            .map(Into::into)
            .ok_or_else(|| Error::not_found(format!("subscription {id} not found")))
    }

    async fn list_subscriptions(&self, pagination: Pagination) -> Result<Vec<Subscription>> {
        let mut conn = self.get_connection().await?;
        let rows = conn.list_subscriptions(pagination).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait::async_trait]
impl DeliveryStore for PgClient {
    async fn create_delivery(&self, delivery: NewDelivery) -> Result<Delivery> {
        let subscription_id = delivery.subscription_id;
        let new_delivery = model::NewDelivery::try_from(delivery)?;

        let mut conn = self.get_connection().await?;
        let row = conn
            .create_delivery(new_delivery)
            .await
            .map_err(|err| {
                if err.is_foreign_key_violation() {
                    Error::not_found(format!("subscription {subscription_id} not found"))
                } else {
                    Error::from(err)
                }
            })?;

        Ok(row.try_into()?)
    }

    async fn find_delivery(&self, id: Uuid) -> Result<Option<Delivery>> {
        let mut conn = self.get_connection().await?;
        match conn.find_delivery_by_id(id).await? {
            Some(row) => Ok(Some(row.try_into()?)),
            None => Ok(None),
        }
    }

    async fn complete_delivery(
        &self,
        id: Uuid,
        status: ProcessingStatus,
        additional_data: Option<&AdditionalData>,
    ) -> Result<Delivery> {
        let changes = CompleteDelivery::new(status, additional_data);

        let mut conn = self.get_connection().await?;
        if let Some(row) = conn.complete_pending_delivery(id, changes).await? {
            return Ok(row.try_into()?);
        }

        // Nothing pending was updated: tell a missing row from a finished one.
        match conn.find_delivery_by_id(id).await? {
            Some(row) => Err(Error::conflict(format!(
                "delivery {id} is already {}",
                row.status
            ))),
            None => Err(Error::not_found(format!("delivery {id} not found"))),
        }
    }

    async fn list_deliveries(
        &self,
        filter: &DeliveryFilter,
        pagination: Pagination,
    ) -> Result<Vec<Delivery>> {
        let mut conn = self.get_connection().await?;
        let rows = conn
            .list_deliveries(
                filter.subscription_id,
                filter.status.map(Into::into),
                pagination,
            )
            .await?;

        rows.into_iter()
            .map(|row| Delivery::try_from(row).map_err(Error::from))
            .collect()
    }
}

#[async_trait::async_trait]
impl HandlerCatalog for PgClient {
    async fn sync_catalog(&self, descriptors: &[HandlerDescriptor]) -> Result<SyncReport> {
        let mut conn = self.get_connection().await?;

        let report = conn
            .transaction::<_, PgError, _>(|conn| {
                async move {
                    let existing = conn.list_webhook_handler_names().await?;
                    let plan = SyncPlan::new(existing, descriptors);

                    conn.delete_webhook_handlers(plan.to_delete.iter().cloned().collect())
                        .await?;

                    for descriptor in &plan.to_update {
                        conn.update_webhook_handler_description(
                            &descriptor.name,
                            &descriptor.description,
                        )
                        .await?;
                    }

                    let new_handlers = plan
                        .to_create
                        .iter()
                        .map(|descriptor| NewWebhookHandler::from(*descriptor))
                        .collect();
                    conn.create_webhook_handlers(new_handlers).await?;

                    Ok(plan.report())
                }
                .scope_boxed()
            })
            .await?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            deleted = report.deleted,
            created = report.created,
            updated = report.updated,
            "Handler catalog transaction committed"
        );

        Ok(report)
    }

    async fn list_handlers(&self) -> Result<Vec<CatalogHandler>> {
        let mut conn = self.get_connection().await?;
        let rows = conn.list_webhook_handlers().await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

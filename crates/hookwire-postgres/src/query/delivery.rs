//! Delivery repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use super::Pagination;
use crate::model::{CompleteDelivery, Delivery, NewDelivery};
use crate::types::ProcessingStatus;
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for delivery database operations.
pub trait DeliveryRepository {
    /// Inserts a new pending delivery.
    fn create_delivery(
        &mut self,
        new_delivery: NewDelivery,
    ) -> impl Future<Output = PgResult<Delivery>> + Send;

    /// Finds a delivery by ID.
    fn find_delivery_by_id(
        &mut self,
        delivery_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Delivery>>> + Send;

    /// Writes the terminal status and additional data of a pending delivery.
    ///
    /// Returns `None` when no pending delivery with this ID exists.
    fn complete_pending_delivery(
        &mut self,
        delivery_id: Uuid,
        changes: CompleteDelivery,
    ) -> impl Future<Output = PgResult<Option<Delivery>>> + Send;

    /// Lists deliveries, newest first, optionally narrowed by subscription and status.
    fn list_deliveries(
        &mut self,
        by_subscription: Option<Uuid>,
        by_status: Option<ProcessingStatus>,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<Delivery>>> + Send;
}

impl DeliveryRepository for PgConnection {
    async fn create_delivery(&mut self, new_delivery: NewDelivery) -> PgResult<Delivery> {
        use schema::deliveries;

        let delivery = diesel::insert_into(deliveries::table)
            .values(&new_delivery)
            .returning(Delivery::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(delivery)
    }

    async fn find_delivery_by_id(&mut self, delivery_id: Uuid) -> PgResult<Option<Delivery>> {
        use schema::deliveries::dsl::*;

        let delivery = deliveries
            .filter(id.eq(delivery_id))
            .select(Delivery::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(delivery)
    }

    async fn complete_pending_delivery(
        &mut self,
        delivery_id: Uuid,
        changes: CompleteDelivery,
    ) -> PgResult<Option<Delivery>> {
        use diesel::dsl::now;
        use schema::deliveries::dsl::*;

        let delivery = diesel::update(deliveries)
            .filter(id.eq(delivery_id))
            .filter(status.eq(ProcessingStatus::Pending))
            .set((&changes, processed_at.eq(now)))
            .returning(Delivery::as_returning())
            .get_result(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(delivery)
    }

    async fn list_deliveries(
        &mut self,
        by_subscription: Option<Uuid>,
        by_status: Option<ProcessingStatus>,
        pagination: Pagination,
    ) -> PgResult<Vec<Delivery>> {
        use schema::deliveries::dsl::*;

        let mut query = deliveries.select(Delivery::as_select()).into_boxed();

        if let Some(by_subscription) = by_subscription {
            query = query.filter(subscription_id.eq(by_subscription));
        }

        if let Some(by_status) = by_status {
            query = query.filter(status.eq(by_status));
        }

        let rows = query
            .order((created_at.desc(), id.desc()))
            .limit(pagination.limit)
            .offset(pagination.offset)
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(rows)
    }
}

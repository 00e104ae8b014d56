//! Subscription repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use super::Pagination;
use crate::model::{NewSubscription, Subscription};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for subscription database operations.
pub trait SubscriptionRepository {
    /// Creates a new subscription.
    fn create_subscription(
        &mut self,
        new_subscription: NewSubscription,
    ) -> impl Future<Output = PgResult<Subscription>> + Send;

    /// Finds a subscription by ID.
    fn find_subscription_by_id(
        &mut self,
        subscription_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Subscription>>> + Send;

    /// Finds a subscription by its unique name.
    fn find_subscription_by_name(
        &mut self,
        subscription_name: &str,
    ) -> impl Future<Output = PgResult<Option<Subscription>>> + Send;

    /// Stores the handshake secret if none is set yet.
    ///
    /// Returns whether the row was written.
    fn establish_subscription_secret(
        &mut self,
        subscription_id: Uuid,
        new_secret: &str,
    ) -> impl Future<Output = PgResult<bool>> + Send;

    /// Replaces the assigned handler names.
    fn set_subscription_handlers(
        &mut self,
        subscription_id: Uuid,
        names: Vec<String>,
    ) -> impl Future<Output = PgResult<Option<Subscription>>> + Send;

    /// Lists subscriptions, newest first.
    fn list_subscriptions(
        &mut self,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<Subscription>>> + Send;
}

impl SubscriptionRepository for PgConnection {
    async fn create_subscription(
        &mut self,
        new_subscription: NewSubscription,
    ) -> PgResult<Subscription> {
        use schema::subscriptions;

        let subscription = diesel::insert_into(subscriptions::table)
            .values(&new_subscription)
            .returning(Subscription::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(subscription)
    }

    async fn find_subscription_by_id(
        &mut self,
        subscription_id: Uuid,
    ) -> PgResult<Option<Subscription>> {
        use schema::subscriptions::dsl::*;

        let subscription = subscriptions
            .filter(id.eq(subscription_id))
            .select(Subscription::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(subscription)
    }

    async fn find_subscription_by_name(
        &mut self,
        subscription_name: &str,
    ) -> PgResult<Option<Subscription>> {
        use schema::subscriptions::dsl::*;

        let subscription = subscriptions
            .filter(name.eq(subscription_name))
            .select(Subscription::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(subscription)
    }

    async fn establish_subscription_secret(
        &mut self,
        subscription_id: Uuid,
        new_secret: &str,
    ) -> PgResult<bool> {
        use schema::subscriptions::dsl::*;

        // Conditional write: the first concurrent request wins.
        let updated = diesel::update(subscriptions)
            .filter(id.eq(subscription_id))
            .filter(secret.is_null().or(secret.eq("")))
            .set(secret.eq(new_secret))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(updated == 1)
    }

    async fn set_subscription_handlers(
        &mut self,
        subscription_id: Uuid,
        names: Vec<String>,
    ) -> PgResult<Option<Subscription>> {
        use schema::subscriptions::dsl::*;

        let names: Vec<Option<String>> = names.into_iter().map(Some).collect();
        let subscription = diesel::update(subscriptions)
            .filter(id.eq(subscription_id))
            .set(handler_names.eq(names))
            .returning(Subscription::as_returning())
            .get_result(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(subscription)
    }

    async fn list_subscriptions(&mut self, pagination: Pagination) -> PgResult<Vec<Subscription>> {
        use schema::subscriptions::dsl::*;

        let rows = subscriptions
            .select(Subscription::as_select())
            .order((created_at.desc(), id.desc()))
            .limit(pagination.limit)
            .offset(pagination.offset)
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(rows)
    }
}

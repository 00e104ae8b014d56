//! Webhook handler catalog repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::model::{NewWebhookHandler, WebhookHandler};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for handler catalog database operations.
pub trait WebhookHandlerRepository {
    /// Lists the names of every catalog row.
    fn list_webhook_handler_names(&mut self)
    -> impl Future<Output = PgResult<Vec<String>>> + Send;

    /// Lists catalog rows ordered by name.
    fn list_webhook_handlers(&mut self)
    -> impl Future<Output = PgResult<Vec<WebhookHandler>>> + Send;

    /// Inserts new catalog rows.
    fn create_webhook_handlers(
        &mut self,
        new_handlers: Vec<NewWebhookHandler>,
    ) -> impl Future<Output = PgResult<usize>> + Send;

    /// Overwrites the description of an existing row.
    fn update_webhook_handler_description(
        &mut self,
        handler_name: &str,
        new_description: &str,
    ) -> impl Future<Output = PgResult<usize>> + Send;

    /// Deletes the named catalog rows.
    fn delete_webhook_handlers(
        &mut self,
        handler_names: Vec<String>,
    ) -> impl Future<Output = PgResult<usize>> + Send;
}

impl WebhookHandlerRepository for PgConnection {
    async fn list_webhook_handler_names(&mut self) -> PgResult<Vec<String>> {
        use schema::webhook_handlers::dsl::*;

        let names = webhook_handlers
            .select(name)
            .order(name.asc())
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(names)
    }

    async fn list_webhook_handlers(&mut self) -> PgResult<Vec<WebhookHandler>> {
        use schema::webhook_handlers::dsl::*;

        let handlers = webhook_handlers
            .select(WebhookHandler::as_select())
            .order(name.asc())
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(handlers)
    }

    async fn create_webhook_handlers(
        &mut self,
        new_handlers: Vec<NewWebhookHandler>,
    ) -> PgResult<usize> {
        use schema::webhook_handlers;

        if new_handlers.is_empty() {
            return Ok(0);
        }

        diesel::insert_into(webhook_handlers::table)
            .values(&new_handlers)
            .execute(self)
            .await
            .map_err(PgError::from)
    }

    async fn update_webhook_handler_description(
        &mut self,
        handler_name: &str,
        new_description: &str,
    ) -> PgResult<usize> {
        use diesel::dsl::now;
        use schema::webhook_handlers::dsl::*;

        diesel::update(webhook_handlers)
            .filter(name.eq(handler_name))
            .set((description.eq(new_description), updated_at.eq(now)))
            .execute(self)
            .await
            .map_err(PgError::from)
    }

    async fn delete_webhook_handlers(&mut self, handler_names: Vec<String>) -> PgResult<usize> {
        use schema::webhook_handlers::dsl::*;

        if handler_names.is_empty() {
            return Ok(0);
        }

        diesel::delete(webhook_handlers)
            .filter(name.eq_any(handler_names))
            .execute(self)
            .await
            .map_err(PgError::from)
    }
}

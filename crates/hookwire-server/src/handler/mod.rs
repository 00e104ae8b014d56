//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! ```rust,ignore
//! use hookwire_server::handler::routes;
//! use hookwire_server::service::ServiceState;
//!
//! let app = routes().with_state(state);
//! ```
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod deliveries;
mod error;
mod monitors;
pub mod request;
pub mod response;
mod subscriptions;
mod webhook_handlers;
mod webhooks;

use axum::Router;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
use crate::service::ServiceState;

#[inline]
async fn fallback() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with every route.
///
/// Webhook intake is public by nature; the operator reads carry no
/// authentication and are expected behind a private network boundary.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .merge(webhooks::routes())
        .merge(deliveries::routes())
        .merge(subscriptions::routes())
        .merge(webhook_handlers::routes())
        .merge(monitors::routes())
        .fallback(fallback)
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use axum_test::TestServer;
    use hookwire_core::HandlerRegistry;
    use hookwire_core::mock::{MemoryQueue, MemoryStore};
    use hookwire_core::store::SubscriptionStore;
    use hookwire_core::types::{NewSubscription, Subscription};

    use crate::handler::routes;
    use crate::service::ServiceState;

    /// In-memory backends behind a running test server.
    pub struct TestContext {
        pub server: TestServer,
        pub store: Arc<MemoryStore>,
        pub queue: Arc<MemoryQueue>,
        pub state: ServiceState,
    }

    impl TestContext {
        /// Creates a subscription without a secret.
        pub async fn subscription(&self, name: &str) -> anyhow::Result<Subscription> {
            let subscription = self
                .store
                .create_subscription(NewSubscription {
                    name: name.to_owned(),
                    resource_id: "1200".to_owned(),
                    resource_type: "project".to_owned(),
                })
                .await?;
            Ok(subscription)
        }

        /// Creates a subscription whose handshake already completed.
        pub async fn verified_subscription(
            &self,
            name: &str,
            secret: &str,
        ) -> anyhow::Result<Subscription> {
            let subscription = self.subscription(name).await?;
            self.store.establish_secret(subscription.id, secret).await?;
            Ok(subscription)
        }
    }

    /// Returns a new [`TestContext`] over the given registry.
    pub fn create_test_context(registry: HandlerRegistry) -> anyhow::Result<TestContext> {
        let store = Arc::new(MemoryStore::new());
        let queue = Arc::new(MemoryQueue::new());
        let state = ServiceState::from_store(Arc::new(registry), store.clone(), queue.clone());

        let server = TestServer::new(routes().with_state(state.clone()))?;
        Ok(TestContext {
            server,
            store,
            queue,
            state,
        })
    }

    /// Returns a new [`TestContext`] with an empty registry.
    pub fn create_test_server() -> anyhow::Result<TestContext> {
        create_test_context(HandlerRegistry::new())
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() -> anyhow::Result<()> {
        let context = create_test_server()?;
        let response = context.server.get("/nowhere").await;
        response.assert_status_not_found();

        let body: serde_json::Value = response.json();
        assert_eq!(body["name"], "not_found");
        Ok(())
    }
}

use std::sync::Arc;

use hookwire_core::store::{DeliveryStore, DispatchQueue, HandlerCatalog, SubscriptionStore};
use hookwire_core::{AdmissionGate, Dispatcher, HandlerRegistry};
use hookwire_nats::queue::DispatchStream;

use crate::service::{NatsDispatchQueue, Result, ServiceConfig, TRACING_TARGET};
use crate::worker::DispatchWorker;

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    gate: AdmissionGate,
    dispatcher: Dispatcher,

    subscriptions: Arc<dyn SubscriptionStore>,
    deliveries: Arc<dyn DeliveryStore>,
    catalog: Arc<dyn HandlerCatalog>,
    queue: Arc<dyn DispatchQueue>,
}

impl ServiceState {
    /// Creates state over explicit storage and queue backends.
    pub fn new(
        registry: Arc<HandlerRegistry>,
        subscriptions: Arc<dyn SubscriptionStore>,
        deliveries: Arc<dyn DeliveryStore>,
        catalog: Arc<dyn HandlerCatalog>,
        queue: Arc<dyn DispatchQueue>,
    ) -> Self {
        Self {
            gate: AdmissionGate::new(subscriptions.clone()),
            dispatcher: Dispatcher::new(registry, subscriptions.clone(), deliveries.clone()),
            subscriptions,
            deliveries,
            catalog,
            queue,
        }
    }

    /// Creates state over a single backend implementing every store.
    pub fn from_store<S>(
        registry: Arc<HandlerRegistry>,
        store: Arc<S>,
        queue: Arc<dyn DispatchQueue>,
    ) -> Self
    where
        S: SubscriptionStore + DeliveryStore + HandlerCatalog + 'static,
    {
        Self::new(registry, store.clone(), store.clone(), store, queue)
    }

    /// Initializes application state from configuration.
    ///
    /// Connects to Postgres and NATS, applies pending migrations and returns
    /// the dispatch worker consuming the same queue.
    pub async fn connect(
        config: &ServiceConfig,
        registry: Arc<HandlerRegistry>,
    ) -> Result<(Self, DispatchWorker)> {
        config.validate()?;

        let pg_client = Arc::new(config.connect_postgres().await?);
        let nats_client = config.connect_nats().await?;
        let job_queue = nats_client.job_queue::<_, DispatchStream>().await?;
        let queue = NatsDispatchQueue::new(job_queue, &config.dispatch);

        let mut state = Self::from_store(registry, pg_client, Arc::new(queue.clone()));
        state.dispatcher = state
            .dispatcher
            .with_optional_handler_timeout(config.dispatch.handler_timeout());

        let worker = DispatchWorker::new(state.dispatcher.clone(), queue, config.dispatch.clone());

        tracing::info!(
            target: TRACING_TARGET,
            handlers = state.dispatcher.registry().len(),
            "Service state initialized"
        );

        Ok((state, worker))
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(gate: AdmissionGate);
impl_di!(dispatcher: Dispatcher);

impl_di!(subscriptions: Arc<dyn SubscriptionStore>);
impl_di!(deliveries: Arc<dyn DeliveryStore>);
impl_di!(catalog: Arc<dyn HandlerCatalog>);
impl_di!(queue: Arc<dyn DispatchQueue>);

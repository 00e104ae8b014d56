//! Command implementations.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use hookwire_core::store::{HandlerCatalog, SubscriptionStore};
use hookwire_core::types::NewSubscription;
use hookwire_core::{HandlerRegistry, Synchronizer};
use hookwire_postgres::{PgClient, PgClientMigrationExt, PgConfig};
use hookwire_server::handler::routes;
use hookwire_server::middleware::{RouterObservabilityExt, RouterRecoveryExt, RouterSecurityExt};
use hookwire_server::service::ServiceState;
use tokio_util::sync::CancellationToken;

use crate::config::{
    AssignHandlersArgs, CreateSubscriptionArgs, DatabaseArgs, MiddlewareConfig, ServeArgs,
};
use crate::handlers::build_registry;
use crate::{TRACING_TARGET_COMMAND, TRACING_TARGET_SERVER_SHUTDOWN, server};

/// Serves webhooks and runs the dispatch worker until shutdown.
pub async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    args.validate()?;

    let registry = Arc::new(build_registry().context("failed to register webhook handlers")?);
    let (state, worker) = ServiceState::connect(&args.service, registry)
        .await
        .context("failed to create service state")?;

    let cancel = CancellationToken::new();
    let worker = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            let result = worker.run(cancel.clone()).await;
            cancel.cancel();
            result
        }
    });

    let router = create_router(state, &args.middleware);
    let served = server::serve_http(router, &args.server, cancel).await;

    match tokio::time::timeout(args.server.shutdown_timeout(), worker).await {
        Ok(joined) => joined
            .context("dispatch worker task panicked")?
            .context("dispatch worker failed")?,
        Err(_) => tracing::warn!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            timeout_secs = args.server.shutdown_timeout,
            "Dispatch worker did not stop before the shutdown timeout"
        ),
    }

    served?;
    Ok(())
}

/// Creates the router with all middleware layers applied.
///
/// Middleware is applied in reverse order (last added = outermost):
/// 1. Recovery (outermost) - catches panics and enforces timeouts
/// 2. Observability - request IDs and tracing spans
/// 3. Security - body limits and response headers
/// 4. Routes (innermost) - actual request handlers
fn create_router(state: ServiceState, middleware: &MiddlewareConfig) -> Router {
    routes()
        .with_state(state)
        .with_security(&middleware.security)
        .with_observability()
        .with_recovery(&middleware.recovery)
}

/// Mirrors the handler registry into the persisted catalog.
pub async fn sync_handlers(args: DatabaseArgs) -> anyhow::Result<()> {
    let registry = Arc::new(build_registry().context("failed to register webhook handlers")?);
    let catalog: Arc<dyn HandlerCatalog> = Arc::new(connect_postgres(args.postgres).await?);

    let report = Synchronizer::new(registry, catalog)
        .synchronize()
        .await
        .context("failed to synchronize webhook handlers")?;

    println!("Webhook handlers sync result: {report}");
    Ok(())
}

/// Creates a subscription without secret or handlers.
pub async fn create_subscription(args: CreateSubscriptionArgs) -> anyhow::Result<()> {
    let store = connect_postgres(args.database.postgres).await?;

    let subscription = store
        .create_subscription(NewSubscription {
            name: args.name,
            resource_id: args.resource_id,
            resource_type: args.resource_type,
        })
        .await
        .context("failed to create subscription")?;

    tracing::info!(
        target: TRACING_TARGET_COMMAND,
        subscription_id = %subscription.id,
        subscription = %subscription.name,
        "subscription created"
    );

    println!(
        "Created subscription '{}' ({})",
        subscription.name, subscription.id
    );
    Ok(())
}

/// Replaces the handler names assigned to a subscription.
///
/// Names unknown to the registry are stored anyway and reported; the dispatch
/// engine records them as per-handler errors.
pub async fn assign_handlers(args: AssignHandlersArgs) -> anyhow::Result<()> {
    let registry = build_registry().context("failed to register webhook handlers")?;
    let store = connect_postgres(args.database.postgres).await?;

    let subscription = store
        .find_subscription_by_name(&args.name)
        .await
        .context("failed to load subscription")?
        .with_context(|| format!("subscription '{}' does not exist", args.name))?;

    warn_unregistered(&registry, &args.handlers);

    let subscription = store
        .assign_handlers(subscription.id, &args.handlers)
        .await
        .context("failed to assign handlers")?;

    let assigned: Vec<&str> = subscription
        .handler_names
        .iter()
        .map(String::as_str)
        .collect();

    println!(
        "Assigned handlers to '{}': [{}]",
        subscription.name,
        assigned.join(", ")
    );
    Ok(())
}

fn warn_unregistered(registry: &HandlerRegistry, handlers: &[String]) {
    for name in handlers.iter().filter(|name| !registry.contains(name)) {
        tracing::warn!(
            target: TRACING_TARGET_COMMAND,
            handler = %name,
            "handler is not registered; deliveries will record it as an error"
        );
    }
}

/// Connects to Postgres and applies pending migrations.
async fn connect_postgres(config: PgConfig) -> anyhow::Result<PgClient> {
    let database = config.database_url_masked();
    let client = config
        .build()
        .context("failed to create database client")?;

    let migrations = client
        .run_pending_migrations()
        .await
        .context("failed to apply database migrations")?;

    tracing::info!(
        target: TRACING_TARGET_COMMAND,
        database = %database,
        migrations = %migrations,
        "Connected to Postgres"
    );

    Ok(client)
}

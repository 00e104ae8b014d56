#[cfg(feature = "config")]
use clap::Args;
use hookwire_nats::{NatsClient, NatsConfig};
use hookwire_postgres::{PgClient, PgClientMigrationExt, PgConfig};
use serde::{Deserialize, Serialize};

use crate::service::{DispatchConfig, TRACING_TARGET};
use crate::{Error, Result};

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    /// Postgres connection and pool settings.
    #[cfg_attr(feature = "config", clap(flatten))]
    pub postgres: PgConfig,

    /// NATS connection settings.
    #[cfg_attr(feature = "config", clap(flatten))]
    pub nats: NatsConfig,

    /// Asynchronous dispatch settings.
    #[cfg_attr(feature = "config", clap(flatten))]
    pub dispatch: DispatchConfig,
}

impl ServiceConfig {
    /// Creates a configuration with default dispatch settings.
    pub fn new(postgres: PgConfig, nats: NatsConfig) -> Self {
        Self {
            postgres,
            nats,
            dispatch: DispatchConfig::default(),
        }
    }

    /// Validates every configuration group.
    pub fn validate(&self) -> Result<()> {
        self.postgres.validate()?;
        self.nats.validate()?;
        self.dispatch.validate()
    }

    /// Connects to Postgres database and runs migrations.
    pub async fn connect_postgres(&self) -> Result<PgClient> {
        let pg_client = self.postgres.clone().build().map_err(|e| {
            Error::external("postgres", "Failed to create database client").with_source(e)
        })?;

        let result = pg_client.run_pending_migrations().await.map_err(|e| {
            Error::external("postgres", "Failed to apply database migrations").with_source(e)
        })?;

        tracing::info!(
            target: TRACING_TARGET,
            database = %self.postgres.database_url_masked(),
            migrations = %result,
            "Connected to Postgres"
        );

        Ok(pg_client)
    }

    /// Connects to NATS server.
    pub async fn connect_nats(&self) -> Result<NatsClient> {
        NatsClient::connect(self.nats.clone())
            .await
            .map_err(|e| Error::external("nats", "Failed to connect to NATS").with_source(e))
    }
}

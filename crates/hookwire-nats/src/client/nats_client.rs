//! NATS client wrapper and connection management.
//!
//! The underlying `async-nats` client multiplexes every operation over one
//! TCP connection and reconnects on its own; cloning a [`NatsClient`] only
//! clones an `Arc`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_nats::{Client, ConnectOptions, jetstream};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::time::timeout;

use super::nats_config::NatsConfig;
use crate::queue::{JobQueue, JobStream};
use crate::{Error, Result, TRACING_TARGET_CLIENT, TRACING_TARGET_CONNECTION};

/// Upper bound of the exponential reconnect delay.
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(30);

/// NATS client wrapper with connection management.
#[derive(Debug, Clone)]
pub struct NatsClient {
    inner: Arc<NatsClientInner>,
}

#[derive(Debug)]
struct NatsClientInner {
    client: Client,
    jetstream: jetstream::Context,
    config: NatsConfig,
}

impl NatsClient {
    /// Connects to the configured servers.
    #[tracing::instrument(skip(config), target = TRACING_TARGET_CONNECTION)]
    pub async fn connect(config: NatsConfig) -> Result<Self> {
        config.validate()?;

        tracing::info!(
            target: TRACING_TARGET_CONNECTION,
            servers = %config.nats_url,
            "Connecting to NATS"
        );

        let mut connect_opts = ConnectOptions::new()
            .name(config.name())
            .ping_interval(config.ping_interval())
            .connection_timeout(config.connect_timeout())
            .request_timeout(config.request_timeout())
            .token(config.nats_token.clone());

        if let Some(max_reconnects) = config.max_reconnects() {
            connect_opts = connect_opts.max_reconnects(max_reconnects);
        }

        let base_delay = config.reconnect_delay();
        connect_opts = connect_opts
            .reconnect_delay_callback(move |attempts| reconnect_delay(base_delay, attempts));

        let connect_timeout = config.connect_timeout();
        let client = timeout(
            connect_timeout,
            async_nats::connect_with_options(config.nats_url.as_str(), connect_opts),
        )
        .await
        .map_err(|_| Error::Timeout {
            timeout: connect_timeout,
        })?
        .map_err(|e| Error::Connection(Box::new(e)))?;

        let jetstream = jetstream::new(client.clone());

        let server_info = client.server_info();
        tracing::info!(
            target: TRACING_TARGET_CONNECTION,
            server_host = %server_info.host,
            server_version = %server_info.version,
            max_payload = server_info.max_payload,
            "Connected to NATS"
        );

        Ok(Self {
            inner: Arc::new(NatsClientInner {
                client,
                jetstream,
                config,
            }),
        })
    }

    /// Get the configuration
    #[must_use]
    pub fn config(&self) -> &NatsConfig {
        &self.inner.config
    }

    /// Returns the JetStream context.
    #[must_use]
    pub fn jetstream(&self) -> &jetstream::Context {
        &self.inner.jetstream
    }

    /// Flushes the connection and returns the round trip time.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_CONNECTION)]
    pub async fn ping(&self) -> Result<Duration> {
        let ping_timeout = Duration::from_secs(10);
        let start = Instant::now();

        timeout(ping_timeout, self.inner.client.flush())
            .await
            .map_err(|_| Error::Timeout {
                timeout: ping_timeout,
            })?
            .map_err(|e| Error::Connection(Box::new(e)))?;

        let ping_time = start.elapsed();
        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            duration_ms = ping_time.as_millis(),
            "NATS ping successful"
        );
        Ok(ping_time)
    }

    /// Check if the client is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(
            self.inner.client.connection_state(),
            async_nats::connection::State::Connected
        )
    }

    /// Gets or creates the work queue for stream `S`.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_CLIENT)]
    pub async fn job_queue<T, S>(&self) -> Result<JobQueue<T, S>>
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
        S: JobStream,
    {
        JobQueue::new(&self.inner.jetstream).await
    }
}

/// Exponential backoff for reconnect attempts, capped at 30 seconds.
fn reconnect_delay(base: Duration, attempts: usize) -> Duration {
    let factor = 2_u32.saturating_pow(attempts.min(16) as u32);
    base.saturating_mul(factor).min(MAX_RECONNECT_DELAY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconnect_delay_grows_and_caps() {
        let base = Duration::from_secs(2);
        assert_eq!(reconnect_delay(base, 0), Duration::from_secs(2));
        assert_eq!(reconnect_delay(base, 1), Duration::from_secs(4));
        assert_eq!(reconnect_delay(base, 3), Duration::from_secs(16));
        assert_eq!(reconnect_delay(base, 4), MAX_RECONNECT_DELAY);
        assert_eq!(reconnect_delay(base, 1000), MAX_RECONNECT_DELAY);
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_config() {
        let result = NatsClient::connect(NatsConfig::new("nats://localhost:4222", "")).await;
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }
}

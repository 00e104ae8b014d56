use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default number of in-job retries after a failed dispatch run.
pub const DEFAULT_MAX_RETRIES: u32 = 1;
/// Default delay before a retried dispatch run, in seconds.
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 180;
/// Default time JetStream waits for an ack before redelivering, in seconds.
pub const DEFAULT_ACK_WAIT_SECS: u64 = 300;
/// Default number of JetStream deliveries of one unacked message.
pub const DEFAULT_MAX_DELIVER: i64 = 10;
/// Default idle sleep of the dispatch worker, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Asynchronous dispatch settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct DispatchConfig {
    /// Retries of a dispatch job whose run failed
    #[cfg_attr(
        feature = "config",
        arg(long = "dispatch-max-retries", env = "DISPATCH_MAX_RETRIES", default_value_t = DEFAULT_MAX_RETRIES)
    )]
    pub max_retries: u32,

    /// Delay before a retried dispatch run, in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "dispatch-retry-delay-secs", env = "DISPATCH_RETRY_DELAY_SECS", default_value_t = DEFAULT_RETRY_DELAY_SECS)
    )]
    pub retry_delay_secs: u64,

    /// Time JetStream waits for an ack before redelivering, in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "dispatch-ack-wait-secs", env = "DISPATCH_ACK_WAIT_SECS", default_value_t = DEFAULT_ACK_WAIT_SECS)
    )]
    pub ack_wait_secs: u64,

    /// JetStream redelivery cap for unacked messages
    #[cfg_attr(
        feature = "config",
        arg(long = "dispatch-max-deliver", env = "DISPATCH_MAX_DELIVER", default_value_t = DEFAULT_MAX_DELIVER)
    )]
    pub max_deliver: i64,

    /// Worker sleep when no job is waiting, in milliseconds
    #[cfg_attr(
        feature = "config",
        arg(long = "dispatch-poll-interval-ms", env = "DISPATCH_POLL_INTERVAL_MS", default_value_t = DEFAULT_POLL_INTERVAL_MS)
    )]
    pub poll_interval_ms: u64,

    /// Upper bound for a single handler invocation, in seconds (optional)
    #[cfg_attr(
        feature = "config",
        arg(long = "dispatch-handler-timeout-secs", env = "DISPATCH_HANDLER_TIMEOUT_SECS")
    )]
    pub handler_timeout_secs: Option<u64>,
}

impl DispatchConfig {
    /// Returns the delay before a retried dispatch run.
    #[inline]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    /// Returns the JetStream ack wait.
    #[inline]
    pub fn ack_wait(&self) -> Duration {
        Duration::from_secs(self.ack_wait_secs)
    }

    /// Returns the worker idle sleep.
    #[inline]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Returns the per-handler timeout, if configured.
    #[inline]
    pub fn handler_timeout(&self) -> Option<Duration> {
        self.handler_timeout_secs.map(Duration::from_secs)
    }

    /// Sets the per-handler timeout.
    pub fn with_handler_timeout_secs(mut self, secs: u64) -> Self {
        self.handler_timeout_secs = Some(secs);
        self
    }

    /// Validates the dispatch settings.
    pub fn validate(&self) -> Result<()> {
        if self.ack_wait_secs == 0 {
            return Err(Error::config("Dispatch ack wait must be at least 1 second"));
        }

        if self.max_deliver == 0 || self.max_deliver < -1 {
            return Err(Error::config(
                "Dispatch max deliver must be positive or -1 for unlimited",
            ));
        }

        if self.poll_interval_ms == 0 {
            return Err(Error::config("Dispatch poll interval must be at least 1 ms"));
        }

        if self.handler_timeout_secs == Some(0) {
            return Err(Error::config("Handler timeout must be at least 1 second"));
        }

        Ok(())
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_secs: DEFAULT_RETRY_DELAY_SECS,
            ack_wait_secs: DEFAULT_ACK_WAIT_SECS,
            max_deliver: DEFAULT_MAX_DELIVER,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            handler_timeout_secs: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = DispatchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retry_delay(), Duration::from_secs(180));
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.handler_timeout(), None);
    }

    #[test]
    fn test_rejects_zero_values() {
        let config = DispatchConfig {
            ack_wait_secs: 0,
            ..DispatchConfig::default()
        };
        assert!(config.validate().is_err());

        let config = DispatchConfig::default().with_handler_timeout_secs(0);
        assert!(config.validate().is_err());

        let config = DispatchConfig {
            max_deliver: 0,
            ..DispatchConfig::default()
        };
        assert!(config.validate().is_err());
    }
}

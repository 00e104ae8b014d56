//! Middleware configuration for the HTTP server.
//!
//! Both groups are re-exported from `hookwire-server` and support CLI
//! arguments as well as environment variables.
//!
//! # Example
//!
//! ```bash
//! hookwire serve --max-body-size 1048576 --request-timeout 60
//! ```

use clap::Args;
use hookwire_server::middleware::{RecoveryConfig, SecurityConfig};
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Middleware configuration combining body limits and recovery settings.
#[derive(Debug, Clone, Default, Args, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Request body limit configuration.
    #[clap(flatten)]
    pub security: SecurityConfig,

    /// Recovery middleware configuration.
    ///
    /// Controls request timeout and panic recovery behavior.
    #[clap(flatten)]
    pub recovery: RecoveryConfig,
}

impl MiddlewareConfig {
    /// Logs middleware configuration at info level.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            max_body_size = self.security.max_body_size,
            request_timeout_secs = self.recovery.request_timeout,
            "Middleware configuration"
        );
    }
}

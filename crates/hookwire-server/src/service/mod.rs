//! Application state and dependency injection.

mod config;
mod dispatch_config;
mod queue;
mod state;

pub use crate::service::config::ServiceConfig;
pub use crate::service::dispatch_config::DispatchConfig;
pub use crate::service::queue::NatsDispatchQueue;
pub use crate::service::state::ServiceState;
// Re-export error types from crate root for convenience
pub use crate::{Error, Result};

/// Tracing target for service initialization.
pub(crate) const TRACING_TARGET: &str = "hookwire_server::service";

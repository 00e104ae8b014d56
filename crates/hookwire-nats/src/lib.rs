#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for NATS client operations.
pub const TRACING_TARGET_CLIENT: &str = "hookwire_nats::client";

/// Tracing target for NATS connection operations.
///
/// Use this target for logging connection establishment, reconnection, and connection errors.
pub const TRACING_TARGET_CONNECTION: &str = "hookwire_nats::connection";

/// Tracing target for work queue operations.
///
/// Use this target for logging job submission, consumption, retries and acknowledgements.
pub const TRACING_TARGET_QUEUE: &str = "hookwire_nats::queue";

mod client;
mod error;
pub mod queue;

// Re-export async_nats types needed by consumers
pub use async_nats::jetstream;
pub use client::{NatsClient, NatsConfig};
pub use error::{Error, Result};

//! In-memory implementations for testing.
//!
//! This module provides a store that implements every storage trait, a
//! queue that records enqueued jobs, and a few handlers with fixed behavior.
//! Nothing here needs a database or a message broker.
//!
//! # Feature Flag
//!
//! Outside this crate's own tests the module is only available when the
//! `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! hookwire-core = { version = "...", features = ["test-utils"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use hookwire_core::mock::{MemoryStore, StaticHandler};
//!
//! let store = Arc::new(MemoryStore::new());
//! let mut registry = HandlerRegistry::new();
//! registry.register("notify", "Sends a notification", StaticHandler::handled())?;
//! let dispatcher = Dispatcher::new(Arc::new(registry), store.clone(), store.clone());
//! ```

mod handler;
mod queue;
mod store;

pub use handler::{FailingHandler, PanickingHandler, SlowHandler, StaticHandler};
pub use queue::MemoryQueue;
pub use store::MemoryStore;

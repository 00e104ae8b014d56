#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for the admission gate.
pub const TRACING_TARGET_ADMISSION: &str = "hookwire_core::admission";

/// Tracing target for the dispatch engine.
pub const TRACING_TARGET_DISPATCH: &str = "hookwire_core::dispatch";

/// Tracing target for handler registration.
pub const TRACING_TARGET_REGISTRY: &str = "hookwire_core::registry";

/// Tracing target for catalog synchronization.
pub const TRACING_TARGET_SYNC: &str = "hookwire_core::sync";

mod error;
mod handler;

pub mod admission;
pub mod dispatch;
pub mod registry;
pub mod store;
pub mod sync;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;

pub use admission::{AdmissionGate, AdmissionOutcome};
pub use dispatch::Dispatcher;
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use handler::Handler;
pub use registry::{HandlerRegistry, RegistryEntry};
pub use store::{DeliveryStore, DispatchQueue, HandlerCatalog, Pagination, SubscriptionStore};
pub use sync::{SyncPlan, Synchronizer};

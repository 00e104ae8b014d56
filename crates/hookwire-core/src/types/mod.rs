//! Domain types shared by the admission gate, the dispatch engine and the
//! storage backends.
//!
//! # Overview
//!
//! - **Subscription**: a named webhook endpoint with its one-time secret and
//!   the set of handler names assigned to it
//! - **Delivery**: one accepted inbound payload and its processing outcome
//! - **ProcessingStatus**: the delivery state machine
//! - **HandlerResult** and **AdditionalData**: what the dispatch engine records
//! - **HandlerDescriptor** and **CatalogHandler**: the persisted registry mirror
//! - **DispatchJob**: the unit of work handed to the asynchronous substrate

mod catalog;
mod delivery;
mod handler_result;
mod job;
mod status;
mod subscription;

pub use catalog::{CatalogHandler, HandlerDescriptor, SyncReport};
pub use delivery::{Delivery, DeliveryFilter, NewDelivery};
pub use handler_result::{AdditionalData, DispatchResult, HandlerResult};
pub use job::DispatchJob;
pub use status::ProcessingStatus;
pub use subscription::{NewSubscription, Subscription};

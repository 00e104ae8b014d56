//! Database models for all tables.
//!
//! Each model converts into the matching `hookwire_core` type so the storage
//! traits can hand engine types back to their callers.

mod delivery;
mod subscription;
mod webhook_handler;

pub use delivery::{CompleteDelivery, Delivery, NewDelivery};
pub use subscription::{NewSubscription, Subscription};
pub use webhook_handler::{NewWebhookHandler, WebhookHandler};

//! Database query repositories.
//!
//! Repositories are implemented directly on [`PgConnection`] so they can be
//! called on a pooled connection or inside a transaction alike. Listings use
//! the engine's [`Pagination`].
//!
//! [`PgConnection`]: crate::PgConnection

mod delivery;
mod subscription;
mod webhook_handler;

pub use delivery::DeliveryRepository;
pub use hookwire_core::Pagination;
pub use subscription::SubscriptionRepository;
pub use webhook_handler::WebhookHandlerRepository;

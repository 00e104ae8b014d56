//! Request types for HTTP handlers.

mod deliveries;
mod pagination;
mod paths;

pub use deliveries::ListDeliveriesQuery;
pub use pagination::PaginationRequest;
pub use paths::{DeliveryPathParams, SubscriptionPathParams};

//! Response types for HTTP handlers.

mod deliveries;
mod error_response;
mod handlers;
mod monitors;
mod subscriptions;
mod webhooks;

pub use deliveries::{Deliveries, Delivery, DeliverySummary};
pub use error_response::ErrorResponse;
pub use handlers::{WebhookHandler, WebhookHandlers};
pub use monitors::MonitorStatus;
pub use subscriptions::{Subscription, Subscriptions};
pub use webhooks::{WebhookAccepted, WebhookRejected, WebhookVerified};

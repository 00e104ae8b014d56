//! Middleware for `axum::Router` and HTTP request processing.
//!
//! - Security: request body limits and `nosniff` responses
//! - Observability: request ids, trace spans and redacted secret headers
//! - Recovery: request timeouts and panics rendered as JSON errors
//!
//! ```rust,ignore
//! use hookwire_server::middleware::*;
//!
//! let app = routes(state)
//!     .with_security(&SecurityConfig::default())
//!     .with_observability()
//!     .with_recovery(&RecoveryConfig::default());
//! ```

mod observability;
mod recovery;
mod security;

pub use observability::RouterObservabilityExt;
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
pub use security::{RouterSecurityExt, SecurityConfig};

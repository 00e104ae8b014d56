//! Request extractors with JSON error bodies.
//!
//! - [`Path`] and [`Query`] wrap their axum counterparts and reject with a
//!   [`handler::Error`] instead of a plain-text body
//! - [`HookSecret`] reads the sender's handshake header
//!
//! [`handler::Error`]: crate::handler::Error

mod hook_secret;
pub mod reject;

pub use crate::extract::hook_secret::{HOOK_SECRET_HEADER, HookSecret};
pub use crate::extract::reject::{Path, Query};

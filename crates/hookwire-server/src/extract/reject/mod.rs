//! Drop-in replacements for axum extractors whose rejections render as
//! [`ErrorResponse`] JSON.
//!
//! [`ErrorResponse`]: crate::handler::response::ErrorResponse

mod enhanced_path;
mod enhanced_query;

pub use self::enhanced_path::Path;
pub use self::enhanced_query::Query;

/// Tracing target for extractor rejections.
const TRACING_TARGET: &str = "hookwire_server::extract";

/// Keeps the first two lines and at most 150 characters of a rejection message.
fn sanitize_error_message(message: &str) -> String {
    message
        .lines()
        .take(2)
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(150)
        .collect()
}

//! Database-specific types.

mod processing_status;

pub use processing_status::ProcessingStatus;

//! Asynchronous dispatch jobs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to dispatch one delivery record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DispatchJob {
    /// The delivery to dispatch.
    pub delivery_id: Uuid,
}

impl DispatchJob {
    /// Creates a job for the given delivery.
    pub fn new(delivery_id: Uuid) -> Self {
        Self { delivery_id }
    }
}

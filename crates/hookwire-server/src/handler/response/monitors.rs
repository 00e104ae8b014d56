use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Liveness report.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
pub struct MonitorStatus {
    /// Always `true` when the process answers.
    pub is_healthy: bool,
    /// Package version of the server.
    pub version: String,
    /// Number of handlers registered in this process.
    pub registered_handlers: usize,
    /// Time of the report.
    pub updated_at: Timestamp,
}

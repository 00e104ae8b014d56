//! Processing status enumeration for webhook deliveries.

use diesel_derive_enum::DbEnum;
use hookwire_core::types::ProcessingStatus as CoreProcessingStatus;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Dispatch outcome of a delivery.
///
/// This enumeration corresponds to the `PROCESSING_STATUS` PostgreSQL enum and
/// converts losslessly to and from the engine's status.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::ProcessingStatus"]
pub enum ProcessingStatus {
    /// Accepted and waiting for dispatch
    #[db_rename = "pending"]
    #[serde(rename = "pending")]
    #[strum(serialize = "pending")]
    #[default]
    Pending,

    /// The subscription had no handlers assigned
    #[db_rename = "no_handlers"]
    #[serde(rename = "no_handlers")]
    #[strum(serialize = "no_handlers")]
    NoHandlers,

    /// Every assigned handler failed
    #[db_rename = "failed"]
    #[serde(rename = "failed")]
    #[strum(serialize = "failed")]
    Failed,

    /// Some handlers returned results, others failed
    #[db_rename = "partial"]
    #[serde(rename = "partial")]
    #[strum(serialize = "partial")]
    Partial,

    /// Every assigned handler returned a result
    #[db_rename = "success"]
    #[serde(rename = "success")]
    #[strum(serialize = "success")]
    Success,
}

impl From<CoreProcessingStatus> for ProcessingStatus {
    fn from(status: CoreProcessingStatus) -> Self {
        match status {
            CoreProcessingStatus::Pending => Self::Pending,
            CoreProcessingStatus::NoHandlers => Self::NoHandlers,
            CoreProcessingStatus::Failed => Self::Failed,
            CoreProcessingStatus::Partial => Self::Partial,
            CoreProcessingStatus::Success => Self::Success,
        }
    }
}

impl From<ProcessingStatus> for CoreProcessingStatus {
    fn from(status: ProcessingStatus) -> Self {
        match status {
            ProcessingStatus::Pending => Self::Pending,
            ProcessingStatus::NoHandlers => Self::NoHandlers,
            ProcessingStatus::Failed => Self::Failed,
            ProcessingStatus::Partial => Self::Partial,
            ProcessingStatus::Success => Self::Success,
        }
    }
}

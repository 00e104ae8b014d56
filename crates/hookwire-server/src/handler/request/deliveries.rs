use hookwire_core::Pagination;
use hookwire_core::types::ProcessingStatus;
use serde::{Deserialize, Serialize};

use super::PaginationRequest;

/// Query parameters of the delivery listing.
///
/// Pagination fields are inlined rather than flattened: flattened structs
/// lose the numeric types of urlencoded values.
#[must_use]
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ListDeliveriesQuery {
    /// The maximum number of records to return.
    pub limit: Option<i64>,
    /// The number of records to skip.
    pub offset: Option<i64>,
    /// Only deliveries of the subscription with this name.
    pub subscription: Option<String>,
    /// Only deliveries in this processing status.
    pub status: Option<ProcessingStatus>,
}

impl ListDeliveriesQuery {
    /// Returns the requested page.
    pub fn pagination(&self) -> Pagination {
        PaginationRequest {
            offset: self.offset,
            limit: self.limit,
        }
        .into()
    }
}

use hookwire_core::Pagination;
use serde::{Deserialize, Serialize};

/// Offset pagination parameters accepted by every list endpoint.
///
/// Missing values fall back to the store defaults; the limit is clamped to
/// the store maximum.
#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize)]
pub struct PaginationRequest {
    /// The number of records to skip before starting to return results.
    pub offset: Option<i64>,
    /// The maximum number of records to return.
    pub limit: Option<i64>,
}

impl PaginationRequest {
    /// Returns a new [`PaginationRequest`].
    #[inline]
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            offset: Some(offset),
            limit: Some(limit),
        }
    }
}

impl From<PaginationRequest> for Pagination {
    fn from(pagination: PaginationRequest) -> Self {
        Pagination::from_query(pagination.limit, pagination.offset)
    }
}

#[cfg(test)]
mod tests {
    use hookwire_core::store::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

    use super::*;

    #[test]
    fn defaults_and_clamping() {
        let pagination = Pagination::from(PaginationRequest::default());
        assert_eq!(pagination.limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(pagination.offset, 0);

        let pagination = Pagination::from(PaginationRequest::new(5, MAX_PAGE_LIMIT + 1));
        assert_eq!(pagination.limit, MAX_PAGE_LIMIT);
        assert_eq!(pagination.offset, 5);
    }
}

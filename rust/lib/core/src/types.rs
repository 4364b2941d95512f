use serde::{Deserialize, Serialize};

use crate::ServiceError;

/// A limit/offset window as received from a caller, before validation.
///
/// Signed so that negative input reaches validation and is rejected with
/// `InvalidArgument` rather than failing to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageParams {
    /// Maximum number of results to return.
    pub limit: i64,

    /// Number of leading results to skip.
    pub offset: i64,
}

impl PageParams {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }

    /// Validate into a [`Page`]: `limit` must be positive, `offset` must not be negative.
    pub fn validate(self) -> Result<Page, ServiceError> {
        if self.limit <= 0 {
            return Err(ServiceError::InvalidArgument(format!(
                "limit must be positive, got {}",
                self.limit
            )));
        }
        if self.offset < 0 {
            return Err(ServiceError::InvalidArgument(format!(
                "offset must not be negative, got {}",
                self.offset
            )));
        }
        Ok(Page {
            limit: usize::try_from(self.limit).unwrap_or(usize::MAX),
            offset: usize::try_from(self.offset).unwrap_or(usize::MAX),
        })
    }
}

/// A validated limit/offset window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

impl Page {
    /// Rows to request from storage so that `has_more` can be decided
    /// without a second round trip.
    pub fn probe_limit(&self) -> usize {
        self.limit.saturating_add(1)
    }
}

/// Result wrapper for paginated operations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResult<T: Serialize> {
    pub items: Vec<T>,
    pub has_more: bool,
}

impl<T: Serialize> ListResult<T> {
    /// Build a page from up to `page.probe_limit()` rows fetched from storage.
    pub fn from_probe(mut rows: Vec<T>, page: Page) -> Self {
        let has_more = rows.len() > page.limit;
        rows.truncate(page.limit);
        Self {
            items: rows,
            has_more,
        }
    }
}

/// Result wrapper for count operations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountResult {
    pub count: usize,
}

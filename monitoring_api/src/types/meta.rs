use serde::{Deserialize, Serialize};

use crate::Error;

/// Pagination block of a paginated envelope.
///
/// Fields are unsigned: a negative value from the server is a decode error.
/// The values are surfaced exactly as sent.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationMeta {
    /// 1-based page number.
    pub page: u64,
    /// Page size.
    pub limit: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl PaginationMeta {
    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn next_page(&self) -> Option<u64> {
        self.has_next_page().then_some(self.page + 1)
    }

    /// `ceil(total_items / limit)`, or `None` when `limit` is zero. Useful for
    /// spotting a server that reports an inconsistent `total_pages`.
    pub fn expected_total_pages(&self) -> Option<u64> {
        (self.limit > 0).then(|| self.total_items.div_ceil(self.limit))
    }
}

/// A decoded standard envelope: `{status, message, data}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Response<T> {
    /// HTTP status code of the final attempt.
    pub status: u16,
    pub message: String,
    /// `None` when `data` was absent or `null`.
    pub data: Option<T>,
    /// Number of HTTP attempts made, including the successful one.
    pub attempts: u32,
}

impl<T> Response<T> {
    /// Returns the payload, failing with [`Error::MissingData`] if there is none.
    pub fn require_data(self) -> Result<T, Error> {
        self.data.ok_or(Error::MissingData)
    }
}

/// A decoded paginated envelope: `{status, message, data: [...], meta}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Paginated<T> {
    pub status: u16,
    pub message: String,
    /// Empty when the server sent `[]`, `null`, or omitted `data`.
    pub data: Vec<T>,
    pub meta: Option<PaginationMeta>,
    pub attempts: u32,
}

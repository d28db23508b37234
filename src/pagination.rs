use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 20;

/// 1-based page request. Pages accumulate: page `n` covers the first
/// `n * page_size` items.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    pub page: usize,
    pub page_size: usize,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationParams {
    /// Creates parameters, clamping both values to at least one.
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    /// Parameters for the following page with the same size.
    pub fn next(self) -> Self {
        Self::new(self.page + 1, self.page_size)
    }

    /// Number of leading items covered by this request, capped at `total`.
    pub fn visible_len(self, total: usize) -> usize {
        self.page
            .max(1)
            .saturating_mul(self.page_size.max(1))
            .min(total)
    }
}

/// Slice of a collection together with the size of the whole filtered set.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PaginatedResponse<T> {
    pub data: T,
    pub total: usize,
}

impl<T> PaginatedResponse<Vec<T>> {
    /// `true` when the response is non-empty and does not cover everything yet.
    pub fn has_more(&self) -> bool {
        !self.data.is_empty() && self.data.len() < self.total
    }
}

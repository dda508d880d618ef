//! Pagination window for list queries.

use serde::{Deserialize, Serialize};

/// Caller-supplied pagination options. Both fields are optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Effective window applied to a list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl PaginationParams {
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Self { limit, offset }
    }

    /// Fills missing values: `limit` from `default_limit`, `offset` from 0.
    ///
    /// Zero values are passed through as given.
    pub fn resolve(&self, default_limit: u32) -> Page {
        Page {
            limit: self.limit.unwrap_or(default_limit),
            offset: self.offset.unwrap_or(0),
        }
    }
}

//! Shared types used across the codebase

use serde::Serialize;

/// Page window requested by a client, already normalised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub const DEFAULT_PAGE: i64 = 1;

    /// Parse `page` / `limit` query values leniently.
    ///
    /// Absent, non-numeric and non-positive values fall back to the defaults
    /// instead of failing the request; `limit` is capped at `max_limit`.
    pub fn lenient(page: Option<&str>, limit: Option<&str>, default_limit: i64, max_limit: i64) -> Self {
        let page = parse_positive(page).unwrap_or(Self::DEFAULT_PAGE);
        let limit = parse_positive(limit).unwrap_or(default_limit).min(max_limit);
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// `ceil(total / limit)`
    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            return 0;
        }
        (total + self.limit - 1) / self.limit
    }
}

fn parse_positive(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|v| v.trim().parse::<i64>().ok()).filter(|v| *v >= 1)
}

/// One page of results plus the numbers a client needs to walk the rest
#[derive(Debug, Clone, Serialize)]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

impl<T: Serialize> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            limit: request.limit,
            total_pages: request.total_pages(total),
        }
    }
}

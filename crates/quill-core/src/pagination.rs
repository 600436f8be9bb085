//! Page/limit parsing and pagination metadata.

use serde::Serialize;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// A normalized page request. `page` and `limit` are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Build from raw query values. Missing, non-numeric and non-positive
    /// values fall back to the defaults; the limit is capped.
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: parse_positive(page).unwrap_or(DEFAULT_PAGE),
            limit: parse_positive(limit)
                .unwrap_or(DEFAULT_LIMIT)
                .min(MAX_LIMIT),
        }
    }

    /// Number of matching items to skip before this page starts.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|n| *n > 0)
}

/// Pagination metadata returned alongside a page of items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
    pub total_items: u64,
}

impl Pagination {
    pub fn new(request: PageRequest, total_items: u64) -> Self {
        Self {
            page: request.page,
            limit: request.limit,
            total_pages: total_items.div_ceil(request.limit),
            total_items,
        }
    }
}

/// One page of items plus its metadata.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_missing() {
        assert_eq!(PageRequest::parse(None, None), PageRequest::default());
    }

    #[test]
    fn test_invalid_values_fall_back_to_defaults() {
        let req = PageRequest::parse(Some("-3"), Some("abc"));
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, 10);

        let req = PageRequest::parse(Some("0"), Some("0"));
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, 10);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_limit_is_capped() {
        assert_eq!(PageRequest::parse(None, Some("5000")).limit, MAX_LIMIT);
    }

    #[test]
    fn test_offset() {
        let req = PageRequest::parse(Some("3"), Some("20"));
        assert_eq!(req.offset(), 40);
    }

    #[test]
    fn test_offset_saturates_on_huge_pages() {
        let req = PageRequest {
            page: u64::MAX,
            limit: 100,
        };
        assert_eq!(req.offset(), u64::MAX);
    }

    #[test]
    fn test_total_pages_is_ceiling() {
        for (total, limit, expected) in [(0, 10, 0), (1, 10, 1), (10, 10, 1), (11, 10, 2), (7, 3, 3)]
        {
            let pagination = Pagination::new(PageRequest { page: 1, limit }, total);
            assert_eq!(pagination.total_pages, expected, "total={total} limit={limit}");
        }
    }
}

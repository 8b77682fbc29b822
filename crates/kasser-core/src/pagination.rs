//! # Pagination
//!
//! Offset pagination for list endpoints.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// A normalized page request. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Applies defaults (1 / 20) and clamps: page ≥ 1, page size 1..=100.
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        let page = page.unwrap_or(1).clamp(1, u32::MAX as i64) as u32;
        let page_size = page_size
            .unwrap_or(DEFAULT_PAGE_SIZE as i64)
            .clamp(1, MAX_PAGE_SIZE as i64) as u32;

        PageRequest { page, page_size }
    }

    pub const fn page(&self) -> u32 {
        self.page
    }

    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Rows to skip.
    pub const fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.page_size as i64
    }

    pub const fn limit(&self) -> i64 {
        self.page_size as i64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::new(None, None)
    }
}

/// One page of results plus navigation metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: i64,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl<T> Paged<T> {
    pub fn new(items: Vec<T>, total_count: i64, request: PageRequest) -> Self {
        let page_size = request.page_size() as i64;
        let total_pages = (total_count.max(0) + page_size - 1) / page_size;
        let page = request.page();

        Paged {
            items,
            total_count,
            page,
            page_size: request.page_size(),
            total_pages,
            has_previous_page: page > 1,
            has_next_page: (page as i64) < total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let req = PageRequest::default();
        assert_eq!(req.page(), 1);
        assert_eq!(req.page_size(), 20);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_clamping() {
        let req = PageRequest::new(Some(0), Some(500));
        assert_eq!(req.page(), 1);
        assert_eq!(req.page_size(), 100);

        let req = PageRequest::new(Some(-3), Some(0));
        assert_eq!(req.page(), 1);
        assert_eq!(req.page_size(), 1);
    }

    #[test]
    fn test_offset() {
        let req = PageRequest::new(Some(3), Some(10));
        assert_eq!(req.offset(), 20);
        assert_eq!(req.limit(), 10);
    }

    #[test]
    fn test_page_metadata() {
        let paged = Paged::new(vec![1, 2], 45, PageRequest::new(Some(2), Some(20)));
        assert_eq!(paged.total_pages, 3);
        assert!(paged.has_previous_page);
        assert!(paged.has_next_page);

        let last = Paged::new(vec![1], 45, PageRequest::new(Some(3), Some(20)));
        assert!(!last.has_next_page);
    }

    #[test]
    fn test_empty_result() {
        let paged: Paged<i32> = Paged::new(vec![], 0, PageRequest::default());
        assert_eq!(paged.total_pages, 0);
        assert!(!paged.has_previous_page);
        assert!(!paged.has_next_page);
    }
}

//! Page arithmetic for list views and APIs

use serde::{Deserialize, Serialize};

/// Default items per page
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// One page over `item_count` rows.
///
/// `offset`/`limit` feed straight into [`FindAll::range`](crate::orm::FindAll::range).
/// An out-of-range index collapses to page 1 with an empty window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub item_count: u64,
    pub page_size: u32,
    pub page_count: u64,
    pub page_index: u64,
    pub offset: u64,
    pub limit: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

impl Page {
    /// Compute a page.
    ///
    /// # Example
    /// ```
    /// use quill_server::models::Page;
    ///
    /// let page = Page::new(91, 10, 10);
    /// assert_eq!(page.page_count, 10);
    /// assert_eq!(page.offset, 90);
    /// assert!(!page.has_next);
    /// ```
    pub fn new(item_count: u64, page_index: u64, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        let size = u64::from(page_size);
        let page_count = item_count / size + u64::from(item_count % size > 0);

        let (page_index, offset, limit) =
            if item_count == 0 || page_index == 0 || page_index > page_count {
                (1, 0, 0)
            } else {
                (page_index, (page_index - 1) * size, page_size)
            };

        Self {
            item_count,
            page_size,
            page_count,
            page_index,
            offset,
            limit,
            has_next: page_index < page_count,
            has_previous: page_index > 1,
        }
    }

    /// True when there is nothing to fetch for this page.
    pub fn is_empty(&self) -> bool {
        self.limit == 0
    }
}

/// Parse a `page` query value; anything unparsable or below 1 means page 1.
pub fn page_index_arg(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|&n| n >= 1)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_calculation() {
        assert_eq!(Page::new(100, 1, 10).offset, 0);
        assert_eq!(Page::new(100, 2, 10).offset, 10);
        assert_eq!(Page::new(100, 3, 25).offset, 50);
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(Page::new(0, 1, 10).page_count, 0);
        assert_eq!(Page::new(25, 1, 10).page_count, 3);
        assert_eq!(Page::new(100, 1, 10).page_count, 10);
    }

    #[test]
    fn empty_collection_resets() {
        let page = Page::new(0, 3, 10);
        assert_eq!(page.page_index, 1);
        assert_eq!(page.offset, 0);
        assert_eq!(page.limit, 0);
        assert!(page.is_empty());
        assert!(!page.has_next);
        assert!(!page.has_previous);
    }

    #[test]
    fn index_past_end_resets() {
        let page = Page::new(30, 4, 10);
        assert_eq!(page.page_index, 1);
        assert!(page.is_empty());
        assert!(page.has_next);
    }

    #[test]
    fn has_next_prev() {
        let first = Page::new(30, 1, 10);
        assert!(first.has_next);
        assert!(!first.has_previous);

        let middle = Page::new(30, 2, 10);
        assert!(middle.has_next);
        assert!(middle.has_previous);

        let last = Page::new(30, 3, 10);
        assert!(!last.has_next);
        assert!(last.has_previous);
        assert_eq!(last.limit, 10);
    }

    #[test]
    fn zero_page_size_is_clamped() {
        let page = Page::new(3, 1, 0);
        assert_eq!(page.page_size, 1);
        assert_eq!(page.page_count, 3);
    }

    #[test]
    fn lenient_index_parsing() {
        assert_eq!(page_index_arg(None), 1);
        assert_eq!(page_index_arg(Some("3")), 3);
        assert_eq!(page_index_arg(Some("0")), 1);
        assert_eq!(page_index_arg(Some("-2")), 1);
        assert_eq!(page_index_arg(Some("abc")), 1);
    }
}

//! Paging primitives for directory listings.
//!
//! The arithmetic here is shared by every `UserDirectory` backend so that the
//! in-memory and SQL implementations clamp pages identically.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Role filter value that callers use to mean "any role".
pub const FILTER_ROLE_ALL: &str = "ALL";

/// Default page length used when the caller does not supply one.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// A filtered, paginated listing request.
///
/// Empty filters mean "no filter". `page_no` is 0-based and is clamped into the
/// valid range once the total item count is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageQuery {
    pub page_no: i64,
    pub page_size: i64,
    pub filter_text: String,
    pub filter_role: String,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page_no: 0,
            page_size: DEFAULT_PAGE_SIZE,
            filter_text: String::new(),
            filter_role: String::new(),
        }
    }
}

impl PageQuery {
    pub fn new(
        page_no: i64,
        page_size: i64,
        filter_text: impl Into<String>,
        filter_role: impl Into<String>,
    ) -> Self {
        Self {
            page_no,
            page_size,
            filter_text: filter_text.into(),
            filter_role: filter_role.into(),
        }
    }

    /// Build a query from listing-endpoint parameters.
    ///
    /// The `"ALL"` role sentinel is normalized to "no filter" here, so it never
    /// reaches a directory backend as a literal predicate value.
    pub fn from_request(
        page_no: i64,
        page_size: i64,
        filter_text: impl Into<String>,
        filter_role: impl Into<String>,
    ) -> Self {
        let mut query = Self::new(page_no, page_size, filter_text, filter_role);
        if query.filter_role == FILTER_ROLE_ALL {
            query.filter_role.clear();
        }
        query
    }

    /// Reject inputs that cannot be paged (non-positive size, negative page).
    pub fn validate(&self) -> DomainResult<()> {
        if self.page_size <= 0 {
            return Err(DomainError::validation(format!(
                "pageSize must be positive, got {}",
                self.page_size
            )));
        }
        if self.page_no < 0 {
            return Err(DomainError::validation(format!(
                "pageNo must not be negative, got {}",
                self.page_no
            )));
        }
        Ok(())
    }

    /// Free-text filter, if any.
    pub fn text_filter(&self) -> Option<&str> {
        (!self.filter_text.is_empty()).then_some(self.filter_text.as_str())
    }

    /// Exact role filter, if any.
    pub fn role_filter(&self) -> Option<&str> {
        (!self.filter_role.is_empty()).then_some(self.filter_role.as_str())
    }
}

/// The resolved slice of a listing once the total count is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page_no: i64,
    pub page_size: i64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl PageWindow {
    /// Compute the window for `requested_page` over `total_items` rows.
    ///
    /// - `total_pages = ceil(total_items / page_size)`, 0 when there are no rows
    /// - a page past the end is clamped to the last page
    /// - a negative page is clamped to 0
    /// - with no pages at all the current page is 0
    pub fn clamp(requested_page: i64, page_size: i64, total_items: u64) -> DomainResult<Self> {
        if page_size <= 0 {
            return Err(DomainError::validation(format!(
                "pageSize must be positive, got {page_size}"
            )));
        }

        let size = page_size as u64;
        let total_pages = total_items.div_ceil(size);

        let mut page_no = requested_page.max(0);
        if total_pages == 0 {
            page_no = 0;
        } else if page_no as u64 >= total_pages {
            page_no = (total_pages - 1) as i64;
        }

        Ok(Self {
            page_no,
            page_size,
            total_items,
            total_pages,
        })
    }

    /// Row offset of the first item on this page.
    pub fn offset(&self) -> i64 {
        self.page_no.saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn has_next(&self) -> bool {
        (self.page_no as u64).saturating_add(1) < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page_no > 0
    }
}

/// Page envelope returned by listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub current_page: i64,
    pub page_size: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, window: PageWindow) -> Self {
        Self {
            content,
            total_elements: window.total_items,
            total_pages: window.total_pages,
            current_page: window.page_no,
            page_size: window.page_size,
            has_next: window.has_next(),
            has_previous: window.has_previous(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn out_of_range_page_clamps_to_last() {
        let w = PageWindow::clamp(5, 10, 25).unwrap();
        assert_eq!(w.total_pages, 3);
        assert_eq!(w.page_no, 2);
        assert_eq!(w.offset(), 20);
        assert!(!w.has_next());
        assert!(w.has_previous());
    }

    #[test]
    fn first_page_has_next_but_no_previous() {
        let w = PageWindow::clamp(0, 10, 25).unwrap();
        assert_eq!(w.page_no, 0);
        assert!(w.has_next());
        assert!(!w.has_previous());
    }

    #[test]
    fn empty_listing_has_zero_pages_and_page_zero() {
        let w = PageWindow::clamp(4, 10, 0).unwrap();
        assert_eq!(w.total_pages, 0);
        assert_eq!(w.page_no, 0);
        assert!(!w.has_next());
        assert!(!w.has_previous());
    }

    #[test]
    fn negative_page_clamps_to_zero() {
        let w = PageWindow::clamp(-3, 10, 25).unwrap();
        assert_eq!(w.page_no, 0);
    }

    #[test]
    fn non_positive_page_size_is_rejected() {
        assert!(matches!(PageWindow::clamp(0, 0, 10), Err(DomainError::Validation(_))));
        assert!(matches!(PageWindow::clamp(0, -5, 10), Err(DomainError::Validation(_))));
    }

    #[test]
    fn all_role_sentinel_is_normalized() {
        let q = PageQuery::from_request(0, 10, "", "ALL");
        assert_eq!(q.role_filter(), None);

        let q = PageQuery::from_request(0, 10, "", "ROLE_ADMIN");
        assert_eq!(q.role_filter(), Some("ROLE_ADMIN"));

        // Only the exact sentinel is special.
        let q = PageQuery::from_request(0, 10, "", "all");
        assert_eq!(q.role_filter(), Some("all"));
    }

    #[test]
    fn validate_rejects_bad_inputs() {
        assert!(PageQuery::new(0, 0, "", "").validate().is_err());
        assert!(PageQuery::new(-1, 10, "", "").validate().is_err());
        assert!(PageQuery::default().validate().is_ok());
    }

    #[test]
    fn page_serializes_in_camel_case() {
        let w = PageWindow::clamp(0, 2, 3).unwrap();
        let page = Page::new(vec!["a", "b"], w);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["totalElements"], 3);
        assert_eq!(json["totalPages"], 2);
        assert_eq!(json["currentPage"], 0);
        assert_eq!(json["pageSize"], 2);
        assert_eq!(json["hasNext"], true);
        assert_eq!(json["hasPrevious"], false);
        assert_eq!(json["content"].as_array().unwrap().len(), 2);
    }

    proptest! {
        #[test]
        fn total_pages_is_ceiling(total in 0u64..10_000, size in 1i64..500) {
            let w = PageWindow::clamp(0, size, total).unwrap();
            let expected = (total + size as u64 - 1) / size as u64;
            prop_assert_eq!(w.total_pages, expected);
        }

        #[test]
        fn current_page_is_always_in_range(
            total in 0u64..10_000,
            size in 1i64..500,
            page in -100i64..1_000,
        ) {
            let w = PageWindow::clamp(page, size, total).unwrap();
            if w.total_pages > 0 {
                prop_assert!(w.page_no >= 0);
                prop_assert!((w.page_no as u64) < w.total_pages);
                prop_assert!((w.offset() as u64) < total);
            } else {
                prop_assert_eq!(w.page_no, 0);
            }
        }
    }
}

//! Page type for paginated collection results.

use serde::Deserialize;
use serde::Serialize;

/// A page of rows plus the server's total match count.
///
/// Rows keep exactly the order the server returned; sorting happens on the
/// server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<R> {
    rows: Vec<R>,
    total: u64,
}

impl<R> Page<R> {
    /// Creates a page.
    pub fn new(rows: Vec<R>, total: u64) -> Self {
        Self { rows, total }
    }

    /// A page with no rows and a zero total.
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }

    /// Returns the rows of this page.
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// Consumes the page and returns the rows.
    pub fn into_rows(self) -> Vec<R> {
        self.rows
    }

    /// Total number of rows matching the query across all pages.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Returns `true` if this page has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of rows in this page.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Number of pages needed to show `total` rows at `page_size` per page.
    pub fn page_count(&self, page_size: u32) -> u32 {
        let page_size = u64::from(page_size.max(1));
        let count = self.total.div_ceil(page_size);
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

impl<R> Default for Page<R> {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count() {
        let page: Page<u8> = Page::new(vec![1, 2, 3], 21);
        assert_eq!(page.page_count(10), 3);
        assert_eq!(page.page_count(21), 1);
        assert_eq!(Page::<u8>::empty().page_count(10), 0);
    }

    #[test]
    fn test_wire_shape() {
        let page: Page<String> = serde_json::from_str(r#"{"rows":["b","a"],"total":12}"#).unwrap();
        assert_eq!(page.rows(), &["b".to_string(), "a".to_string()]);
        assert_eq!(page.total(), 12);
    }
}

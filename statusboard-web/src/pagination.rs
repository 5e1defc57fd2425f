//! Pagination utilities for project listings

/// Default page size, matching the dashboard's initial table size
pub const PAGE_SIZE: usize = 50;

/// Largest page a client may request
pub const MAX_PAGE_SIZE: usize = 1000;

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: usize,
    /// Rows per page after clamping
    pub page_size: usize,
    /// Total number of pages
    pub total_pages: usize,
    /// Index of the first row on this page
    pub offset: usize,
}

impl Pagination {
    /// Slice `items` down to this page
    pub fn apply<T: Clone>(&self, items: &[T]) -> Vec<T> {
        items
            .iter()
            .skip(self.offset)
            .take(self.page_size)
            .cloned()
            .collect()
    }
}

/// Calculate pagination metadata from total results and requested page
///
/// Ensures page is within valid bounds [1, total_pages] and page size within
/// [1, MAX_PAGE_SIZE].
///
/// # Examples
/// ```
/// use statusboard_web::pagination::calculate_pagination;
///
/// // 120 total results at 50 per page = 3 pages (50 + 50 + 20)
/// let p = calculate_pagination(120, 2, 50);
/// assert_eq!(p.page, 2);
/// assert_eq!(p.total_pages, 3);
/// assert_eq!(p.offset, 50);
///
/// // Requesting out-of-bounds page gets clamped
/// let p = calculate_pagination(120, 99, 50);
/// assert_eq!(p.page, 3);  // Clamped to last page
/// assert_eq!(p.offset, 100);
/// ```
pub fn calculate_pagination(
    total_results: usize,
    requested_page: usize,
    requested_page_size: usize,
) -> Pagination {
    let page_size = requested_page_size.clamp(1, MAX_PAGE_SIZE);
    let total_pages = total_results.div_ceil(page_size);
    let page = requested_page.max(1).min(total_pages.max(1));
    let offset = (page - 1) * page_size;

    Pagination {
        page,
        page_size,
        total_pages,
        offset,
    }
}

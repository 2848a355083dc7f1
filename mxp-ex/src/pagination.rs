//! Pagination for the export job listing

/// Largest page a caller can request
pub const MAX_PAGE_SIZE: i64 = 1000;

/// Pagination metadata for one page of a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    pub page_size: i64,
    /// Total number of pages (0 for an empty result set)
    pub total_pages: i64,
    /// Offset for SQL LIMIT/OFFSET
    pub offset: i64,
}

/// Clamp `requested_page` into `[1, total_pages]` and compute the offset
///
/// The page size is clamped into `[1, MAX_PAGE_SIZE]`.
///
/// ```
/// use mxp_ex::pagination::calculate_pagination;
///
/// let p = calculate_pagination(250, 2, 100);
/// assert_eq!((p.page, p.total_pages, p.offset), (2, 3, 100));
///
/// let p = calculate_pagination(250, 99, 100);
/// assert_eq!((p.page, p.offset), (3, 200));
/// ```
pub fn calculate_pagination(total_results: i64, requested_page: i64, page_size: i64) -> Pagination {
    let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
    let total_pages = (total_results.max(0) + page_size - 1) / page_size;
    let page = requested_page.max(1).min(total_pages.max(1));

    Pagination {
        page,
        page_size,
        total_pages,
        offset: (page - 1) * page_size,
    }
}

//! # View Primitives
//!
//! Fixed constants shared by the Casefile views.
//!
//! These are compiled in; the app layer may override the page size through
//! configuration but never the activation length.

/// Number of evidence records requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Minimum query length (in characters) before a search is issued.
///
/// Shorter queries leave the aggregator idle without touching the fetch layer.
pub const MIN_QUERY_CHARS: usize = 2;

/// First page number. Pages are 1-indexed.
pub const FIRST_PAGE: usize = 1;

// =============================================================================
// HELPERS
// =============================================================================

/// Page count for a total record count, `ceil(total_count / page_size)`.
///
/// A zero page size yields zero pages rather than dividing by zero.
#[must_use]
pub const fn page_count(total_count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_count.div_ceil(page_size)
}

/// Whether a query is long enough to trigger a search.
#[must_use]
pub fn query_is_active(query: &str) -> bool {
    query.chars().count() >= MIN_QUERY_CHARS
}

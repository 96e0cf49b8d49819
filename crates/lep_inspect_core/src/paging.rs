//! crates/lep_inspect_core/src/paging.rs
//!
//! Client-side pagination windows over an already materialized collection.
//! Once the aggregator has walked every backend page, both the thumbnail
//! grid and the detail table are pure slices over the same in-memory vector.

/// Page size of the thumbnail grid window.
pub const GRID_PAGE_SIZE: usize = 12;

/// Page size of the detail table window.
pub const TABLE_PAGE_SIZE: usize = 30;

/// Number of pages needed to show `len` items at `page_size` per page.
pub fn page_count(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// The 1-based `page` window of `items`. Out-of-range pages yield an empty
/// slice rather than panicking.
pub fn page_window<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = (start + page_size).min(items.len());
    &items[start..end]
}

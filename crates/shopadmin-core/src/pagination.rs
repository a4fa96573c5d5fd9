//! Client-side pagination math
//!
//! Pages are zero-based everywhere; `item_range` is one-based because it
//! feeds "showing 13–24 of 25" labels.

/// Number of pages needed for `total` items, `ceil(total / page_size)`
#[must_use]
pub fn total_pages(total: u64, page_size: u64) -> u64 {
    total.div_ceil(page_size.max(1))
}

#[must_use]
pub fn has_prev(page: u64) -> bool {
    page > 0
}

#[must_use]
pub fn has_next(page: u64, total_pages: u64) -> bool {
    page.saturating_add(1) < total_pages
}

/// One-based inclusive range of items shown on `page`, `None` past the end
#[must_use]
pub fn item_range(page: u64, page_size: u64, total: u64) -> Option<(u64, u64)> {
    let start = page.checked_mul(page_size.max(1))?;
    if start >= total {
        return None;
    }
    let end = start.saturating_add(page_size.max(1)).min(total);
    Some((start + 1, end))
}

/// Up to `width` consecutive page indices around `current`, clamped to
/// `[0, total_pages)`
#[must_use]
pub fn page_window(current: u64, total_pages: u64, width: u64) -> Vec<u64> {
    if total_pages == 0 || width == 0 {
        return Vec::new();
    }
    let width = width.min(total_pages);
    let current = current.min(total_pages - 1);
    let start = current
        .saturating_sub(width / 2)
        .min(total_pages - width);
    (start..start + width).collect()
}

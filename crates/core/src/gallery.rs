//! Gallery pagination over the enumerated media set.

use serde::Serialize;

use crate::store::MediaItem;

/// One page of media plus the metadata the gallery needs to render
/// navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageResult {
    pub items: Vec<MediaItem>,
    pub current_page: usize,
    pub total_pages: usize,
    pub has_prev: bool,
    pub has_next: bool,
    pub total_count: usize,
    /// 1-based index of the first item on this page (0 when empty).
    pub range_start: usize,
    /// 1-based index of the last item on this page (0 when empty).
    pub range_end: usize,
}

/// Sort `items` newest first and cut out page `page`.
///
/// `page` is clamped into `1..=total_pages`; `total_pages` is at least 1 even
/// for an empty set. Items with equal timestamps are ordered by name.
pub fn paginate(mut items: Vec<MediaItem>, page: i64, page_size: usize) -> PageResult {
    let page_size = page_size.max(1);
    items.sort_by(|a, b| {
        b.modified_at
            .cmp(&a.modified_at)
            .then_with(|| a.name.cmp(&b.name))
    });

    let total_count = items.len();
    let total_pages = total_count.div_ceil(page_size).max(1);
    let current_page = usize::try_from(page).unwrap_or(1).clamp(1, total_pages);

    let start = ((current_page - 1) * page_size).min(total_count);
    let end = (start + page_size).min(total_count);
    let page_items: Vec<MediaItem> = items.drain(start..end).collect();

    let (range_start, range_end) = if page_items.is_empty() {
        (0, 0)
    } else {
        (start + 1, end)
    };

    PageResult {
        items: page_items,
        current_page,
        total_pages,
        has_prev: current_page > 1,
        has_next: current_page < total_pages,
        total_count,
        range_start,
        range_end,
    }
}

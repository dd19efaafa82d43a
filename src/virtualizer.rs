//! Computes which slice of the flattened row list actually has to be
//! materialized for the current scroll position. Row height is uniform, which
//! keeps the index arithmetic O(1); the render layer reserves
//! [content_height] of scrollable space so the host scrollbar stays accurate
//! even though most rows are never built.

/// A half-open index range `[start_index, end_index)` over the flattened rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start_index: usize,
    pub end_index: usize,
}

impl Window {
    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_index && index < self.end_index
    }
}

/// The index range to materialize for the current scroll state.
///
/// `overscan` extra rows are included beyond the viewport in each direction so
/// small scroll steps don't immediately hit unrendered rows. The result always
/// satisfies `0 <= start_index <= end_index <= total_count`.
pub fn visible_window(
    total_count: usize,
    item_height: f64,
    scroll_offset: f64,
    viewport_height: f64,
    overscan: usize,
) -> Window {
    if total_count == 0 || item_height <= 0.0 {
        return Window {
            start_index: 0,
            end_index: 0,
        };
    }

    let scroll_offset = scroll_offset.max(0.0);
    let viewport_height = viewport_height.max(0.0);

    let raw_start = (scroll_offset / item_height).floor() as usize;
    let visible_count = (viewport_height / item_height).ceil() as usize;

    let start_index = raw_start.saturating_sub(overscan).min(total_count);
    let end_index = (raw_start.saturating_add(visible_count + overscan)).min(total_count);

    Window {
        start_index,
        end_index: end_index.max(start_index),
    }
}

/// Total scrollable height the render layer must reserve.
pub fn content_height(total_count: usize, item_height: f64) -> f64 {
    total_count as f64 * item_height
}

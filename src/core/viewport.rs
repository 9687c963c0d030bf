//! Viewport math for the virtualized table body.
//!
//! All values are in the renderer's units (terminal rows for the bundled front-end, pixels for
//! a graphical one). The body viewport excludes the sticky header.

use std::ops::Range;

/// Rows rendered beyond each edge of the viewport to hide pop-in while scrolling.
pub const DEFAULT_OVERSCAN_ROWS: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub height: u32,
    pub row_height: u32,
    pub scroll_offset: u32,
}

impl Viewport {
    pub fn new(height: u32, row_height: u32, scroll_offset: u32) -> Self {
        Self {
            height,
            row_height,
            scroll_offset,
        }
    }

    /// Number of rows that fit completely in the viewport, at least 1.
    pub fn rows_per_page(&self) -> usize {
        if self.row_height == 0 {
            return 1;
        }
        ((self.height / self.row_height) as usize).max(1)
    }
}

/// Index range of the rows that intersect the viewport, widened by `overscan` rows on each side
/// and clamped to `0..total_rows`.
pub fn visible_row_range(
    viewport_height: u32,
    row_height: u32,
    total_rows: usize,
    scroll_offset: u32,
    overscan: usize,
) -> Range<usize> {
    if row_height == 0 || viewport_height == 0 || total_rows == 0 {
        return 0..0;
    }

    let first = (scroll_offset / row_height) as usize;
    let bottom = scroll_offset as u64 + viewport_height as u64;
    let last = bottom.div_ceil(row_height as u64) as usize;

    let start = first.saturating_sub(overscan).min(total_rows);
    let end = last.saturating_add(overscan).min(total_rows);
    start..end.max(start)
}

/// Largest scroll offset that still fills the viewport.
pub fn max_scroll_offset(viewport: &Viewport, total_rows: usize) -> u32 {
    let content = (total_rows as u64).saturating_mul(viewport.row_height as u64);
    content
        .saturating_sub(viewport.height as u64)
        .min(u32::MAX as u64) as u32
}

/// Scroll offset that makes row `index` visible with `padding` rows of context, moving as
/// little as possible.
pub fn scroll_to_reveal(viewport: &Viewport, index: usize, total_rows: usize, padding: usize) -> u32 {
    if viewport.row_height == 0 || total_rows == 0 {
        return 0;
    }
    let rh = viewport.row_height as u64;
    let padding = padding.min(viewport.rows_per_page().saturating_sub(1) / 2) as u64;

    let top_needed = (index as u64).saturating_sub(padding) * rh;
    let bottom_row = (index as u64 + padding + 1).min(total_rows as u64);
    let bottom_needed = bottom_row * rh;

    let mut offset = viewport.scroll_offset as u64;
    if top_needed < offset {
        offset = top_needed;
    } else if bottom_needed > offset + viewport.height as u64 {
        offset = bottom_needed - viewport.height as u64;
    }
    (offset as u32).min(max_scroll_offset(viewport, total_rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_covers_partial_rows_and_overscan() {
        // 10 units high, rows of 4, scrolled 2 into row 0: rows 0..=2 are visible
        assert_eq!(visible_row_range(10, 4, 100, 2, 0), 0..3);
        assert_eq!(visible_row_range(10, 4, 100, 2, 1), 0..4);
        // scrolled into the middle
        assert_eq!(visible_row_range(10, 4, 100, 41, 1), 9..14);
    }

    #[test]
    fn range_is_clamped() {
        assert_eq!(visible_row_range(20, 1, 5, 0, 1), 0..5);
        assert_eq!(visible_row_range(20, 1, 5, 100, 1), 5..5);
        assert_eq!(visible_row_range(0, 1, 5, 0, 1), 0..0);
        assert_eq!(visible_row_range(20, 0, 5, 0, 1), 0..0);
        assert_eq!(visible_row_range(20, 1, 0, 0, 1), 0..0);
    }

    #[test]
    fn exact_fit_does_not_include_next_row() {
        assert_eq!(visible_row_range(10, 1, 100, 0, 0), 0..10);
        assert_eq!(visible_row_range(10, 1, 100, 0, DEFAULT_OVERSCAN_ROWS), 0..11);
    }

    #[test]
    fn reveal_scrolls_minimally() {
        let vp = Viewport::new(10, 1, 0);
        assert_eq!(scroll_to_reveal(&vp, 5, 100, 0), 0);
        assert_eq!(scroll_to_reveal(&vp, 12, 100, 0), 3);
        assert_eq!(scroll_to_reveal(&vp, 12, 100, 2), 5);

        let scrolled = Viewport::new(10, 1, 50);
        assert_eq!(scroll_to_reveal(&scrolled, 48, 100, 0), 48);
        assert_eq!(scroll_to_reveal(&scrolled, 99, 100, 3), 90);
    }

    #[test]
    fn max_scroll_never_underflows() {
        assert_eq!(max_scroll_offset(&Viewport::new(10, 1, 0), 3), 0);
        assert_eq!(max_scroll_offset(&Viewport::new(10, 2, 0), 30), 50);
    }
}

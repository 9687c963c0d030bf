//! Column width tracking for the virtualized table.
//!
//! Only the rows inside the viewport are ever measured, so a column's width is the widest
//! content seen so far rather than the widest content in the listing. Widths only grow within a
//! listing generation: a column does not shrink when its widest row scrolls out of view, which
//! keeps the layout from jittering while scrolling. The table resets the widths whenever it
//! installs a new generation.

#[derive(Debug, Default, Clone)]
pub struct ColumnWidths {
    widths: Vec<u32>,
}

impl ColumnWidths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a measured width for `column`. Returns `true` if the column grew.
    pub fn observe(&mut self, column: usize, measured: u32) -> bool {
        if column >= self.widths.len() {
            self.widths.resize(column + 1, 0);
        }
        let current = &mut self.widths[column];
        if measured > *current {
            *current = measured;
            true
        } else {
            false
        }
    }

    /// Widest content observed for `column`, 0 before the first observation.
    #[inline]
    pub fn width_of(&self, column: usize) -> u32 {
        self.widths.get(column).copied().unwrap_or(0)
    }

    /// Snapshot of the first `columns` widths.
    pub fn snapshot(&self, columns: usize) -> Vec<u32> {
        (0..columns).map(|c| self.width_of(c)).collect()
    }

    pub fn reset(&mut self) {
        self.widths.clear();
    }
}

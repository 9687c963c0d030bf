//! Table configuration options for tau.
//!
//! The `[table]` section: which columns are shown, how the virtualized body is laid out, and how
//! the background metadata resolution behaves.

use crate::core::worker::MAX_METADATA_THREADS;
use crate::core::{ColumnKind, DEFAULT_OVERSCAN_ROWS, SizeUnits};

use serde::Deserialize;

use std::time::Duration;

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Table {
    columns: Vec<ColumnKind>,
    overscan_rows: usize,
    cell_padding: u32,
    size_units: SizeUnits,
    recursive_counts: bool,
    metadata_threads: usize,
    auto_refresh_secs: u64,
    double_click_ms: u64,
    mouse: bool,
    scroll_padding: usize,
}

impl Default for Table {
    fn default() -> Self {
        Table {
            columns: ColumnKind::ALL.to_vec(),
            overscan_rows: DEFAULT_OVERSCAN_ROWS,
            cell_padding: 2,
            size_units: SizeUnits::Decimal,
            recursive_counts: false,
            metadata_threads: 2,
            auto_refresh_secs: 2,
            double_click_ms: 400,
            mouse: true,
            scroll_padding: 2,
        }
    }
}

impl Table {
    /// Configured columns in order, without duplicates. Falls back to every column if empty.
    pub fn columns(&self) -> Vec<ColumnKind> {
        let mut out: Vec<ColumnKind> = Vec::with_capacity(self.columns.len());
        for col in &self.columns {
            if !out.contains(col) {
                out.push(*col);
            }
        }
        if out.is_empty() {
            out.extend(ColumnKind::ALL);
        }
        out
    }

    #[inline]
    pub fn overscan_rows(&self) -> usize {
        self.overscan_rows
    }

    #[inline]
    pub fn cell_padding(&self) -> u32 {
        self.cell_padding
    }

    #[inline]
    pub fn size_units(&self) -> SizeUnits {
        self.size_units
    }

    #[inline]
    pub fn recursive_counts(&self) -> bool {
        self.recursive_counts
    }

    #[inline]
    pub fn metadata_threads(&self) -> usize {
        self.metadata_threads.clamp(1, MAX_METADATA_THREADS)
    }

    /// Interval for re-reading the current directory, `None` if disabled.
    pub fn auto_refresh(&self) -> Option<Duration> {
        (self.auto_refresh_secs > 0).then(|| Duration::from_secs(self.auto_refresh_secs))
    }

    #[inline]
    pub fn double_click(&self) -> Duration {
        Duration::from_millis(self.double_click_ms)
    }

    #[inline]
    pub fn mouse(&self) -> bool {
        self.mouse
    }

    #[inline]
    pub fn scroll_padding(&self) -> usize {
        self.scroll_padding
    }
}

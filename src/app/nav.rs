//! Navigation state for tau.
//!
//! Tracks the current directory, the cursor and the scroll offset of the table, and the cursor
//! position remembered for every visited directory.
//!
//! The cursor is stored as a path, not a row, so it stays on the same entry when the table
//! reorders (sort change, metadata arriving, refresh).

use crate::core::VirtualTable;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub struct NavState {
    current_dir: PathBuf,
    cursor: Option<PathBuf>,
    scroll: u32,
    follow_cursor: bool,
    positions: HashMap<PathBuf, PathBuf>,
    request_id: u64,
}

impl NavState {
    pub fn new(path: PathBuf) -> Self {
        Self {
            current_dir: path,
            cursor: None,
            scroll: 0,
            follow_cursor: true,
            positions: HashMap::new(),
            request_id: 0,
        }
    }

    // Getters / Accessors

    #[inline]
    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    #[inline]
    pub fn cursor(&self) -> Option<&Path> {
        self.cursor.as_deref()
    }

    /// Scroll offset of the table body, in rows.
    #[inline]
    pub fn scroll(&self) -> u32 {
        self.scroll
    }

    #[inline]
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    /// Row of the cursor in `table`, 0 if the cursor is unset or gone.
    pub fn cursor_row(&self, table: &VirtualTable) -> usize {
        self.cursor
            .as_deref()
            .and_then(|p| table.row_of(p))
            .unwrap_or(0)
    }

    /// Remembered cursor entry for `dir`.
    pub fn position_for(&self, dir: &Path) -> Option<&Path> {
        self.positions.get(dir).map(PathBuf::as_path)
    }

    // Navigation functions

    /// Prepares a new request by incrementing the request ID.
    pub fn prepare_new_request(&mut self) -> u64 {
        self.request_id = self.request_id.wrapping_add(1);
        self.request_id
    }

    /// Sets a new current directory, remembering the cursor of the old one.
    /// Increments the request ID so responses for the old directory are ignored.
    pub fn set_path(&mut self, path: PathBuf) {
        self.save_position();

        self.current_dir = path;
        self.cursor = None;
        self.scroll = 0;
        self.follow_cursor = true;
        self.request_id = self.request_id.wrapping_add(1);
    }

    /// Saves the current cursor for the current directory.
    pub fn save_position(&mut self) {
        if let Some(cursor) = &self.cursor {
            self.positions
                .insert(self.current_dir.clone(), cursor.clone());
        }
    }

    /// Puts the cursor on `row` of `table` and asks the viewport to reveal it.
    /// Returns the path under the cursor, `None` for an empty table.
    pub fn set_cursor_row(&mut self, table: &VirtualTable, row: usize) -> Option<PathBuf> {
        let last = table.len().checked_sub(1)?;
        let path = table.entry(row.min(last))?.path().to_path_buf();
        self.cursor = Some(path.clone());
        self.follow_cursor = true;
        Some(path)
    }

    pub fn set_cursor(&mut self, path: Option<PathBuf>) {
        self.cursor = path;
        self.follow_cursor = true;
    }

    /// Puts the cursor on `path` without moving the viewport.
    pub fn place_cursor(&mut self, path: PathBuf) {
        self.cursor = Some(path);
    }

    /// Moves the cursor up by one entry, wrapping around if necessary.
    pub fn move_up(&mut self, table: &VirtualTable) -> Option<PathBuf> {
        let len = table.len();
        if len == 0 {
            return None;
        }
        let row = self.cursor_row(table);
        let next = if row == 0 { len - 1 } else { row - 1 };
        self.set_cursor_row(table, next)
    }

    /// Moves the cursor down by one entry, wrapping around if necessary.
    pub fn move_down(&mut self, table: &VirtualTable) -> Option<PathBuf> {
        let len = table.len();
        if len == 0 {
            return None;
        }
        let next = (self.cursor_row(table) + 1) % len;
        self.set_cursor_row(table, next)
    }

    /// Moves the cursor by `delta` rows, clamped to the table.
    pub fn move_by(&mut self, table: &VirtualTable, delta: isize) -> Option<PathBuf> {
        let row = self.cursor_row(table).saturating_add_signed(delta);
        self.set_cursor_row(table, row)
    }

    /// Scrolls the viewport without moving the cursor.
    pub fn set_scroll(&mut self, scroll: u32) {
        self.scroll = scroll;
        self.follow_cursor = false;
    }

    /// Returns whether the viewport should be moved to the cursor, and resets the request.
    pub fn take_follow(&mut self) -> bool {
        std::mem::take(&mut self.follow_cursor)
    }

    /// Stores the offset the viewport settled on, keeping the follow request untouched.
    pub(crate) fn store_scroll(&mut self, scroll: u32) {
        self.scroll = scroll;
    }
}

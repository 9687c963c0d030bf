//! Input action handler methods for tau.
//!
//! This module implements [AppState] methods that process key and mouse events and turn them into
//! cursor moves, selection changes and table interactions.

use crate::app::NavState;
use crate::app::keymap::{NavAction, SelectAction, SystemAction, TableAction};
use crate::app::state::{AppState, KeypressResult};
use crate::core::{ClickModifiers, VirtualTable};

use crossterm::event::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};

use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Rows scrolled per mouse wheel notch.
const WHEEL_ROWS: u32 = 3;

/// AppState input and action handlers
impl<'a> AppState<'a> {
    /// Handles navigation actions (cursor moves, parent directory).
    /// Moving the cursor plainly selects the entry under it.
    pub(super) fn handle_nav_action(&mut self, action: NavAction) -> KeypressResult {
        match action {
            NavAction::GoUp => self.move_cursor(|nav, table| nav.move_up(table)),
            NavAction::GoDown => self.move_cursor(|nav, table| nav.move_down(table)),
            NavAction::GoToTop => self.move_cursor(|nav, table| nav.set_cursor_row(table, 0)),
            NavAction::GoToBottom => self.move_cursor(|nav, table| {
                nav.set_cursor_row(table, table.len().saturating_sub(1))
            }),
            NavAction::PageUp => {
                let page = self.page_rows();
                self.move_cursor(|nav, table| nav.move_by(table, -page));
            }
            NavAction::PageDown => {
                let page = self.page_rows();
                self.move_cursor(|nav, table| nav.move_by(table, page));
            }
            NavAction::GoParent => return self.handle_go_parent(),
        }
        KeypressResult::Continue
    }

    /// Handles selection actions. Extending moves the cursor without wrapping and selects the
    /// range from the anchor to the new cursor.
    pub(super) fn handle_select_action(&mut self, action: SelectAction) -> KeypressResult {
        match action {
            SelectAction::ExtendUp => self.extend_cursor(-1),
            SelectAction::ExtendDown => self.extend_cursor(1),
            SelectAction::Toggle => {
                if let Some(path) = self.nav.cursor().map(|p| p.to_path_buf()) {
                    self.table.toggle(&path);
                }
            }
            SelectAction::SelectAll => self.table.select_all(),
            SelectAction::Clear => self.table.clear_selection(),
        }
        KeypressResult::Continue
    }

    pub(super) fn handle_table_action(&mut self, action: TableAction) -> KeypressResult {
        match action {
            TableAction::Open => {
                if !self.table.is_empty() {
                    let row = self.nav.cursor_row(&self.table);
                    self.table.activate_row(row);
                }
            }
            TableAction::SortBy(column) => {
                let spec = self.table.sort_spec().toggled_by(column);
                self.table.set_sort(spec);
            }
            TableAction::Reload => self.request_dir_load(None),
        }
        KeypressResult::Continue
    }

    pub(super) fn handle_sys_action(&mut self, action: SystemAction) -> KeypressResult {
        match action {
            SystemAction::Quit => KeypressResult::Quit,
        }
    }

    /// Handles mouse input on the table.
    ///
    /// A header click sorts by that column, a row click selects (ctrl toggles, shift extends),
    /// two clicks on the same row within `double_click_ms` open it, and the wheel scrolls.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> KeypressResult {
        if !self.config.table().mouse() || self.listing_error.is_some() {
            return KeypressResult::Continue;
        }
        let pos = Position::new(mouse.column, mouse.row);

        let result = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if self.metrics.header.contains(pos) => {
                if let Some(column) = self.metrics.column_at(pos.x) {
                    self.table.click_header(column);
                }
                KeypressResult::Consumed
            }
            MouseEventKind::Down(MouseButton::Left) if self.metrics.body.contains(pos) => {
                self.handle_row_click(self.metrics.body, pos, mouse.modifiers)
            }
            MouseEventKind::ScrollDown => {
                self.nav
                    .set_scroll(self.nav.scroll().saturating_add(WHEEL_ROWS));
                KeypressResult::Consumed
            }
            MouseEventKind::ScrollUp => {
                self.nav
                    .set_scroll(self.nav.scroll().saturating_sub(WHEEL_ROWS));
                KeypressResult::Consumed
            }
            _ => KeypressResult::Continue,
        };

        match self.process_table_events() {
            KeypressResult::Continue => result,
            from_events => from_events,
        }
    }

    fn handle_row_click(
        &mut self,
        body: Rect,
        pos: Position,
        modifiers: KeyModifiers,
    ) -> KeypressResult {
        let row = self.nav.scroll() as usize + usize::from(pos.y - body.y);
        let Some(path) = self.table.entry(row).map(|e| e.path().to_path_buf()) else {
            return KeypressResult::Continue;
        };

        let now = Instant::now();
        let double_click = self.config.table().double_click();
        let is_double = self.last_click.as_ref().is_some_and(|(last, at)| {
            *last == path && now.duration_since(*at) <= double_click
        });

        self.nav.place_cursor(path.clone());
        if is_double {
            self.last_click = None;
            self.table.activate_row(row);
        } else {
            self.last_click = Some((path, now));
            self.table.click_row(row, click_modifiers(modifiers));
        }
        KeypressResult::Consumed
    }

    fn move_cursor<F>(&mut self, f: F)
    where
        F: FnOnce(&mut NavState, &VirtualTable) -> Option<PathBuf>,
    {
        if let Some(path) = f(&mut self.nav, &self.table) {
            self.table.select(&path);
        }
    }

    fn extend_cursor(&mut self, delta: isize) {
        if let Some(path) = self.nav.move_by(&self.table, delta) {
            self.table.extend_to(&path);
        }
    }

    fn page_rows(&self) -> isize {
        self.metrics.body.height.max(1) as isize
    }

    /// Handles the go to parent directory action.
    ///
    /// If the current directory has a parent, navigates to it and puts the cursor on the
    /// directory that was left.
    fn handle_go_parent(&mut self) -> KeypressResult {
        let current = self.nav.current_dir().to_path_buf();

        let Some(parent) = current.parent() else {
            return KeypressResult::Continue;
        };

        if std::fs::metadata(parent).is_err() {
            self.notify("Parent directory is unreachable", Duration::from_secs(3));
            return KeypressResult::Consumed;
        }

        self.navigate_to(parent.to_path_buf(), Some(current.clone()));
        KeypressResult::Continue
    }
}

fn click_modifiers(modifiers: KeyModifiers) -> ClickModifiers {
    ClickModifiers {
        shift: modifiers.contains(KeyModifiers::SHIFT),
        ctrl: modifiers.contains(KeyModifiers::CONTROL),
    }
}

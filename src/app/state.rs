//! Application State and main controller module for tau.
//!
//! [AppState] ties the [VirtualTable] to everything around it: the loaded [Config] and keymap,
//! the cursor and history in [NavState], the listing and metadata workers, and the layout of the
//! last drawn frame for mouse hit testing. It also keeps the one-line notification and the
//! listing error shown in place of the table.
//!
//! The terminal loop calls [AppState::tick] between input events.

use crate::app::NavState;
use crate::app::keymap::{Action, Keymap, NavAction, TableAction};
use crate::config::Config;
use crate::core::worker::{WorkerResponse, WorkerTask, Workers};
use crate::core::{
    DirEntry, FsProbe, FsSource, ListingError, TableEvent, VirtualTable, Viewport,
    max_scroll_offset, scroll_to_reveal,
};
use crate::utils::open_in_editor;

use crossterm::event::KeyEvent;
use ratatui::layout::Rect;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use std::{fs, io};

/// Enumeration for each individual keypress result processed.
///
/// Is used by the terminal loop to decide whether to quit or fully redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeypressResult {
    Continue,
    Consumed,
    Quit,
    OpenedEditor,
    Recovered,
}

/// Where the table was drawn last frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutMetrics {
    /// Row of the sticky header.
    pub header: Rect,
    /// Rows of the table body.
    pub body: Rect,
    /// Horizontal span `(x, width)` of every column.
    pub columns: Vec<(u16, u16)>,
}

impl LayoutMetrics {
    /// Index of the column under screen column `x`.
    pub fn column_at(&self, x: u16) -> Option<usize> {
        self.columns
            .iter()
            .position(|&(start, width)| x >= start && x < start.saturating_add(width))
    }
}

/// Main struct which holds the central Application state of tau
///
/// Includes:
/// - References to configuration settings and the keymap.
/// - The [VirtualTable] of the current directory and the [NavState] driving it.
/// - crossbeam channels for communication with background worker threads
/// - Notification timing, loading and listing error indicators
pub struct AppState<'a> {
    pub(super) config: &'a Config,
    pub(super) keymap: Keymap,

    pub(super) metrics: LayoutMetrics,

    pub(super) nav: NavState,
    pub(super) table: VirtualTable,

    pub(super) workers: Workers,
    pub(super) is_loading: bool,
    pub(super) listing_error: Option<ListingError>,
    pub(super) last_refresh: Instant,

    pub(super) notification: Option<(String, Instant)>,
    pub(super) last_click: Option<(PathBuf, Instant)>,
}

impl<'a> AppState<'a> {
    pub fn new(config: &'a Config) -> io::Result<Self> {
        let current_dir = std::env::current_dir()?;
        Self::from_dir(config, &current_dir)
    }

    pub fn from_dir(config: &'a Config, initial_path: &Path) -> io::Result<Self> {
        let current_dir = if initial_path.is_dir() {
            initial_path.to_path_buf()
        } else {
            std::env::current_dir()?
        };

        let workers = Workers::spawn(
            Arc::new(FsSource::new(config.general().show_hidden())),
            Arc::new(FsProbe::new(config.table().recursive_counts())),
            config.table().metadata_threads(),
        );
        let table = VirtualTable::new(config.table_options(), Box::new(workers.resolver()));

        let mut app = Self {
            config,
            keymap: Keymap::from_config(config),
            metrics: LayoutMetrics::default(),
            nav: NavState::new(current_dir),
            table,
            workers,
            is_loading: false,
            listing_error: None,
            last_refresh: Instant::now(),
            notification: None,
            last_click: None,
        };

        app.request_dir_load(None);
        Ok(app)
    }

    // Getters/ accessors

    #[inline]
    pub fn config(&self) -> &Config {
        self.config
    }

    #[inline]
    pub fn nav(&self) -> &NavState {
        &self.nav
    }

    #[inline]
    pub fn table(&self) -> &VirtualTable {
        &self.table
    }

    #[inline]
    pub fn table_mut(&mut self) -> &mut VirtualTable {
        &mut self.table
    }

    #[inline]
    pub fn metrics(&self) -> &LayoutMetrics {
        &self.metrics
    }

    #[inline]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    #[inline]
    pub fn listing_error(&self) -> Option<&ListingError> {
        self.listing_error.as_ref()
    }

    #[inline]
    pub fn notification(&self) -> Option<&str> {
        self.notification.as_ref().map(|(text, _)| text.as_str())
    }

    pub fn update_layout_metrics(&mut self, metrics: LayoutMetrics) {
        self.metrics = metrics;
    }

    /// Shows `text` in the status line for `duration`.
    pub fn notify(&mut self, text: impl Into<String>, duration: Duration) {
        self.notification = Some((text.into(), Instant::now() + duration));
    }

    /// Builds the viewport for a table body of `body_height` rows.
    ///
    /// Reveals the cursor if it moved since the last frame, otherwise keeps the scroll offset
    /// clamped to the listing.
    pub fn prepare_viewport(&mut self, body_height: u16) -> Viewport {
        let mut viewport = Viewport::new(u32::from(body_height), 1, self.nav.scroll());
        let total = self.table.len();

        let scroll = if self.nav.take_follow() {
            scroll_to_reveal(
                &viewport,
                self.nav.cursor_row(&self.table),
                total,
                self.config.table().scroll_padding(),
            )
        } else {
            viewport
                .scroll_offset
                .min(max_scroll_offset(&viewport, total))
        };

        self.nav.store_scroll(scroll);
        viewport.scroll_offset = scroll;
        viewport
    }

    /// Drains worker responses into the table, expires the notification and triggers the
    /// periodic refresh.
    ///
    /// Returns true if anything visible changed and a redraw is needed.
    pub fn tick(&mut self) -> bool {
        let mut changed = false;

        if let Some((_, expiry)) = &self.notification
            && Instant::now() >= *expiry
        {
            self.notification = None;
            changed = true;
        }

        let mut resolved = Vec::new();

        // Process worker response
        while let Ok(response) = self.workers.response_rx().try_recv() {
            match response {
                WorkerResponse::DirectoryLoaded {
                    path,
                    entries,
                    focus,
                    request_id,
                } => {
                    // only install the listing if BOTH the ID and path match.
                    if request_id != self.nav.request_id() || path != self.nav.current_dir() {
                        log::debug!("dropping stale listing of {}", path.display());
                        continue;
                    }
                    self.is_loading = false;
                    self.listing_error = None;
                    self.last_refresh = Instant::now();
                    changed = true;

                    if focus.is_none()
                        && self.table.generation() > 0
                        && self.table.is_unchanged(&entries)
                    {
                        continue;
                    }
                    self.install_listing(entries, focus);
                }

                WorkerResponse::ListingFailed { error, request_id } => {
                    if request_id != self.nav.request_id() {
                        continue;
                    }
                    log::warn!("{error}");
                    self.is_loading = false;
                    self.last_refresh = Instant::now();
                    self.listing_error = Some(error);
                    changed = true;
                }

                WorkerResponse::MetadataResolved(result) => resolved.push(result),
            }
        }

        if !resolved.is_empty() && self.table.apply_resolved_batch(resolved) > 0 {
            changed = true;
        }

        if self.process_table_events() != KeypressResult::Continue {
            changed = true;
        }

        if let Some(interval) = self.config.table().auto_refresh()
            && !self.is_loading
            && self.last_refresh.elapsed() >= interval
        {
            self.request_dir_load(None);
        }

        changed
    }

    /// Central key handler
    ///
    /// Looks the key up in the keymap and dispatches it to the handler module functions.
    pub fn handle_keypress(&mut self, key: KeyEvent) -> KeypressResult {
        let result = match self.keymap.lookup(key) {
            // the table is hidden behind the error, so only ways out of it remain
            Some(action) if self.listing_error.is_some() && !works_without_listing(action) => {
                KeypressResult::Continue
            }
            Some(Action::System(sys_act)) => self.handle_sys_action(sys_act),
            Some(Action::Nav(nav_act)) => self.handle_nav_action(nav_act),
            Some(Action::Select(sel_act)) => self.handle_select_action(sel_act),
            Some(Action::Table(table_act)) => self.handle_table_action(table_act),
            None => KeypressResult::Continue,
        };

        match (result, self.process_table_events()) {
            (KeypressResult::Quit, _) => KeypressResult::Quit,
            (_, KeypressResult::Continue) => result,
            (_, from_events) => from_events,
        }
    }

    /// Acts on the events the table queued since the last call.
    ///
    /// Opening a directory navigates into it, opening anything else starts the editor.
    pub(crate) fn process_table_events(&mut self) -> KeypressResult {
        let mut result = KeypressResult::Continue;
        for event in self.table.drain_events() {
            match event {
                TableEvent::Open(path) => result = self.open_path(&path),
                TableEvent::SelectionChanged(paths) => {
                    log::debug!("selection changed: {} path(s)", paths.len());
                }
                TableEvent::SortChanged(spec) => {
                    self.notify(format!("Sorted by {spec}"), Duration::from_secs(2));
                    result = KeypressResult::Consumed;
                }
                TableEvent::MetadataUpdated { .. } => {}
            }
        }
        result
    }

    // Worker requests and navigation

    /// Requests a listing of the current navigation directory
    ///
    /// `focus` is the entry the cursor should land on once the listing arrives.
    pub(crate) fn request_dir_load(&mut self, focus: Option<PathBuf>) {
        self.is_loading = true;
        self.last_refresh = Instant::now();
        let request_id = self.nav.prepare_new_request();

        let task = WorkerTask::LoadDirectory {
            path: self.nav.current_dir().to_path_buf(),
            focus,
            request_id,
        };
        if let Err(e) = self.workers.io_tx().send(task) {
            log::warn!("listing worker is gone: {e}");
            self.is_loading = false;
        }
    }

    /// Moves to `dir` and requests its listing.
    pub(crate) fn navigate_to(&mut self, dir: PathBuf, focus: Option<PathBuf>) {
        self.nav.set_path(dir);
        self.listing_error = None;
        self.request_dir_load(focus);
    }

    fn install_listing(&mut self, entries: Vec<DirEntry>, focus: Option<PathBuf>) {
        let previous = self.nav.cursor().map(Path::to_path_buf);
        let previous_row = self.nav.cursor_row(&self.table);

        self.table.set_listing(entries);

        if let Some(target) = focus.filter(|p| self.table.contains(p)) {
            self.nav.set_cursor(Some(target));
        } else if previous.as_deref().is_some_and(|p| self.table.contains(p)) {
            // cursor entry survived the refresh
        } else if let Some(saved) = self
            .nav
            .position_for(self.nav.current_dir())
            .filter(|p| self.table.contains(p))
            .map(Path::to_path_buf)
        {
            self.nav.set_cursor(Some(saved));
        } else if self.nav.set_cursor_row(&self.table, previous_row).is_none() {
            self.nav.set_cursor(None);
        }
    }

    fn open_path(&mut self, path: &Path) -> KeypressResult {
        let meta = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) => {
                self.notify(
                    format!("{} is unreachable: {e}", path.display()),
                    Duration::from_secs(3),
                );
                return KeypressResult::Consumed;
            }
        };

        if meta.is_dir() {
            return match fs::read_dir(path) {
                Ok(_) => {
                    self.navigate_to(path.to_path_buf(), None);
                    KeypressResult::Consumed
                }
                Err(e) => {
                    self.notify(format!("Cannot open directory: {e}"), Duration::from_secs(3));
                    KeypressResult::Consumed
                }
            };
        }

        match open_in_editor(self.config.editor(), path) {
            Ok(()) => KeypressResult::OpenedEditor,
            Err(e) => {
                log::warn!("editor {:?} failed: {e}", self.config.editor().cmd());
                self.notify(e.to_string(), Duration::from_secs(3));
                KeypressResult::Recovered
            }
        }
    }
}

// AppState tests
/// Actions that stay available while a listing error replaces the table.
fn works_without_listing(action: Action) -> bool {
    matches!(
        action,
        Action::System(_) | Action::Nav(NavAction::GoParent) | Action::Table(TableAction::Reload)
    )
}

//! The virtualized detail table.
//!
//! [VirtualTable] owns one listing and everything derived from it: the sorted order, the
//! selection, the lazily resolved metadata and the running column widths. Renderers never read
//! the whole listing. They call [VirtualTable::render] with a [Viewport] and draw the
//! [TableFrame] it returns, which only holds the header and the rows inside the viewport.
//!
//! Interaction goes the other way through [VirtualTable::click_header],
//! [VirtualTable::click_row] and [VirtualTable::activate_row]. Outcomes the host has to act on
//! (opening a path, a new selection, a new sort) are queued as [TableEvent]s and drained with
//! [VirtualTable::drain_events].
//!
//! Every mutation runs to completion before returning, so a render always observes a single
//! consistent listing generation, sort and selection.

use crate::core::cache::{EntryCache, MetaKind, Metadata, Resolved, Resolver};
use crate::core::entry::{DirEntry, dedup_paths};
use crate::core::formatter::{CellFormatter, Measure, SizeUnits};
use crate::core::layout::ColumnWidths;
use crate::core::selection::Selection;
use crate::core::sort::{ColumnKind, SortSpec, Sorter};
use crate::core::viewport::{DEFAULT_OVERSCAN_ROWS, Viewport, visible_row_range};

use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Where a table is in its listing lifecycle.
///
/// `Sorting` and `Refreshing` only exist while a mutation is running; any caller holding the
/// table between calls sees `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Sorting,
    Refreshing,
}

/// Outcomes queued for the host application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    /// A row was activated (double click or enter).
    Open(PathBuf),
    /// The selected set changed. Paths are in display order.
    SelectionChanged(Vec<PathBuf>),
    SortChanged(SortSpec),
    MetadataUpdated { path: PathBuf, kind: MetaKind },
}

/// Modifier keys held during a row click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClickModifiers {
    pub shift: bool,
    pub ctrl: bool,
}

impl ClickModifiers {
    pub const NONE: ClickModifiers = ClickModifiers {
        shift: false,
        ctrl: false,
    };
}

/// Table construction options.
#[derive(Debug, Clone)]
pub struct TableOptions {
    pub columns: Vec<ColumnKind>,
    pub dirs_first: bool,
    pub case_insensitive: bool,
    pub overscan: usize,
    /// Added to every measured cell width.
    pub cell_padding: u32,
    pub size_units: SizeUnits,
}

impl Default for TableOptions {
    fn default() -> Self {
        TableOptions {
            columns: ColumnKind::ALL.to_vec(),
            dirs_first: true,
            case_insensitive: true,
            overscan: DEFAULT_OVERSCAN_ROWS,
            cell_padding: 2,
            size_units: SizeUnits::Decimal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub column: ColumnKind,
    pub label: String,
    pub sorted: bool,
    pub width: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameRow {
    /// Row index in the current order.
    pub index: usize,
    pub path: PathBuf,
    pub is_dir: bool,
    pub is_symlink: bool,
    pub is_broken_sym: bool,
    pub selected: bool,
    pub cells: Vec<String>,
}

/// One committed frame: the sticky header and the rows of the visible range.
///
/// Every cell of the frame is laid out with `widths`, which already account for every row in
/// `body`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFrame {
    pub generation: u64,
    pub rows: Range<usize>,
    pub total_rows: usize,
    pub widths: Vec<u32>,
    pub header: Vec<HeaderCell>,
    pub body: Vec<FrameRow>,
}

pub struct VirtualTable {
    generation: u64,
    entries: Vec<DirEntry>,
    index: HashMap<PathBuf, usize>,
    /// Position of each path in the listing as it was installed.
    arrival: HashMap<PathBuf, usize>,
    sort: SortSpec,
    sorter: Sorter,
    selection: Selection,
    cache: EntryCache,
    widths: ColumnWidths,
    columns: Vec<ColumnKind>,
    formatter: CellFormatter,
    resolver: Box<dyn Resolver>,
    events: Vec<TableEvent>,
    phase: Phase,
    overscan: usize,
    cell_padding: u32,
}

impl VirtualTable {
    /// Creates an empty table at generation 0. Metadata misses are handed to `resolver`.
    pub fn new(options: TableOptions, resolver: Box<dyn Resolver>) -> Self {
        let columns = if options.columns.is_empty() {
            ColumnKind::ALL.to_vec()
        } else {
            options.columns
        };

        VirtualTable {
            generation: 0,
            entries: Vec::new(),
            index: HashMap::new(),
            arrival: HashMap::new(),
            sort: SortSpec::default(),
            sorter: Sorter::new(options.dirs_first, options.case_insensitive),
            selection: Selection::new(),
            cache: EntryCache::new(),
            widths: ColumnWidths::new(),
            columns,
            formatter: CellFormatter::new(options.size_units),
            resolver,
            events: Vec::new(),
            phase: Phase::Idle,
            overscan: options.overscan,
            cell_padding: options.cell_padding,
        }
    }

    // Getters / Accessors

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn sort_spec(&self) -> SortSpec {
        self.sort
    }

    /// Entries in display order.
    #[inline]
    pub fn current_order(&self) -> &[DirEntry] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn columns(&self) -> &[ColumnKind] {
        &self.columns
    }

    #[inline]
    pub fn overscan(&self) -> usize {
        self.overscan
    }

    pub fn entry(&self, row: usize) -> Option<&DirEntry> {
        self.entries.get(row)
    }

    /// Display row of `path`, if it is in the listing.
    pub fn row_of(&self, path: &Path) -> Option<usize> {
        self.index.get(path).copied()
    }

    #[inline]
    pub fn contains(&self, path: &Path) -> bool {
        self.index.contains_key(path)
    }

    #[inline]
    pub fn is_selected(&self, path: &Path) -> bool {
        self.selection.is_selected(path)
    }

    #[inline]
    pub fn selection_len(&self) -> usize {
        self.selection.len()
    }

    /// Selected paths in display order.
    pub fn selected_paths(&self) -> Vec<PathBuf> {
        let mut rows: Vec<usize> = self
            .selection
            .iter()
            .filter_map(|p| self.index.get(p).copied())
            .collect();
        rows.sort_unstable();
        rows.into_iter()
            .map(|i| self.entries[i].path().to_path_buf())
            .collect()
    }

    /// Running width of `column`, 0 before it has been measured in this generation.
    #[inline]
    pub fn width_of(&self, column: usize) -> u32 {
        self.widths.width_of(column)
    }

    /// Cached metadata state of `(path, kind)`, without scheduling anything.
    pub fn metadata(&self, path: &Path, kind: MetaKind) -> Option<Metadata> {
        self.cache.state(path, kind)
    }

    /// Number of metadata resolutions still in flight.
    pub fn pending_metadata(&self) -> usize {
        self.cache.pending()
    }

    pub fn drain_events(&mut self) -> Vec<TableEvent> {
        std::mem::take(&mut self.events)
    }

    /// Returns `true` if `entries` describe exactly the installed listing, ignoring order.
    pub fn is_unchanged(&self, entries: &[DirEntry]) -> bool {
        entries.len() == self.entries.len()
            && entries
                .iter()
                .all(|e| self.row_of(e.path()).is_some_and(|i| self.entries[i] == *e))
    }

    // Listing and sort

    /// Installs a new listing as the next generation.
    ///
    /// Duplicate paths keep their first occurrence. The selection is intersected with the new
    /// paths, cached metadata of vanished paths is dropped, column widths start over and the
    /// active sort is applied before returning.
    pub fn set_listing(&mut self, mut entries: Vec<DirEntry>) {
        self.phase = Phase::Refreshing;

        let dropped = dedup_paths(&mut entries);
        if dropped > 0 {
            log::warn!("listing contained {dropped} duplicate path(s), keeping first occurrences");
        }

        self.generation += 1;
        let live: HashSet<PathBuf> = entries.iter().map(|e| e.path().to_path_buf()).collect();

        let selection_changed = self.selection.reconcile(&live);
        self.cache.invalidate(self.generation, &live);
        self.widths.reset();

        self.arrival = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.path().to_path_buf(), i))
            .collect();
        self.entries = entries;
        self.sorter.sort(&mut self.entries, self.sort, &self.cache);
        self.rebuild_index();

        if selection_changed {
            self.emit_selection();
        }
        self.phase = Phase::Idle;
    }

    /// Makes `spec` the active sort. Selection and cached metadata are untouched.
    pub fn set_sort(&mut self, spec: SortSpec) {
        if spec == self.sort {
            return;
        }
        self.phase = Phase::Sorting;
        self.sort = spec;
        self.resort();
        self.events.push(TableEvent::SortChanged(spec));
        self.phase = Phase::Idle;
    }

    /// Sorts by the column at `column_index`, flipping direction if it is already active.
    pub fn click_header(&mut self, column_index: usize) {
        let Some(&key) = self.columns.get(column_index) else {
            return;
        };
        self.set_sort(self.sort.toggled_by(key));
    }

    /// Stores a background metadata result.
    ///
    /// Stale results are discarded. When the active sort depends on the resolved kind the order
    /// is recomputed; stability keeps every other row where it was.
    pub fn apply_resolved(&mut self, resolved: Resolved) -> bool {
        let applied = self.store_resolved(resolved);
        if let Some(kind) = applied
            && self.sort_depends_on(kind)
        {
            self.resort();
        }
        applied.is_some()
    }

    /// Applies a batch of results, recomputing the order at most once.
    ///
    /// Returns the number of results that were not stale.
    pub fn apply_resolved_batch(&mut self, batch: impl IntoIterator<Item = Resolved>) -> usize {
        let mut applied = 0;
        let mut needs_sort = false;
        for resolved in batch {
            if let Some(kind) = self.store_resolved(resolved) {
                applied += 1;
                needs_sort |= self.sort_depends_on(kind);
            }
        }
        if needs_sort {
            self.resort();
        }
        applied
    }

    fn store_resolved(&mut self, resolved: Resolved) -> Option<MetaKind> {
        let path = resolved.path.clone();
        let kind = resolved.kind;
        if !self.cache.apply(resolved) {
            return None;
        }
        self.events.push(TableEvent::MetadataUpdated { path, kind });
        Some(kind)
    }

    fn sort_depends_on(&self, kind: MetaKind) -> bool {
        matches!(
            (self.sort.key, kind),
            (ColumnKind::Type, MetaKind::ContentType) | (ColumnKind::Size, MetaKind::DirCount)
        )
    }

    /// Sorts starting from arrival order, so ties never depend on earlier sorts.
    fn resort(&mut self) {
        let arrival = &self.arrival;
        self.entries.sort_by_key(|e| arrival.get(e.path()).copied().unwrap_or(usize::MAX));
        self.sorter.sort(&mut self.entries, self.sort, &self.cache);
        self.rebuild_index();
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        self.index.reserve(self.entries.len());
        for (i, e) in self.entries.iter().enumerate() {
            self.index.insert(e.path().to_path_buf(), i);
        }
    }

    // Selection. Paths outside the listing are ignored.

    pub fn select(&mut self, path: &Path) {
        if self.contains(path) && self.selection.select(path) {
            self.emit_selection();
        }
    }

    pub fn toggle(&mut self, path: &Path) {
        if self.contains(path) && self.selection.toggle(path) {
            self.emit_selection();
        }
    }

    pub fn select_range(&mut self, anchor: &Path, target: &Path) {
        if !self.contains(anchor) || !self.contains(target) {
            return;
        }
        let ordered: Vec<&Path> = self.entries.iter().map(|e| e.path()).collect();
        if self.selection.select_range(anchor, target, &ordered) {
            self.emit_selection();
        }
    }

    /// Extends from the current anchor to `target`, or plainly selects it without an anchor.
    pub fn extend_to(&mut self, target: &Path) {
        match self.selection.anchor().map(Path::to_path_buf) {
            Some(anchor) if self.contains(&anchor) => self.select_range(&anchor, target),
            _ => self.select(target),
        }
    }

    pub fn select_all(&mut self) {
        let ordered: Vec<&Path> = self.entries.iter().map(|e| e.path()).collect();
        if self.selection.select_all(&ordered) {
            self.emit_selection();
        }
    }

    pub fn clear_selection(&mut self) {
        if self.selection.clear() {
            self.emit_selection();
        }
    }

    /// Row click: plain selects, ctrl toggles, shift extends from the anchor.
    pub fn click_row(&mut self, row: usize, modifiers: ClickModifiers) {
        let Some(path) = self.entries.get(row).map(|e| e.path().to_path_buf()) else {
            return;
        };
        if modifiers.ctrl {
            self.toggle(&path);
        } else if modifiers.shift {
            self.extend_to(&path);
        } else {
            self.select(&path);
        }
    }

    /// Emits [TableEvent::Open] for the row.
    pub fn activate_row(&mut self, row: usize) {
        if let Some(entry) = self.entries.get(row) {
            self.events
                .push(TableEvent::Open(entry.path().to_path_buf()));
        }
    }

    fn emit_selection(&mut self) {
        let paths = self.selected_paths();
        self.events.push(TableEvent::SelectionChanged(paths));
    }

    // Rendering

    /// Rows that [VirtualTable::render] would produce for `viewport`.
    pub fn visible_rows(&self, viewport: &Viewport) -> Range<usize> {
        visible_row_range(
            viewport.height,
            viewport.row_height,
            self.entries.len(),
            viewport.scroll_offset,
            self.overscan,
        )
    }

    /// Measures and commits one frame for `viewport`.
    ///
    /// The first pass formats the header and every visible row, requesting missing metadata for
    /// those rows only, and feeds each measured width into the running column widths. The second
    /// pass lays the frame out with the widths as they stand afterwards.
    pub fn render(&mut self, viewport: &Viewport, measure: &impl Measure) -> TableFrame {
        debug_assert_eq!(self.phase, Phase::Idle);
        let rows = self.visible_rows(viewport);
        let pad = self.cell_padding;

        // Pass 1: measure
        let header_labels: Vec<String> = self
            .columns
            .iter()
            .map(|&col| self.formatter.header(col, self.sort))
            .collect();
        for (c, label) in header_labels.iter().enumerate() {
            self.widths
                .observe(c, measure.measure(label).saturating_add(pad));
        }

        let mut measured: Vec<Vec<String>> = Vec::with_capacity(rows.len());
        for entry in &self.entries[rows.clone()] {
            let mut cells = Vec::with_capacity(self.columns.len());
            for (c, &col) in self.columns.iter().enumerate() {
                let meta = CellFormatter::needs(entry, col)
                    .map(|kind| self.cache.resolve(entry.path(), kind, self.resolver.as_ref()));
                let text = self.formatter.cell(entry, col, meta.as_ref());
                self.widths
                    .observe(c, measure.measure(&text).saturating_add(pad));
                cells.push(text);
            }
            measured.push(cells);
        }

        // Pass 2: commit
        let widths = self.widths.snapshot(self.columns.len());
        let header = self
            .columns
            .iter()
            .zip(header_labels)
            .enumerate()
            .map(|(c, (&column, label))| HeaderCell {
                column,
                label,
                sorted: column == self.sort.key,
                width: widths[c],
            })
            .collect();

        let body = rows
            .clone()
            .zip(measured)
            .map(|(index, cells)| {
                let entry = &self.entries[index];
                FrameRow {
                    index,
                    path: entry.path().to_path_buf(),
                    is_dir: entry.is_dir(),
                    is_symlink: entry.is_symlink(),
                    is_broken_sym: entry.is_broken_sym(),
                    selected: self.selection.is_selected(entry.path()),
                    cells,
                }
            })
            .collect();

        TableFrame {
            generation: self.generation,
            rows,
            total_rows: self.entries.len(),
            widths,
            header,
            body,
        }
    }
}

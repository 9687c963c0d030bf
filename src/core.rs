//! Core runtime logic for tau.
//!
//! This module contains the non-UI "engine" pieces of the detail table:
//! - [entry], [source], [probe]: directory entries, where they come from, and the expensive
//!   per-entry metadata queries.
//! - [sort], [selection], [cache], [layout]: the independent models the table is built from.
//! - [table], [viewport], [formatter]: the virtualized table itself and its row math and cell text.
//! - [worker]: background threads and message passing back into the app state.
//! - [terminal]: terminal setup/teardown and the main crossterm/ratatui event loop.
//!
//! Most callers will import [VirtualTable] and [DirEntry] from this module.

pub mod cache;
pub mod entry;
pub mod error;
pub mod formatter;
pub mod layout;
pub mod probe;
pub mod selection;
pub mod sort;
pub mod source;
pub mod table;
pub mod terminal;
pub mod viewport;
pub mod worker;

pub use cache::{EntryCache, MetaKind, MetaValue, Metadata, ResolveRequest, Resolved, Resolver};
pub use entry::{DirEntry, browse_dir};
pub use error::ListingError;
pub use formatter::{
    CellFormatter, Measure, SizeUnits, TextWidth, format_item_count, sanitize_to_exact_width,
};
pub use layout::ColumnWidths;
pub use probe::{FsProbe, probe_content_type};
pub use selection::Selection;
pub use sort::{ColumnKind, MetaLookup, SortDirection, SortSpec, Sorter};
pub use source::{DirectorySource, FsSource, MetadataProbe};
pub use table::{
    ClickModifiers, FrameRow, HeaderCell, Phase, TableEvent, TableFrame, TableOptions,
    VirtualTable,
};
pub use viewport::{
    DEFAULT_OVERSCAN_ROWS, Viewport, max_scroll_offset, scroll_to_reveal, visible_row_range,
};

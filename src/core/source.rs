//! Capabilities the table consumes from the outside world.
//!
//! - [DirectorySource]: enumerates a directory into ordered [DirEntry] values.
//! - [MetadataProbe]: the two expensive per-entry queries (item count, content type).
//!
//! The filesystem implementations are [FsSource] and [crate::core::probe::FsProbe]. Both are
//! called from worker threads only, never from the render path.

use crate::core::entry::{DirEntry, browse_dir};
use crate::core::error::ListingError;

use std::io;
use std::path::Path;

/// Supplies the current entries of a directory.
pub trait DirectorySource: Send + Sync {
    fn read_listing(&self, dir: &Path) -> Result<Vec<DirEntry>, ListingError>;
}

/// Expensive per-entry metadata queries.
pub trait MetadataProbe: Send + Sync {
    /// Number of items inside `dir`.
    fn item_count(&self, dir: &Path) -> io::Result<u64>;

    /// Content type of `file`. `Ok(None)` means the probe was inconclusive.
    fn content_type(&self, file: &Path) -> io::Result<Option<String>>;
}

/// Reads listings straight from the filesystem.
#[derive(Debug, Clone, Copy)]
pub struct FsSource {
    show_hidden: bool,
}

impl FsSource {
    pub fn new(show_hidden: bool) -> Self {
        Self { show_hidden }
    }
}

impl DirectorySource for FsSource {
    fn read_listing(&self, dir: &Path) -> Result<Vec<DirEntry>, ListingError> {
        let mut entries = browse_dir(dir)?;
        if !self.show_hidden {
            entries.retain(|e| !e.is_hidden());
        }
        Ok(entries)
    }
}

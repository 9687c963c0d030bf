//! Directory entry snapshots for tau.
//!
//! Provides the [DirEntry] value type used by every part of the table, and [browse_dir] which
//! builds entries from the real filesystem.
//!
//! Entries are immutable. A changed directory produces a new listing, never a mutated entry.

use crate::core::error::ListingError;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A single row of a directory listing.
///
/// Identity is the absolute path. The display name and its lowercase form are computed once at
/// construction so sorting never allocates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    path: Box<Path>,
    name: Box<str>,
    lowercase_name: Box<str>,
    flags: u8,
    size: Option<u64>,
    content_type: Option<Arc<str>>,
}

impl DirEntry {
    // Flag bit definitions
    pub const IS_DIR: u8 = 1 << 0;
    pub const IS_HIDDEN: u8 = 1 << 1;
    pub const IS_SYMLINK: u8 = 1 << 2;
    pub const IS_BROKEN_SYM: u8 = 1 << 3;

    /// Builds an entry. `size` is ignored for directories.
    pub fn new(path: impl Into<PathBuf>, flags: u8, size: Option<u64>) -> Self {
        let path: PathBuf = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let lowercase_name = name.to_lowercase().into_boxed_str();
        let size = if flags & Self::IS_DIR != 0 {
            None
        } else {
            size
        };

        DirEntry {
            path: path.into_boxed_path(),
            name: name.into_boxed_str(),
            lowercase_name,
            flags,
            size,
            content_type: None,
        }
    }

    pub fn file(path: impl Into<PathBuf>, size: u64) -> Self {
        Self::new(path, 0, Some(size))
    }

    pub fn dir(path: impl Into<PathBuf>) -> Self {
        Self::new(path, Self::IS_DIR, None)
    }

    /// Attaches a content type known up front, so the cache never has to probe for it.
    pub fn with_content_type(mut self, content_type: impl Into<Arc<str>>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    // Accessors

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn lowercase_name(&self) -> &str {
        &self.lowercase_name
    }

    #[inline(always)]
    pub fn flags(&self) -> u8 {
        self.flags
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.flags & Self::IS_DIR != 0
    }

    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.flags & Self::IS_HIDDEN != 0
    }

    #[inline]
    pub fn is_symlink(&self) -> bool {
        self.flags & Self::IS_SYMLINK != 0
    }

    #[inline]
    pub fn is_broken_sym(&self) -> bool {
        self.flags & Self::IS_BROKEN_SYM != 0
    }

    /// Byte size. Always `None` for directories.
    #[inline]
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    #[inline]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}

/// Removes entries whose path already appeared earlier in the list.
///
/// Returns the number of dropped entries.
pub(crate) fn dedup_paths(entries: &mut Vec<DirEntry>) -> usize {
    let before = entries.len();
    let mut seen: HashSet<PathBuf> = HashSet::with_capacity(before);
    entries.retain(|e| seen.insert(e.path().to_path_buf()));
    before - entries.len()
}

/// Reads the contents of the provided directory and returns them as [DirEntry] values in
/// filesystem order.
///
/// Individual entries that vanish or cannot be stat'ed during the read are skipped; failure to
/// open the directory itself is a [ListingError].
pub fn browse_dir(path: &Path) -> Result<Vec<DirEntry>, ListingError> {
    let meta = fs::metadata(path).map_err(|e| ListingError::unavailable(path, e))?;
    if !meta.is_dir() {
        return Err(ListingError::NotADirectory(path.to_path_buf()));
    }

    let read = fs::read_dir(path).map_err(|e| ListingError::unavailable(path, e))?;
    let mut entries = Vec::with_capacity(256);

    for entry in read {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };

        let ft = match entry.file_type() {
            Ok(ft) => ft,
            Err(_) => continue,
        };

        let entry_path = entry.path();
        let mut flags = 0u8;
        let mut size = None;

        if ft.is_dir() {
            flags |= DirEntry::IS_DIR;
        }
        if ft.is_symlink() {
            flags |= DirEntry::IS_SYMLINK;
        }

        // Symlinks report on their target
        let md_res = if ft.is_symlink() {
            fs::metadata(&entry_path)
        } else {
            entry.metadata()
        };

        match md_res {
            Ok(md) => {
                if md.is_dir() {
                    flags |= DirEntry::IS_DIR;
                } else {
                    size = Some(md.len());
                }

                #[cfg(windows)]
                {
                    use std::os::windows::fs::MetadataExt;
                    if md.file_attributes() & 0x2 != 0 {
                        flags |= DirEntry::IS_HIDDEN;
                    }
                }
            }
            Err(_) if ft.is_symlink() => flags |= DirEntry::IS_BROKEN_SYM,
            Err(_) => {}
        }

        #[cfg(unix)]
        {
            use std::os::unix::ffi::OsStrExt;
            if entry.file_name().as_bytes().first() == Some(&b'.') {
                flags |= DirEntry::IS_HIDDEN;
            }
        }

        entries.push(DirEntry::new(entry_path, flags, size));
    }
    Ok(entries)
}

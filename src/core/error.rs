//! Error types for the tau core.
//!
//! Only listing failures surface as errors. Metadata resolution failures are
//! folded into [crate::core::Metadata::Unknown] by the cache and never reach the caller.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Raised when a directory cannot be enumerated.
///
/// Callers are expected to show an error state for this rather than treat the directory as empty.
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("listing unavailable for {}: {source}", .path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),
}

impl ListingError {
    pub fn unavailable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ListingError::Unavailable {
            path: path.into(),
            source,
        }
    }

    /// The directory the failed listing was requested for.
    pub fn path(&self) -> &std::path::Path {
        match self {
            ListingError::Unavailable { path, .. } => path,
            ListingError::NotADirectory(path) => path,
        }
    }
}

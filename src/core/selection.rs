//! Multi-item selection for the detail table.
//!
//! A [Selection] is a set of paths plus the anchor used for range selection. It knows nothing
//! about the listing itself: the table only forwards paths that exist in its current listing and
//! calls [Selection::reconcile] whenever a new listing is installed.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone)]
pub struct Selection {
    selected: HashSet<PathBuf>,
    anchor: Option<PathBuf>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    // Getters / Accessors

    #[inline]
    pub fn is_selected(&self, path: &Path) -> bool {
        self.selected.contains(path)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    #[inline]
    pub fn anchor(&self) -> Option<&Path> {
        self.anchor.as_deref()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.selected.iter().map(PathBuf::as_path)
    }

    // Mutations. Each returns whether the selected set changed.

    /// Replaces the selection with `path` alone (plain click).
    pub fn select(&mut self, path: &Path) -> bool {
        self.anchor = Some(path.to_path_buf());
        if self.selected.len() == 1 && self.selected.contains(path) {
            return false;
        }
        self.selected.clear();
        self.selected.insert(path.to_path_buf());
        true
    }

    /// Adds or removes `path` (ctrl/cmd click).
    pub fn toggle(&mut self, path: &Path) -> bool {
        self.anchor = Some(path.to_path_buf());
        if !self.selected.remove(path) {
            self.selected.insert(path.to_path_buf());
        }
        true
    }

    /// Selects the contiguous run between `anchor` and `target` in `ordered`, inclusive and in
    /// either direction, replacing the previous selection (shift click).
    ///
    /// Does nothing if either endpoint is missing from `ordered`.
    pub fn select_range<P: AsRef<Path>>(
        &mut self,
        anchor: &Path,
        target: &Path,
        ordered: &[P],
    ) -> bool {
        let ia = ordered.iter().position(|p| p.as_ref() == anchor);
        let it = ordered.iter().position(|p| p.as_ref() == target);
        let (Some(ia), Some(it)) = (ia, it) else {
            return false;
        };
        let (lo, hi) = if ia <= it { (ia, it) } else { (it, ia) };

        let range: HashSet<PathBuf> = ordered[lo..=hi]
            .iter()
            .map(|p| p.as_ref().to_path_buf())
            .collect();
        self.anchor = Some(anchor.to_path_buf());

        if range == self.selected {
            return false;
        }
        self.selected = range;
        true
    }

    /// Selects every path in `ordered`. The anchor is left untouched.
    pub fn select_all<P: AsRef<Path>>(&mut self, ordered: &[P]) -> bool {
        let before = self.selected.len();
        self.selected
            .extend(ordered.iter().map(|p| p.as_ref().to_path_buf()));
        self.selected.len() != before
    }

    pub fn clear(&mut self) -> bool {
        self.anchor = None;
        if self.selected.is_empty() {
            return false;
        }
        self.selected.clear();
        true
    }

    /// Drops every selected path that is not in `live`.
    ///
    /// Runs in time proportional to the selection, not the listing.
    pub fn reconcile(&mut self, live: &HashSet<PathBuf>) -> bool {
        if self
            .anchor
            .as_ref()
            .is_some_and(|anchor| !live.contains(anchor))
        {
            self.anchor = None;
        }
        let before = self.selected.len();
        self.selected.retain(|p| live.contains(p));
        self.selected.len() != before
    }
}

//! Sorting of directory entries for the detail table.
//!
//! The [Sorter] holds the user preferences (directories first, case sensitivity) and orders
//! entries for a [SortSpec]. Sorting is stable: entries that compare equal keep their previous
//! relative order, so a background result landing for one row never reshuffles unrelated rows.

use crate::core::entry::DirEntry;

use serde::Deserialize;

use std::cmp::Ordering;
use std::fmt;
use std::path::Path;

/// Content type reported for every directory.
pub const DIRECTORY_TYPE: &str = "inode/directory";

/// The closed set of columns a detail table can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Name,
    Type,
    Size,
}

impl ColumnKind {
    pub const ALL: [ColumnKind; 3] = [ColumnKind::Name, ColumnKind::Type, ColumnKind::Size];

    pub fn title(self) -> &'static str {
        match self {
            ColumnKind::Name => "Name",
            ColumnKind::Type => "Type",
            ColumnKind::Size => "Size",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

/// The single active ordering of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortSpec {
    pub key: ColumnKind,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(key: ColumnKind, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// The spec a header click on `key` produces: the active key flips direction, any other key
    /// becomes active ascending.
    pub fn toggled_by(self, key: ColumnKind) -> Self {
        if self.key == key {
            Self::new(key, self.direction.toggled())
        } else {
            Self::new(key, SortDirection::Ascending)
        }
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::new(ColumnKind::Name, SortDirection::Ascending)
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.key.title(), self.direction.arrow())
    }
}

/// Read-only view of lazily resolved metadata, used by the comparators.
pub trait MetaLookup {
    fn item_count(&self, path: &Path) -> Option<u64>;
    fn content_type(&self, path: &Path) -> Option<&str>;
}

/// Lookup with nothing resolved.
pub struct NoMetadata;

impl MetaLookup for NoMetadata {
    fn item_count(&self, _path: &Path) -> Option<u64> {
        None
    }

    fn content_type(&self, _path: &Path) -> Option<&str> {
        None
    }
}

/// Sorter struct to handle ordering of entries based on user preferences.
#[derive(Debug, Clone, Copy)]
pub struct Sorter {
    dirs_first: bool,
    case_insensitive: bool,
}

impl Sorter {
    pub fn new(dirs_first: bool, case_insensitive: bool) -> Self {
        Self {
            dirs_first,
            case_insensitive,
        }
    }

    /// Sorts the given entries in place for `spec`.
    pub fn sort(&self, entries: &mut [DirEntry], spec: SortSpec, meta: &impl MetaLookup) {
        entries.sort_by(|a, b| self.compare(a, b, spec, meta));
    }

    /// Returns a sorted copy of `entries`.
    pub fn sorted(
        &self,
        entries: &[DirEntry],
        spec: SortSpec,
        meta: &impl MetaLookup,
    ) -> Vec<DirEntry> {
        let mut out = entries.to_vec();
        self.sort(&mut out, spec, meta);
        out
    }

    fn compare(
        &self,
        a: &DirEntry,
        b: &DirEntry,
        spec: SortSpec,
        meta: &impl MetaLookup,
    ) -> Ordering {
        // Directory item counts and byte sizes are different domains, so Size always groups
        if (self.dirs_first || spec.key == ColumnKind::Size) && a.is_dir() != b.is_dir() {
            return b.is_dir().cmp(&a.is_dir());
        }

        let ord = match spec.key {
            ColumnKind::Name => self.cmp_name(a, b),
            ColumnKind::Type => {
                match resolved_last(type_of(a, meta), type_of(b, meta)) {
                    Ok(ord) => ord,
                    Err(placement) => return placement,
                }
            }
            ColumnKind::Size => match resolved_last(size_of(a, meta), size_of(b, meta)) {
                Ok(ord) => ord,
                Err(placement) => return placement,
            },
        };

        match spec.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }

    fn cmp_name(&self, a: &DirEntry, b: &DirEntry) -> Ordering {
        if self.case_insensitive {
            a.lowercase_name().cmp(b.lowercase_name())
        } else {
            a.name().cmp(b.name())
        }
    }
}

impl Default for Sorter {
    fn default() -> Self {
        Self::new(true, true)
    }
}

fn type_of<'a>(entry: &'a DirEntry, meta: &'a impl MetaLookup) -> Option<&'a str> {
    if entry.is_dir() {
        return Some(DIRECTORY_TYPE);
    }
    entry
        .content_type()
        .or_else(|| meta.content_type(entry.path()))
}

fn size_of(entry: &DirEntry, meta: &impl MetaLookup) -> Option<u64> {
    if entry.is_dir() {
        meta.item_count(entry.path())
    } else {
        entry.size()
    }
}

/// Compares two optional keys with unresolved values always placed last.
///
/// `Ok` carries a key ordering that the direction may reverse, `Err` a fixed placement that it
/// must not.
fn resolved_last<T: Ord>(a: Option<T>, b: Option<T>) -> Result<Ordering, Ordering> {
    match (a, b) {
        (Some(a), Some(b)) => Ok(a.cmp(&b)),
        (Some(_), None) => Err(Ordering::Less),
        (None, Some(_)) => Err(Ordering::Greater),
        (None, None) => Ok(Ordering::Equal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rng;
    use rand::seq::SliceRandom;
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[derive(Default)]
    struct FakeMeta {
        counts: HashMap<PathBuf, u64>,
        types: HashMap<PathBuf, String>,
    }

    impl MetaLookup for FakeMeta {
        fn item_count(&self, path: &Path) -> Option<u64> {
            self.counts.get(path).copied()
        }

        fn content_type(&self, path: &Path) -> Option<&str> {
            self.types.get(path).map(String::as_str)
        }
    }

    fn names(entries: &[DirEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name()).collect()
    }

    fn asc(key: ColumnKind) -> SortSpec {
        SortSpec::new(key, SortDirection::Ascending)
    }

    fn desc(key: ColumnKind) -> SortSpec {
        SortSpec::new(key, SortDirection::Descending)
    }

    #[test]
    fn size_scenario_groups_dirs_and_keeps_their_order() {
        let listing = vec![
            DirEntry::dir("/r/dirA"),
            DirEntry::dir("/r/dirB"),
            DirEntry::file("/r/file1.txt", 10),
            DirEntry::file("/r/file2.md", 5000),
        ];
        let sorter = Sorter::default();

        let up = sorter.sorted(&listing, asc(ColumnKind::Size), &NoMetadata);
        assert_eq!(names(&up), ["dirA", "dirB", "file1.txt", "file2.md"]);

        let down = sorter.sorted(&listing, desc(ColumnKind::Size), &NoMetadata);
        assert_eq!(names(&down), ["dirA", "dirB", "file2.md", "file1.txt"]);

        // Even without dirs_first, item counts never mix with byte sizes
        let mixed = Sorter::new(false, true).sorted(&listing, desc(ColumnKind::Size), &NoMetadata);
        assert_eq!(&names(&mixed)[..2], ["dirA", "dirB"]);
    }

    #[test]
    fn size_orders_dirs_by_resolved_item_count() {
        let listing = vec![
            DirEntry::dir("/r/big"),
            DirEntry::dir("/r/unknown"),
            DirEntry::dir("/r/small"),
        ];
        let mut meta = FakeMeta::default();
        meta.counts.insert(PathBuf::from("/r/big"), 40);
        meta.counts.insert(PathBuf::from("/r/small"), 2);

        let sorter = Sorter::default();
        let up = sorter.sorted(&listing, asc(ColumnKind::Size), &meta);
        assert_eq!(names(&up), ["small", "big", "unknown"]);

        let down = sorter.sorted(&listing, desc(ColumnKind::Size), &meta);
        assert_eq!(names(&down), ["big", "small", "unknown"]);
    }

    #[test]
    fn name_is_case_insensitive_and_dirs_first() {
        let listing = vec![
            DirEntry::file("/r/beta.txt", 1),
            DirEntry::dir("/r/zeta"),
            DirEntry::file("/r/Alpha.txt", 1),
            DirEntry::dir("/r/Gamma"),
        ];
        let sorter = Sorter::default();

        let up = sorter.sorted(&listing, asc(ColumnKind::Name), &NoMetadata);
        assert_eq!(names(&up), ["Gamma", "zeta", "Alpha.txt", "beta.txt"]);

        let down = sorter.sorted(&listing, desc(ColumnKind::Name), &NoMetadata);
        assert_eq!(names(&down), ["zeta", "Gamma", "beta.txt", "Alpha.txt"]);

        let plain = Sorter::new(false, false).sorted(&listing, asc(ColumnKind::Name), &NoMetadata);
        assert_eq!(names(&plain), ["Alpha.txt", "Gamma", "beta.txt", "zeta"]);
    }

    #[test]
    fn type_puts_unresolved_last_in_both_directions() {
        let listing = vec![
            DirEntry::file("/r/unprobed", 1),
            DirEntry::file("/r/b.png", 1),
            DirEntry::file("/r/a.md", 1).with_content_type("text/markdown"),
            DirEntry::dir("/r/dir"),
        ];
        let mut meta = FakeMeta::default();
        meta.types
            .insert(PathBuf::from("/r/b.png"), "image/png".to_string());

        let sorter = Sorter::default();
        let up = sorter.sorted(&listing, asc(ColumnKind::Type), &meta);
        assert_eq!(names(&up), ["dir", "b.png", "a.md", "unprobed"]);

        let down = sorter.sorted(&listing, desc(ColumnKind::Type), &meta);
        assert_eq!(names(&down), ["dir", "a.md", "b.png", "unprobed"]);
    }

    #[test]
    fn equal_keys_keep_input_order() {
        let listing = vec![
            DirEntry::file("/r/one", 7),
            DirEntry::file("/r/two", 7),
            DirEntry::file("/r/three", 7),
            DirEntry::file("/r/ONE", 7),
        ];
        let sorter = Sorter::default();

        let by_size = sorter.sorted(&listing, desc(ColumnKind::Size), &NoMetadata);
        assert_eq!(names(&by_size), ["one", "two", "three", "ONE"]);

        let by_name = sorter.sorted(&listing, asc(ColumnKind::Name), &NoMetadata);
        assert_eq!(names(&by_name), ["one", "ONE", "three", "two"]);
    }

    #[test]
    fn sorting_is_deterministic_and_dirs_first() {
        let mut listing = Vec::new();
        for i in 0..40 {
            listing.push(DirEntry::dir(format!("/r/dir_{}", i % 7)));
            listing.push(DirEntry::file(format!("/r/file_{i}.txt"), (i * 37 % 11) as u64));
        }
        let mut seen = std::collections::HashSet::new();
        listing.retain(|e| seen.insert(e.path().to_path_buf()));
        listing.shuffle(&mut rng());

        let sorter = Sorter::default();
        for key in ColumnKind::ALL {
            for spec in [asc(key), desc(key)] {
                let first = sorter.sorted(&listing, spec, &NoMetadata);
                let second = sorter.sorted(&listing, spec, &NoMetadata);
                assert_eq!(first, second, "non-deterministic order for {spec}");

                let first_file = first.iter().position(|e| !e.is_dir()).unwrap_or(first.len());
                assert!(
                    first[first_file..].iter().all(|e| !e.is_dir()),
                    "directory after a file for {spec}"
                );
            }
        }
    }

    #[test]
    fn toggled_by_flips_or_switches() {
        let spec = SortSpec::default();
        let flipped = spec.toggled_by(ColumnKind::Name);
        assert_eq!(flipped, desc(ColumnKind::Name));
        assert_eq!(flipped.toggled_by(ColumnKind::Size), asc(ColumnKind::Size));
    }
}

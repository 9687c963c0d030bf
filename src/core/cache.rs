//! Lazily resolved per-entry metadata.
//!
//! The [EntryCache] memoizes the two expensive per-row facts: the item count of a directory and
//! the content type of a file. A miss marks the slot pending and hands a [ResolveRequest] to a
//! [Resolver] (normally the worker pool). Results come back as [Resolved] values stamped with
//! the listing generation they were requested for; anything stamped with an older generation
//! is dropped on arrival.
//!
//! Failed resolutions are remembered as [Metadata::Unknown] and not retried until the next
//! generation.

use crate::core::sort::MetaLookup;

use crossbeam_channel::Sender;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaKind {
    DirCount,
    ContentType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    ItemCount(u64),
    ContentType(Arc<str>),
}

/// Answer to a metadata query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Metadata {
    Cached(MetaValue),
    Pending,
    Unknown,
}

/// Work order for a background resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveRequest {
    pub path: PathBuf,
    pub kind: MetaKind,
    pub generation: u64,
}

/// Outcome of a background resolution. `outcome: None` means the resolution failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub path: PathBuf,
    pub kind: MetaKind,
    pub generation: u64,
    pub outcome: Option<MetaValue>,
}

/// Something that can run a [ResolveRequest] off the render path.
pub trait Resolver {
    fn schedule(&self, request: ResolveRequest);
}

impl Resolver for Sender<ResolveRequest> {
    fn schedule(&self, request: ResolveRequest) {
        if self.send(request).is_err() {
            log::warn!("metadata resolver channel closed, request dropped");
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Pending,
    Ready(MetaValue),
    Unknown,
}

#[derive(Debug, Default)]
struct EntrySlots {
    dir_count: Option<Slot>,
    content_type: Option<Slot>,
}

impl EntrySlots {
    fn get(&self, kind: MetaKind) -> Option<&Slot> {
        match kind {
            MetaKind::DirCount => self.dir_count.as_ref(),
            MetaKind::ContentType => self.content_type.as_ref(),
        }
    }

    fn get_mut(&mut self, kind: MetaKind) -> &mut Option<Slot> {
        match kind {
            MetaKind::DirCount => &mut self.dir_count,
            MetaKind::ContentType => &mut self.content_type,
        }
    }

    /// Keeps resolved values only. Returns `false` once nothing is left.
    fn retain_ready(&mut self) -> bool {
        for slot in [&mut self.dir_count, &mut self.content_type] {
            if !matches!(slot, Some(Slot::Ready(_))) {
                *slot = None;
            }
        }
        self.dir_count.is_some() || self.content_type.is_some()
    }
}

#[derive(Debug, Default)]
pub struct EntryCache {
    generation: u64,
    slots: HashMap<PathBuf, EntrySlots>,
}

impl EntryCache {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the cached state for `(path, kind)`, scheduling a resolution on first request.
    pub fn resolve(&mut self, path: &Path, kind: MetaKind, resolver: &dyn Resolver) -> Metadata {
        if let Some(state) = self.state(path, kind) {
            return state;
        }

        *self
            .slots
            .entry(path.to_path_buf())
            .or_default()
            .get_mut(kind) = Some(Slot::Pending);
        resolver.schedule(ResolveRequest {
            path: path.to_path_buf(),
            kind,
            generation: self.generation,
        });
        Metadata::Pending
    }

    /// Current state of `(path, kind)` without scheduling anything. `None` if never requested.
    pub fn state(&self, path: &Path, kind: MetaKind) -> Option<Metadata> {
        Some(match self.slots.get(path)?.get(kind)? {
            Slot::Pending => Metadata::Pending,
            Slot::Ready(value) => Metadata::Cached(value.clone()),
            Slot::Unknown => Metadata::Unknown,
        })
    }

    /// Resolved value for `(path, kind)` without scheduling anything.
    pub fn peek(&self, path: &Path, kind: MetaKind) -> Option<&MetaValue> {
        match self.slots.get(path)?.get(kind)? {
            Slot::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// Stores a background result. Returns `false` if it was discarded as stale.
    pub fn apply(&mut self, resolved: Resolved) -> bool {
        if resolved.generation != self.generation {
            log::debug!(
                "discarding {:?} for {} from generation {} (current {})",
                resolved.kind,
                resolved.path.display(),
                resolved.generation,
                self.generation
            );
            return false;
        }

        let Some(slots) = self.slots.get_mut(&resolved.path) else {
            return false;
        };
        *slots.get_mut(resolved.kind) = Some(match resolved.outcome {
            Some(value) => Slot::Ready(value),
            None => Slot::Unknown,
        });
        true
    }

    /// Moves the cache to a new listing generation.
    ///
    /// Slots for paths not in `live` are dropped. Persisted paths keep resolved values only, so
    /// pending and failed lookups are requested again under the new generation.
    pub fn invalidate(&mut self, generation: u64, live: &HashSet<PathBuf>) {
        self.generation = generation;
        self.slots
            .retain(|path, slots| live.contains(path) && slots.retain_ready());
    }

    /// Number of resolutions still in flight.
    pub fn pending(&self) -> usize {
        self.slots
            .values()
            .flat_map(|s| [s.dir_count.as_ref(), s.content_type.as_ref()])
            .filter(|slot| matches!(slot, Some(Slot::Pending)))
            .count()
    }
}

impl MetaLookup for EntryCache {
    fn item_count(&self, path: &Path) -> Option<u64> {
        match self.peek(path, MetaKind::DirCount)? {
            MetaValue::ItemCount(n) => Some(*n),
            MetaValue::ContentType(_) => None,
        }
    }

    fn content_type(&self, path: &Path) -> Option<&str> {
        match self.peek(path, MetaKind::ContentType)? {
            MetaValue::ContentType(t) => Some(t.as_ref()),
            MetaValue::ItemCount(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    fn live(paths: &[&str]) -> HashSet<PathBuf> {
        paths.iter().map(PathBuf::from).collect()
    }

    fn resolved(path: &str, kind: MetaKind, generation: u64, outcome: Option<MetaValue>) -> Resolved {
        Resolved {
            path: PathBuf::from(path),
            kind,
            generation,
            outcome,
        }
    }

    #[test]
    fn second_resolve_hits_cache_without_rescheduling() {
        let (tx, rx) = unbounded::<ResolveRequest>();
        let mut cache = EntryCache::new();
        let dir = Path::new("/r/dir");

        assert_eq!(cache.resolve(dir, MetaKind::DirCount, &tx), Metadata::Pending);
        assert_eq!(cache.resolve(dir, MetaKind::DirCount, &tx), Metadata::Pending);
        let requests: Vec<_> = rx.try_iter().collect();
        assert_eq!(requests.len(), 1, "pending slot must not be scheduled twice");
        assert_eq!(requests[0].generation, 0);

        assert!(cache.apply(resolved(
            "/r/dir",
            MetaKind::DirCount,
            0,
            Some(MetaValue::ItemCount(3))
        )));
        let first = cache.resolve(dir, MetaKind::DirCount, &tx);
        let second = cache.resolve(dir, MetaKind::DirCount, &tx);
        assert_eq!(first, Metadata::Cached(MetaValue::ItemCount(3)));
        assert_eq!(first, second);
        assert_eq!(rx.try_iter().count(), 0);
        assert_eq!(cache.item_count(dir), Some(3));
    }

    #[test]
    fn failures_are_unknown_until_generation_changes() {
        let (tx, rx) = unbounded::<ResolveRequest>();
        let mut cache = EntryCache::new();
        let file = Path::new("/r/locked.bin");

        cache.resolve(file, MetaKind::ContentType, &tx);
        cache.apply(resolved("/r/locked.bin", MetaKind::ContentType, 0, None));
        assert_eq!(cache.resolve(file, MetaKind::ContentType, &tx), Metadata::Unknown);
        assert_eq!(cache.resolve(file, MetaKind::ContentType, &tx), Metadata::Unknown);
        assert_eq!(rx.try_iter().count(), 1);

        cache.invalidate(1, &live(&["/r/locked.bin"]));
        assert_eq!(cache.resolve(file, MetaKind::ContentType, &tx), Metadata::Pending);
        let retried: Vec<_> = rx.try_iter().collect();
        assert_eq!(retried.len(), 1);
        assert_eq!(retried[0].generation, 1);
    }

    #[test]
    fn stale_and_removed_results_are_discarded() {
        let (tx, _rx) = unbounded::<ResolveRequest>();
        let mut cache = EntryCache::new();

        cache.resolve(Path::new("/r/kept"), MetaKind::DirCount, &tx);
        cache.resolve(Path::new("/r/gone"), MetaKind::DirCount, &tx);
        cache.invalidate(1, &live(&["/r/kept"]));

        // In flight from generation 0
        assert!(!cache.apply(resolved(
            "/r/kept",
            MetaKind::DirCount,
            0,
            Some(MetaValue::ItemCount(9))
        )));
        // Path no longer has a slot
        assert!(!cache.apply(resolved(
            "/r/gone",
            MetaKind::DirCount,
            1,
            Some(MetaValue::ItemCount(9))
        )));
        assert_eq!(cache.peek(Path::new("/r/kept"), MetaKind::DirCount), None);
        assert_eq!(cache.pending(), 0);
    }

    #[test]
    fn invalidate_retains_resolved_values_of_persisted_paths() {
        let (tx, rx) = unbounded::<ResolveRequest>();
        let mut cache = EntryCache::new();

        for p in ["/r/a", "/r/b"] {
            cache.resolve(Path::new(p), MetaKind::ContentType, &tx);
            cache.apply(resolved(
                p,
                MetaKind::ContentType,
                0,
                Some(MetaValue::ContentType("text/plain".into())),
            ));
        }
        let _ = rx.try_iter().count();

        cache.invalidate(1, &live(&["/r/a"]));
        assert_eq!(cache.content_type(Path::new("/r/a")), Some("text/plain"));
        assert_eq!(cache.content_type(Path::new("/r/b")), None);
        assert_eq!(
            cache.resolve(Path::new("/r/a"), MetaKind::ContentType, &tx),
            Metadata::Cached(MetaValue::ContentType("text/plain".into()))
        );
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn kinds_are_independent() {
        let (tx, rx) = unbounded::<ResolveRequest>();
        let mut cache = EntryCache::new();
        let p = Path::new("/r/x");

        cache.resolve(p, MetaKind::DirCount, &tx);
        cache.resolve(p, MetaKind::ContentType, &tx);
        assert_eq!(rx.try_iter().count(), 2);
        assert_eq!(cache.pending(), 2);

        cache.apply(resolved("/r/x", MetaKind::DirCount, 0, Some(MetaValue::ItemCount(1))));
        assert_eq!(cache.pending(), 1);
        assert_eq!(cache.resolve(p, MetaKind::ContentType, &tx), Metadata::Pending);
    }
}

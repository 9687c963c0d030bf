//! Table tests for tau
//!
//! These tests drive [VirtualTable] through its public API: sorting under shuffled input,
//! selection across listing refreshes, column width growth and metadata resolution through
//! the real worker threads.

use tau_table::core::worker::{WorkerResponse, Workers};
use tau_table::core::{
    ColumnKind, ColumnWidths, DirEntry, DirectorySource, FsSource, MetaKind, MetaValue, Metadata,
    MetadataProbe, ResolveRequest, SortDirection, SortSpec, TableEvent, TableOptions, TextWidth,
    VirtualTable, Viewport,
};

use crossbeam_channel::unbounded;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use std::{fs, io};
use tempfile::tempdir;

fn detached_table() -> VirtualTable {
    let (tx, _rx) = unbounded::<ResolveRequest>();
    VirtualTable::new(TableOptions::default(), Box::new(tx))
}

fn scenario_listing() -> Vec<DirEntry> {
    vec![
        DirEntry::dir("/r/dirA"),
        DirEntry::dir("/r/dirB"),
        DirEntry::file("/r/file1.txt", 10),
        DirEntry::file("/r/file2.md", 5000),
    ]
}

fn names(table: &VirtualTable) -> Vec<String> {
    table
        .current_order()
        .iter()
        .map(|e| e.name().to_string())
        .collect()
}

#[test]
fn test_size_sort_keeps_directories_first_in_both_directions() {
    let mut table = detached_table();
    table.set_listing(scenario_listing());

    table.set_sort(SortSpec::new(ColumnKind::Size, SortDirection::Ascending));
    assert_eq!(names(&table), ["dirA", "dirB", "file1.txt", "file2.md"]);

    table.set_sort(SortSpec::new(ColumnKind::Size, SortDirection::Descending));
    assert_eq!(names(&table), ["dirA", "dirB", "file2.md", "file1.txt"]);
}

#[test]
fn test_selection_cleared_when_entry_vanishes() {
    let mut table = detached_table();
    table.set_listing(scenario_listing());
    table.select(Path::new("/r/file1.txt"));
    assert!(table.is_selected(Path::new("/r/file1.txt")));

    let mut next = scenario_listing();
    next.retain(|e| e.name() != "file1.txt");
    table.set_listing(next);

    assert!(table.selected_paths().is_empty());
    assert!(
        table
            .drain_events()
            .contains(&TableEvent::SelectionChanged(Vec::new()))
    );
}

#[test]
fn test_widths_grow_then_reset() {
    let mut widths = ColumnWidths::new();
    widths.observe(0, 50);
    widths.observe(0, 30);
    assert_eq!(widths.width_of(0), 50);

    widths.reset();
    widths.observe(0, 10);
    assert_eq!(widths.width_of(0), 10);
}

#[test]
fn test_sort_is_deterministic_under_shuffled_input() {
    let mut rng = rand::rng();
    let base: Vec<DirEntry> = (0..60)
        .map(|i| match i % 3 {
            0 => DirEntry::dir(format!("/r/Dir{i:02}")),
            1 => DirEntry::file(format!("/r/file{i:02}.txt"), (i % 7) as u64 * 100),
            _ => DirEntry::file(format!("/r/same{i:02}.bin"), 42),
        })
        .collect();

    for key in ColumnKind::ALL {
        for direction in [SortDirection::Ascending, SortDirection::Descending] {
            let spec = SortSpec::new(key, direction);
            let mut expected: Option<Vec<String>> = None;

            for _ in 0..5 {
                let mut input = base.clone();
                input.shuffle(&mut rng);
                let mut table = detached_table();
                table.set_listing(input);
                table.set_sort(spec);

                let order = names(&table);
                let dirs = order.iter().take_while(|n| n.starts_with("Dir")).count();
                assert_eq!(dirs, 20, "directories lead the {spec} order");

                match &expected {
                    Some(previous) if key == ColumnKind::Name => assert_eq!(previous, &order),
                    _ => expected = Some(order),
                }
            }
        }
    }
}

#[test]
fn test_selection_stays_subset_of_listing() {
    let mut rng = rand::rng();
    let all: Vec<DirEntry> = (0..40)
        .map(|i| DirEntry::file(format!("/r/f{i:02}"), i))
        .collect();

    let mut table = detached_table();
    table.set_listing(all.clone());

    for _ in 0..20 {
        for entry in table.current_order().to_vec() {
            if rng.random_bool(0.3) {
                table.toggle(entry.path());
            }
        }

        let mut next: Vec<DirEntry> = all
            .iter()
            .filter(|_| rng.random_bool(0.7))
            .cloned()
            .collect();
        next.shuffle(&mut rng);
        let live: HashSet<PathBuf> = next.iter().map(|e| e.path().to_path_buf()).collect();
        table.set_listing(next);

        let selected = table.selected_paths();
        assert_eq!(selected.len(), table.selection_len());
        assert!(selected.iter().all(|p| live.contains(p)));

        let rows: Vec<usize> = selected.iter().filter_map(|p| table.row_of(p)).collect();
        assert!(rows.windows(2).all(|w| w[0] < w[1]), "display order");
    }
}

/// Counts how often each query actually runs.
#[derive(Default)]
struct CountingProbe {
    counts: AtomicUsize,
    types: AtomicUsize,
}

impl MetadataProbe for CountingProbe {
    fn item_count(&self, dir: &Path) -> io::Result<u64> {
        self.counts.fetch_add(1, Ordering::SeqCst);
        Ok(fs::read_dir(dir)?.count() as u64)
    }

    fn content_type(&self, _file: &Path) -> io::Result<Option<String>> {
        self.types.fetch_add(1, Ordering::SeqCst);
        Ok(None)
    }
}

#[test]
fn test_metadata_resolves_once_per_generation() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    for (name, children) in [("alpha", 1), ("beta", 3), ("gamma", 0)] {
        let sub = dir.path().join(name);
        fs::create_dir(&sub)?;
        for i in 0..children {
            fs::write(sub.join(format!("c{i}")), "x")?;
        }
    }

    let source = Arc::new(FsSource::new(true));
    let probe = Arc::new(CountingProbe::default());
    let workers = Workers::spawn(source.clone(), probe.clone(), 2);
    let mut table = VirtualTable::new(TableOptions::default(), Box::new(workers.resolver()));

    table.set_listing(source.read_listing(dir.path())?);
    table.set_sort(SortSpec::new(ColumnKind::Size, SortDirection::Descending));
    let viewport = Viewport::new(20, 1, 0);

    table.render(&viewport, &TextWidth);
    table.render(&viewport, &TextWidth);
    assert_eq!(table.pending_metadata(), 3);

    let deadline = Instant::now() + Duration::from_secs(5);
    let mut applied = 0;
    while applied < 3 && Instant::now() < deadline {
        if let Ok(WorkerResponse::MetadataResolved(resolved)) = workers
            .response_rx()
            .recv_timeout(Duration::from_millis(50))
            && table.apply_resolved(resolved)
        {
            applied += 1;
        }
    }
    assert_eq!(applied, 3);

    table.render(&viewport, &TextWidth);
    assert_eq!(table.pending_metadata(), 0);
    assert_eq!(probe.counts.load(Ordering::SeqCst), 3);
    assert_eq!(probe.types.load(Ordering::SeqCst), 0);

    assert_eq!(
        table.metadata(&dir.path().join("beta"), MetaKind::DirCount),
        Some(Metadata::Cached(MetaValue::ItemCount(3)))
    );
    // directories stay first, ordered by item count once resolved
    assert_eq!(names(&table), ["beta", "alpha", "gamma"]);

    // a refresh keeps resolved counts and only asks for new entries
    fs::create_dir(dir.path().join("delta"))?;
    table.set_listing(source.read_listing(dir.path())?);
    table.render(&viewport, &TextWidth);
    assert_eq!(table.pending_metadata(), 1);
    assert_eq!(
        table.metadata(&dir.path().join("delta"), MetaKind::DirCount),
        Some(Metadata::Pending)
    );
    assert_eq!(&names(&table)[..3], ["beta", "alpha", "gamma"]);
    Ok(())
}

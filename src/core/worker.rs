//! Worker threads for tau.
//!
//! Directory listings and metadata probes run off the UI thread. Requests come in over
//! crossbeam channels and results go back the same way as [WorkerResponse] values:
//!
//! - One I/O thread reads listings ([WorkerTask::LoadDirectory]). Queued loads are coalesced so
//!   only the most recent one is read.
//! - A pool of metadata threads shares one [ResolveRequest] queue. The table's cache feeds it
//!   through the [Resolver] seam, see [Workers::resolver].
//!
//! # Caution:
//! This module is the protocol boundary between the table and the filesystem. Adding or editing
//! variants here needs matching changes in the app's response handling.

use crate::core::cache::{MetaKind, MetaValue, ResolveRequest, Resolved};
use crate::core::entry::DirEntry;
use crate::core::error::ListingError;
use crate::core::source::{DirectorySource, MetadataProbe};

use crossbeam_channel::{Receiver, Sender, unbounded};

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

/// Upper bound for the metadata pool.
pub const MAX_METADATA_THREADS: usize = 16;

/// Owns the task senders and the shared response receiver.
pub struct Workers {
    io_tx: Sender<WorkerTask>,
    meta_tx: Sender<ResolveRequest>,
    response_rx: Receiver<WorkerResponse>,
}

impl Workers {
    /// Spawns the I/O thread and `metadata_threads` metadata threads (clamped to
    /// `1..=MAX_METADATA_THREADS`).
    pub fn spawn(
        source: Arc<dyn DirectorySource>,
        probe: Arc<dyn MetadataProbe>,
        metadata_threads: usize,
    ) -> Self {
        let (io_tx, io_rx) = unbounded::<WorkerTask>();
        let (meta_tx, meta_rx) = unbounded::<ResolveRequest>();
        let (res_tx, response_rx) = unbounded::<WorkerResponse>();

        start_io_worker(io_rx, res_tx.clone(), source);
        for _ in 0..metadata_threads.clamp(1, MAX_METADATA_THREADS) {
            start_metadata_worker(meta_rx.clone(), res_tx.clone(), Arc::clone(&probe));
        }

        Self {
            io_tx,
            meta_tx,
            response_rx,
        }
    }

    /// Accessor for the I/O worker task sender.
    pub fn io_tx(&self) -> &Sender<WorkerTask> {
        &self.io_tx
    }

    /// A [Resolver](crate::core::Resolver) feeding the metadata pool.
    pub fn resolver(&self) -> Sender<ResolveRequest> {
        self.meta_tx.clone()
    }

    /// Accessor for the worker response receiver.
    pub fn response_rx(&self) -> &Receiver<WorkerResponse> {
        &self.response_rx
    }
}

/// Tasks sent to the I/O thread.
#[derive(Debug)]
pub enum WorkerTask {
    LoadDirectory {
        path: PathBuf,
        /// Entry to put the cursor on once loaded.
        focus: Option<PathBuf>,
        request_id: u64,
    },
}

/// Responses sent from the worker threads back to the main thread.
#[derive(Debug)]
pub enum WorkerResponse {
    DirectoryLoaded {
        path: PathBuf,
        entries: Vec<DirEntry>,
        focus: Option<PathBuf>,
        request_id: u64,
    },
    ListingFailed {
        error: ListingError,
        request_id: u64,
    },
    MetadataResolved(Resolved),
}

/// Starts the io worker thread, which listens to [WorkerTask] and sends back [WorkerResponse].
fn start_io_worker(
    task_rx: Receiver<WorkerTask>,
    res_tx: Sender<WorkerResponse>,
    source: Arc<dyn DirectorySource>,
) {
    thread::spawn(move || {
        while let Ok(task) = task_rx.recv() {
            let WorkerTask::LoadDirectory {
                mut path,
                mut focus,
                mut request_id,
            } = task;

            // Coalesce queued loads to only read the latest
            while let Ok(WorkerTask::LoadDirectory {
                path: p,
                focus: f,
                request_id: id,
            }) = task_rx.try_recv()
            {
                log::debug!("skipping load of {} (request {request_id})", path.display());
                path = p;
                focus = f;
                request_id = id;
            }

            let response = match source.read_listing(&path) {
                Ok(entries) => WorkerResponse::DirectoryLoaded {
                    path,
                    entries,
                    focus,
                    request_id,
                },
                Err(error) => WorkerResponse::ListingFailed { error, request_id },
            };
            if res_tx.send(response).is_err() {
                break;
            }
        }
    });
}

/// Starts one metadata worker. Workers share `task_rx`, so each request is handled once.
fn start_metadata_worker(
    task_rx: Receiver<ResolveRequest>,
    res_tx: Sender<WorkerResponse>,
    probe: Arc<dyn MetadataProbe>,
) {
    thread::spawn(move || {
        while let Ok(request) = task_rx.recv() {
            let resolved = resolve(probe.as_ref(), request);
            if res_tx
                .send(WorkerResponse::MetadataResolved(resolved))
                .is_err()
            {
                break;
            }
        }
    });
}

/// Runs one probe. Errors and inconclusive probes become `outcome: None`.
pub fn resolve(probe: &dyn MetadataProbe, request: ResolveRequest) -> Resolved {
    let outcome = match request.kind {
        MetaKind::DirCount => match probe.item_count(&request.path) {
            Ok(n) => Some(MetaValue::ItemCount(n)),
            Err(e) => {
                log::debug!("item count failed for {}: {e}", request.path.display());
                None
            }
        },
        MetaKind::ContentType => match probe.content_type(&request.path) {
            Ok(Some(t)) => Some(MetaValue::ContentType(t.into())),
            Ok(None) => None,
            Err(e) => {
                log::debug!("content type failed for {}: {e}", request.path.display());
                None
            }
        },
    };

    Resolved {
        path: request.path,
        kind: request.kind,
        generation: request.generation,
        outcome,
    }
}

/// Worker threads integration tests.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::Resolver;
    use crate::core::probe::FsProbe;
    use crate::core::source::FsSource;

    use rand::{Rng, rng};
    use std::fs::{self, File};
    use std::thread;
    use std::time::Duration;
    use tempfile::tempdir;

    fn fs_workers(threads: usize) -> Workers {
        Workers::spawn(
            Arc::new(FsSource::new(true)),
            Arc::new(FsProbe::new(false)),
            threads,
        )
    }

    #[test]
    fn test_worker_load_dir() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        File::create(dir.path().join("crab.rs"))?;
        fs::create_dir(dir.path().join("shell"))?;

        let workers = fs_workers(1);
        workers.io_tx().send(WorkerTask::LoadDirectory {
            path: dir.path().to_path_buf(),
            focus: None,
            request_id: 1,
        })?;

        match workers.response_rx().recv_timeout(Duration::from_secs(2))? {
            WorkerResponse::DirectoryLoaded {
                entries,
                request_id,
                ..
            } => {
                assert_eq!(request_id, 1);
                assert_eq!(entries.len(), 2);
                for entry in entries {
                    assert!(!entry.name().is_empty());
                }
            }
            other => return Err(format!("Unexpected response: {:?}", other).into()),
        }
        Ok(())
    }

    #[test]
    fn test_worker_listing_failure() -> Result<(), Box<dyn std::error::Error>> {
        let workers = fs_workers(1);
        let missing = PathBuf::from("/path/does/not/exist");
        workers.io_tx().send(WorkerTask::LoadDirectory {
            path: missing.clone(),
            focus: None,
            request_id: 7,
        })?;

        match workers.response_rx().recv_timeout(Duration::from_secs(2))? {
            WorkerResponse::ListingFailed { error, request_id } => {
                assert_eq!(request_id, 7);
                assert_eq!(error.path(), missing.as_path());
            }
            other => return Err(format!("Unexpected response: {:?}", other).into()),
        }
        Ok(())
    }

    #[test]
    fn worker_dir_load_requests_multithreaded() -> Result<(), Box<dyn std::error::Error>> {
        let temp_dir = tempdir()?;
        let safe_subdir = temp_dir.path().join("tau_test_safe_dir");
        fs::create_dir_all(&safe_subdir)?;
        let dirs = vec![temp_dir.path().to_path_buf(), safe_subdir];

        let thread_count = 2;
        let requests_per_thread = 25;

        let workers = fs_workers(2);
        let task_tx = workers.io_tx();

        let mut handles = Vec::new();
        for t in 0..thread_count {
            let task_tx = task_tx.clone();
            let dirs = dirs.clone();
            handles.push(thread::spawn(move || {
                let mut rng = rng();
                for i in 0..requests_per_thread {
                    let dir = &dirs[rng.random_range(0..dirs.len())];
                    task_tx
                        .send(WorkerTask::LoadDirectory {
                            path: dir.clone(),
                            focus: None,
                            request_id: (t * requests_per_thread + i) as u64,
                        })
                        .expect("Couldn't send task to worker");
                }
            }));
        }

        for h in handles {
            if let Err(err) = h.join() {
                panic!("Thread panicked during stress test: {:?}", err);
            }
        }

        // Loads are coalesced, so anywhere from 1 to every request gets a response
        let total_requests = thread_count * requests_per_thread;
        let mut responses = 0;
        while let Ok(resp) = workers
            .response_rx()
            .recv_timeout(Duration::from_millis(500))
        {
            match resp {
                WorkerResponse::DirectoryLoaded { path, .. } => {
                    assert!(dirs.contains(&path));
                    responses += 1;
                }
                other => panic!("Unexpected WorkerResponse variant: {:?}", other),
            }
        }
        assert!(responses >= 1);
        assert!(responses <= total_requests);
        Ok(())
    }

    #[test]
    fn metadata_pool_resolves_every_request() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let sub = dir.path().join("sub");
        fs::create_dir(&sub)?;
        File::create(sub.join("one"))?;
        File::create(sub.join("two"))?;
        fs::write(dir.path().join("notes.md"), "# notes\n")?;

        let workers = fs_workers(3);
        let resolver = workers.resolver();
        resolver.schedule(ResolveRequest {
            path: sub.clone(),
            kind: MetaKind::DirCount,
            generation: 4,
        });
        resolver.schedule(ResolveRequest {
            path: dir.path().join("notes.md"),
            kind: MetaKind::ContentType,
            generation: 4,
        });
        resolver.schedule(ResolveRequest {
            path: dir.path().join("missing"),
            kind: MetaKind::DirCount,
            generation: 4,
        });

        let mut got = Vec::new();
        for _ in 0..3 {
            match workers.response_rx().recv_timeout(Duration::from_secs(2))? {
                WorkerResponse::MetadataResolved(r) => got.push(r),
                other => return Err(format!("Unexpected response: {:?}", other).into()),
            }
        }
        assert!(got.iter().all(|r| r.generation == 4));

        let find = |name: &str| got.iter().find(|r| r.path.ends_with(name));
        assert_eq!(
            find("sub").and_then(|r| r.outcome.clone()),
            Some(MetaValue::ItemCount(2))
        );
        assert_eq!(
            find("notes.md").and_then(|r| r.outcome.clone()),
            Some(MetaValue::ContentType("text/markdown".into()))
        );
        assert!(find("missing").is_some_and(|r| r.outcome.is_none()));
        Ok(())
    }
}

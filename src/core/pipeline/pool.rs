//! Fixed-size fingerprint worker pool.
//!
//! Every cache miss becomes an independent task on a dedicated rayon
//! pool. Tasks share only the immutable hasher and report back over a
//! channel; the orchestrating thread drains that channel in completion
//! order and is the only owner of the cache.

use crate::core::cache::{CacheStore, HashCache};
use crate::core::hasher::{Fingerprint, HashAlgorithm};
use crate::error::{DuplicateFinderError, HashError, PipelineError};
use crate::events::{Event, EventSender, HashEvent, HashProgress, PipelineEvent, PipelinePhase};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

/// Result of fingerprinting one file
#[derive(Debug)]
pub struct FingerprintOutcome {
    pub path: PathBuf,
    pub result: Result<Fingerprint, HashError>,
}

/// Counts from one `compute_missing` batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComputeOutcome {
    /// Paths that already had a fingerprint
    pub already_cached: usize,
    /// Paths fingerprinted and stored in this batch
    pub newly_hashed: usize,
    /// Paths whose fingerprint could not be computed
    pub unhashable: usize,
    /// Whether the cache was written back
    pub persisted: bool,
}

/// Worker pool computing fingerprints for cache misses
pub struct FingerprintPool {
    pool: rayon::ThreadPool,
    workers: usize,
    hasher: Arc<dyn HashAlgorithm>,
}

impl FingerprintPool {
    /// Start a pool of exactly `workers` threads.
    ///
    /// The size is independent of the CPU count; decoding is mostly I/O
    /// bound, so more workers than cores is fine.
    pub fn new(workers: usize, hasher: Arc<dyn HashAlgorithm>) -> Result<Self, PipelineError> {
        if workers == 0 {
            return Err(PipelineError::PoolStartFailed {
                workers,
                reason: "worker count must be at least 1".to_string(),
            });
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("fingerprint-{}", index))
            .build()
            .map_err(|e| PipelineError::PoolStartFailed {
                workers,
                reason: e.to_string(),
            })?;

        Ok(Self {
            pool,
            workers,
            hasher,
        })
    }

    /// Fingerprint `paths`, returning outcomes in completion order.
    ///
    /// A file that cannot be decoded, including one whose decoder panics,
    /// yields an `Err` outcome and the batch continues. Only a failure of
    /// the pool itself fails the whole batch.
    pub fn fingerprint_all(
        &self,
        paths: &[PathBuf],
        events: &EventSender,
    ) -> Result<Vec<FingerprintOutcome>, PipelineError> {
        let total = paths.len();
        let hasher = &self.hasher;
        let (sender, receiver) = crossbeam_channel::unbounded::<FingerprintOutcome>();

        thread::scope(|scope| {
            // Blocks on the rayon scope in its own thread so this thread
            // can drain results while the workers run
            let submitter = scope.spawn(move || {
                self.pool.scope(move |s| {
                    for path in paths {
                        let sender = sender.clone();
                        s.spawn(move |_| {
                            // A decoder panic is a bad file, not a bad batch
                            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                                hasher.fingerprint_file(path)
                            }))
                            .unwrap_or_else(|payload| {
                                Err(HashError::DecodeError {
                                    path: path.clone(),
                                    reason: format!(
                                        "decoder panicked: {}",
                                        panic_message(payload.as_ref())
                                    ),
                                })
                            });
                            let _ = sender.send(FingerprintOutcome {
                                path: path.clone(),
                                result,
                            });
                        });
                    }
                });
            });

            let mut outcomes = Vec::with_capacity(total);
            for outcome in receiver.iter() {
                match &outcome.result {
                    Ok(fingerprint) => {
                        debug!(path = %outcome.path.display(), %fingerprint, "hashed");
                    }
                    Err(e) => {
                        warn!("unhashable: {}", e);
                        events.send(Event::Hash(HashEvent::Failed {
                            path: outcome.path.clone(),
                            message: e.to_string(),
                        }));
                    }
                }

                events.send(Event::Hash(HashEvent::Progress(HashProgress {
                    completed: outcomes.len() + 1,
                    total,
                    current_path: outcome.path.clone(),
                })));
                outcomes.push(outcome);
            }

            submitter
                .join()
                .map_err(|payload| PipelineError::WorkerFailed {
                    reason: panic_message(payload.as_ref()),
                })?;

            Ok(outcomes)
        })
    }

    /// Fingerprint every path in `all_paths` that `cache` lacks, merge the
    /// results and persist the cache once.
    ///
    /// Nothing is persisted when there is nothing to compute or when the
    /// batch fails. If persisting fails, `cache` still holds the merged
    /// results and can be persisted again.
    pub fn compute_missing(
        &self,
        all_paths: &[PathBuf],
        cache: &mut HashCache,
        store: &dyn CacheStore,
        events: &EventSender,
    ) -> Result<ComputeOutcome, DuplicateFinderError> {
        let missing = cache.missing(all_paths);
        let already_cached = all_paths.iter().filter(|p| cache.contains(p)).count();

        info!(
            new = missing.len(),
            cached = already_cached,
            workers = self.workers,
            "hashing new images"
        );
        events.send(Event::Hash(HashEvent::Started {
            total_photos: missing.len(),
            cache_hits: already_cached,
        }));

        if missing.is_empty() {
            events.send(Event::Hash(HashEvent::Completed {
                newly_hashed: 0,
                unhashable: 0,
            }));
            return Ok(ComputeOutcome {
                already_cached,
                ..ComputeOutcome::default()
            });
        }

        let outcomes = self.fingerprint_all(&missing, events)?;
        let stats = cache.merge(
            outcomes
                .into_iter()
                .map(|outcome| (outcome.path, outcome.result.ok())),
        );

        events.send(Event::Hash(HashEvent::Completed {
            newly_hashed: stats.stored,
            unhashable: stats.dropped,
        }));

        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Persisting,
        }));
        store.persist(cache)?;

        Ok(ComputeOutcome {
            already_cached,
            newly_hashed: stats.stored,
            unhashable: stats.dropped,
            persisted: true,
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::InMemoryStore;
    use crate::core::hasher::HashAlgorithmKind;
    use crate::error::CacheError;
    use crate::events::{null_sender, EventChannel};
    use image::DynamicImage;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fingerprints the file name; fails for names containing "bad" and
    /// panics for names containing "boom"
    struct NameHasher {
        calls: AtomicUsize,
    }

    impl NameHasher {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl HashAlgorithm for NameHasher {
        fn hash_image(&self, _image: &DynamicImage) -> Fingerprint {
            Fingerprint::from("unused")
        }

        fn fingerprint_file(&self, path: &Path) -> Result<Fingerprint, HashError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let name = path.file_stem().unwrap().to_str().unwrap();
            if name.contains("boom") {
                panic!("decoder exploded on {}", name);
            }
            if name.contains("bad") {
                return Err(HashError::DecodeError {
                    path: path.to_path_buf(),
                    reason: "corrupt".to_string(),
                });
            }
            // Strip a trailing copy marker so "a" and "a_copy" collide
            Ok(Fingerprint::from(name.trim_end_matches("_copy")))
        }

        fn kind(&self) -> HashAlgorithmKind {
            HashAlgorithmKind::Perceptual
        }

        fn hash_size(&self) -> u32 {
            8
        }
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| PathBuf::from(format!("/p/{}.jpg", n))).collect()
    }

    #[test]
    fn zero_workers_is_rejected() {
        let result = FingerprintPool::new(0, NameHasher::new());
        assert!(matches!(result, Err(PipelineError::PoolStartFailed { .. })));
    }

    #[test]
    fn fingerprint_all_returns_one_outcome_per_path() {
        let pool = FingerprintPool::new(3, NameHasher::new()).unwrap();
        let input = paths(&["a", "b", "bad", "c", "d"]);

        let outcomes = pool.fingerprint_all(&input, &null_sender()).unwrap();

        assert_eq!(outcomes.len(), 5);
        assert_eq!(outcomes.iter().filter(|o| o.result.is_err()).count(), 1);
    }

    #[test]
    fn progress_is_monotonic_and_complete() {
        let pool = FingerprintPool::new(4, NameHasher::new()).unwrap();
        let input = paths(&["a", "b", "c", "d", "e", "f", "g"]);
        let (sender, receiver) = EventChannel::new();

        pool.fingerprint_all(&input, &sender).unwrap();
        drop(sender);

        let completed: Vec<usize> = receiver
            .iter()
            .filter_map(|event| match event {
                Event::Hash(HashEvent::Progress(p)) => Some(p.completed),
                _ => None,
            })
            .collect();
        assert_eq!(completed, (1..=7).collect::<Vec<_>>());
    }

    #[test]
    fn panicking_decoder_marks_only_that_file_unhashable() {
        let pool = FingerprintPool::new(2, NameHasher::new()).unwrap();
        let input = paths(&["a", "boom", "c"]);

        let outcomes = pool.fingerprint_all(&input, &null_sender()).unwrap();

        assert_eq!(outcomes.len(), 3);
        let failed: Vec<&FingerprintOutcome> =
            outcomes.iter().filter(|o| o.result.is_err()).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].path, PathBuf::from("/p/boom.jpg"));
        match &failed[0].result {
            Err(HashError::DecodeError { reason, .. }) => {
                assert!(reason.contains("decoder panicked"));
                assert!(reason.contains("boom"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn compute_missing_only_hashes_misses_and_persists_once() {
        let hasher = NameHasher::new();
        let pool = FingerprintPool::new(2, hasher.clone()).unwrap();
        let store = InMemoryStore::new();
        let mut cache = HashCache::new();
        cache.insert(PathBuf::from("/p/a.jpg"), Fingerprint::from("a"));

        let input = paths(&["a", "a_copy", "b", "bad"]);
        let outcome = pool
            .compute_missing(&input, &mut cache, &store, &null_sender())
            .unwrap();

        assert_eq!(
            outcome,
            ComputeOutcome {
                already_cached: 1,
                newly_hashed: 2,
                unhashable: 1,
                persisted: true,
            }
        );
        assert_eq!(hasher.calls.load(Ordering::SeqCst), 3);
        assert_eq!(store.persist_count(), 1);
        assert_eq!(store.load().unwrap(), cache);
        assert!(!cache.contains(Path::new("/p/bad.jpg")));
    }

    #[test]
    fn fully_cached_input_computes_and_persists_nothing() {
        let hasher = NameHasher::new();
        let pool = FingerprintPool::new(2, hasher.clone()).unwrap();
        let store = InMemoryStore::new();
        let mut cache: HashCache = paths(&["a", "b"])
            .into_iter()
            .map(|p| (p, Fingerprint::from("x")))
            .collect();

        let outcome = pool
            .compute_missing(&paths(&["a", "b"]), &mut cache, &store, &null_sender())
            .unwrap();

        assert_eq!(outcome.already_cached, 2);
        assert!(!outcome.persisted);
        assert_eq!(hasher.calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.persist_count(), 0);
    }

    #[test]
    fn worker_count_does_not_change_the_cache() {
        let input = paths(&["a", "a_copy", "b", "c", "bad", "d", "d_copy"]);

        let mut wide = HashCache::new();
        FingerprintPool::new(4, NameHasher::new())
            .unwrap()
            .compute_missing(&input, &mut wide, &InMemoryStore::new(), &null_sender())
            .unwrap();

        let mut narrow = HashCache::new();
        FingerprintPool::new(1, NameHasher::new())
            .unwrap()
            .compute_missing(&input, &mut narrow, &InMemoryStore::new(), &null_sender())
            .unwrap();

        assert_eq!(wide, narrow);
    }

    #[test]
    fn panicking_file_is_retried_next_batch() {
        let hasher = NameHasher::new();
        let pool = FingerprintPool::new(2, hasher.clone()).unwrap();
        let store = InMemoryStore::new();
        let mut cache = HashCache::new();
        let input = paths(&["a", "boom"]);

        let first = pool
            .compute_missing(&input, &mut cache, &store, &null_sender())
            .unwrap();
        let second = pool
            .compute_missing(&input, &mut cache, &store, &null_sender())
            .unwrap();

        assert_eq!((first.newly_hashed, first.unhashable), (1, 1));
        assert_eq!((second.newly_hashed, second.unhashable), (0, 1));
        assert_eq!(hasher.calls.load(Ordering::SeqCst), 3);
        assert!(!store.load().unwrap().contains(Path::new("/p/boom.jpg")));
    }

    struct BrokenStore;

    impl CacheStore for BrokenStore {
        fn load(&self) -> Result<HashCache, CacheError> {
            Ok(HashCache::new())
        }

        fn persist(&self, _cache: &HashCache) -> Result<(), CacheError> {
            Err(CacheError::PersistFailed {
                path: PathBuf::from("/readonly/image_hashes.json"),
                reason: "read-only file system".to_string(),
            })
        }

        fn describe(&self) -> String {
            "broken".to_string()
        }
    }

    #[test]
    fn persist_failure_surfaces_and_keeps_merged_cache() {
        let pool = FingerprintPool::new(2, NameHasher::new()).unwrap();
        let mut cache = HashCache::new();

        let result = pool.compute_missing(&paths(&["a", "b"]), &mut cache, &BrokenStore, &null_sender());

        assert!(matches!(
            result,
            Err(DuplicateFinderError::Cache(CacheError::PersistFailed { .. }))
        ));
        assert_eq!(cache.len(), 2);
    }
}

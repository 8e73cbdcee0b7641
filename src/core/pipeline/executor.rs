//! Pipeline execution implementation.

use super::pool::FingerprintPool;
use crate::core::cache::{CacheStore, HashCache, JsonCacheStore};
use crate::core::grouper::{group, DuplicateGroup};
use crate::core::hasher::{HashAlgorithm, HashAlgorithmKind, HasherConfig, DEFAULT_HASH_SIZE};
use crate::core::reporter::{report, DEFAULT_REPORT_FILE};
use crate::core::scanner::{PhotoScanner, ScanConfig, WalkDirScanner};
use crate::error::DuplicateFinderError;
use crate::events::{
    null_sender, Event, EventSender, PipelineEvent, PipelinePhase, ReportEvent, RunSummary,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Default size of the fingerprint worker pool
pub const DEFAULT_WORKER_COUNT: usize = 20;

/// Result of pipeline execution
#[derive(Debug)]
pub struct PipelineResult {
    /// Counts reported to the user
    pub summary: RunSummary,
    /// Duplicate groups written to the report
    pub groups: Vec<DuplicateGroup>,
    /// Non-fatal scan errors
    pub errors: Vec<String>,
}

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory to scan
    pub root_directory: PathBuf,
    /// Edge length of the hash grid
    pub hash_size: u32,
    /// Fingerprint worker count
    pub worker_count: usize,
    /// Hash algorithm to use
    pub algorithm: HashAlgorithmKind,
    /// Where the duplicate report is written
    pub report_path: PathBuf,
    /// Scanner configuration (extensions, hidden files)
    pub scan_config: ScanConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            root_directory: PathBuf::from("."),
            hash_size: DEFAULT_HASH_SIZE,
            worker_count: DEFAULT_WORKER_COUNT,
            algorithm: HashAlgorithmKind::Perceptual,
            report_path: PathBuf::from(DEFAULT_REPORT_FILE),
            scan_config: ScanConfig::default(),
        }
    }
}

impl PipelineConfig {
    fn validate(&self) -> Result<(), DuplicateFinderError> {
        if self.worker_count == 0 {
            return Err(DuplicateFinderError::Config(
                "worker count must be at least 1".to_string(),
            ));
        }
        if let Some(extensions) = &self.scan_config.extensions {
            if extensions.iter().all(|e| e.trim().trim_start_matches('.').is_empty()) {
                return Err(DuplicateFinderError::Config(
                    "at least one image extension is required".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
    store: Option<Box<dyn CacheStore>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            store: None,
        }
    }

    /// Set the directory to scan
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.root_directory = root.into();
        self
    }

    /// Set the hash size
    pub fn hash_size(mut self, hash_size: u32) -> Self {
        self.config.hash_size = hash_size;
        self
    }

    /// Set the number of fingerprint workers
    pub fn worker_count(mut self, workers: usize) -> Self {
        self.config.worker_count = workers;
        self
    }

    /// Set the hash algorithm
    pub fn algorithm(mut self, algorithm: HashAlgorithmKind) -> Self {
        self.config.algorithm = algorithm;
        self
    }

    /// Use a JSON cache file at `path`
    pub fn cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store = Some(Box::new(JsonCacheStore::new(path)));
        self
    }

    /// Set the cache backend
    pub fn cache(mut self, store: Box<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set where the report is written
    pub fn report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.report_path = path.into();
        self
    }

    /// Restrict scanning to these extensions
    pub fn allowed_extensions(mut self, extensions: Vec<String>) -> Self {
        self.config.scan_config.extensions = Some(extensions);
        self
    }

    /// Include hidden files and directories
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.config.scan_config.include_hidden = include;
        self
    }

    /// Build the pipeline
    ///
    /// Without an explicit cache, the JSON cache at
    /// [`JsonCacheStore::default_path`] is used.
    pub fn build(self) -> Pipeline {
        Pipeline {
            config: self.config,
            store: self
                .store
                .unwrap_or_else(|| Box::new(JsonCacheStore::new(JsonCacheStore::default_path()))),
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The duplicate detection pipeline
pub struct Pipeline {
    config: PipelineConfig,
    store: Box<dyn CacheStore>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// The pipeline configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<PipelineResult, DuplicateFinderError> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(
        &self,
        events: &EventSender,
    ) -> Result<PipelineResult, DuplicateFinderError> {
        events.send(Event::Pipeline(PipelineEvent::Started));

        let result = self.execute(events);

        match &result {
            Ok(result) => events.send(Event::Pipeline(PipelineEvent::Completed {
                summary: result.summary.clone(),
            })),
            Err(e) => events.send(Event::Pipeline(PipelineEvent::Error {
                message: e.to_string(),
            })),
        }

        result
    }

    /// Regroup the existing cache and rewrite the report, without
    /// scanning or hashing
    pub fn rebuild_report(&self) -> Result<Vec<DuplicateGroup>, DuplicateFinderError> {
        let cache = self.store.load()?;
        let groups = group(&cache);
        report(&groups, &self.config.report_path)?;
        Ok(groups)
    }

    /// Load the cache without running anything
    pub fn load_cache(&self) -> Result<HashCache, DuplicateFinderError> {
        Ok(self.store.load()?)
    }

    fn execute(&self, events: &EventSender) -> Result<PipelineResult, DuplicateFinderError> {
        let start_time = Instant::now();
        self.config.validate()?;

        let hasher: Arc<dyn HashAlgorithm> = Arc::from(
            HasherConfig::new()
                .algorithm(self.config.algorithm)
                .hash_size(self.config.hash_size)
                .build()?,
        );

        // Phase 1: Load cache. A corrupt cache stops the run before any work
        phase(events, PipelinePhase::LoadingCache);
        let mut cache = self.store.load()?;

        // Phase 2: Scanning
        phase(events, PipelinePhase::Scanning);
        let scanner = WalkDirScanner::new(self.config.scan_config.clone());
        let scan_result = scanner.scan_with_events(&self.config.root_directory, events);
        let errors: Vec<String> = scan_result.errors.iter().map(|e| e.to_string()).collect();
        let photos = scan_result.photos;

        info!(
            root = %self.config.root_directory.display(),
            found = photos.len(),
            "found image files, checking for cached hashes"
        );

        // Phase 3: Hashing cache misses, then a single persist
        phase(events, PipelinePhase::Hashing);
        let pool = FingerprintPool::new(self.config.worker_count, hasher)?;
        let outcome = pool.compute_missing(&photos, &mut cache, self.store.as_ref(), events)?;

        // Phase 4: Grouping
        phase(events, PipelinePhase::Grouping);
        let groups = group(&cache);

        // Phase 5: Reporting
        phase(events, PipelinePhase::Reporting);
        report(&groups, &self.config.report_path)?;
        events.send(Event::Report(ReportEvent::Written {
            path: self.config.report_path.clone(),
            groups: groups.len(),
        }));

        let summary = RunSummary {
            scanned: photos.len(),
            already_cached: outcome.already_cached,
            newly_hashed: outcome.newly_hashed,
            unhashable: outcome.unhashable,
            duplicate_groups: groups.len(),
            duration_ms: start_time.elapsed().as_millis() as u64,
        };

        if summary.unhashable > 0 {
            warn!(count = summary.unhashable, "some images could not be hashed");
        }
        info!(
            scanned = summary.scanned,
            already_cached = summary.already_cached,
            newly_hashed = summary.newly_hashed,
            unhashable = summary.unhashable,
            duplicate_groups = summary.duplicate_groups,
            "run complete"
        );

        Ok(PipelineResult {
            summary,
            groups,
            errors,
        })
    }
}

fn phase(events: &EventSender, phase: PipelinePhase) {
    events.send(Event::Pipeline(PipelineEvent::PhaseChanged { phase }));
}

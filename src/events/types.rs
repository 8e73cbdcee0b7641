//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the duplicate finder pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Scanning phase events
    Scan(ScanEvent),
    /// Hashing phase events
    Hash(HashEvent),
    /// Report phase events
    Report(ReportEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during the scanning phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Scanning has started
    Started { root: PathBuf },
    /// A photo was found
    PhotoFound { path: PathBuf },
    /// An error occurred but scanning continues
    Error { path: PathBuf, message: String },
    /// Scanning completed
    Completed { total_photos: usize },
}

/// Events during the hashing phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HashEvent {
    /// Hashing of cache misses has started
    Started {
        total_photos: usize,
        cache_hits: usize,
    },
    /// One more photo finished (successfully or not)
    Progress(HashProgress),
    /// A photo could not be fingerprinted; hashing continues
    Failed { path: PathBuf, message: String },
    /// Hashing completed
    Completed { newly_hashed: usize, unhashable: usize },
}

/// Progress information during hashing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashProgress {
    /// Number of photos finished so far (monotonically increasing)
    pub completed: usize,
    /// Total number of cache misses in this batch
    pub total: usize,
    /// Photo that just finished
    pub current_path: PathBuf,
}

/// Events during the report phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReportEvent {
    /// The duplicate report was written
    Written { path: PathBuf, groups: usize },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: RunSummary },
    /// Pipeline encountered a fatal error
    Error { message: String },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Scanning,
    LoadingCache,
    Hashing,
    Persisting,
    Grouping,
    Reporting,
}

/// Summary of a pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Image files found by the scanner
    pub scanned: usize,
    /// Scanned files that already had a cached fingerprint
    pub already_cached: usize,
    /// Files fingerprinted in this run
    pub newly_hashed: usize,
    /// Files whose fingerprint could not be computed
    pub unhashable: usize,
    /// Groups of two or more photos sharing a fingerprint
    pub duplicate_groups: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::LoadingCache => write!(f, "Loading cache"),
            PipelinePhase::Hashing => write!(f, "Hashing"),
            PipelinePhase::Persisting => write!(f, "Saving cache"),
            PipelinePhase::Grouping => write!(f, "Grouping"),
            PipelinePhase::Reporting => write!(f, "Reporting"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Hash(HashEvent::Progress(HashProgress {
            completed: 10,
            total: 50,
            current_path: PathBuf::from("/photos/a.jpg"),
        }));

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Hash(HashEvent::Progress(p)) => {
                assert_eq!(p.completed, 10);
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn run_summary_is_serializable() {
        let summary = RunSummary {
            scanned: 1000,
            already_cached: 900,
            newly_hashed: 95,
            unhashable: 5,
            duplicate_groups: 42,
            duration_ms: 5000,
        };

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"unhashable\":5"));
    }

    #[test]
    fn phase_display_is_human_readable() {
        assert_eq!(PipelinePhase::Persisting.to_string(), "Saving cache");
        assert_eq!(PipelinePhase::Hashing.to_string(), "Hashing");
    }
}

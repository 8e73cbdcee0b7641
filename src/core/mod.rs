//! # Core Module
//!
//! The UI-agnostic duplicate detection engine.
//!
//! ## Modules
//! - `scanner` - Discovers image files in a directory tree
//! - `hasher` - Computes perceptual fingerprints
//! - `cache` - Persists fingerprints to avoid recomputation
//! - `pipeline` - Orchestrates the full workflow
//! - `grouper` - Groups paths by identical fingerprint
//! - `reporter` - Writes the duplicate report

mod atomic;
pub mod cache;
pub mod grouper;
pub mod hasher;
pub mod pipeline;
pub mod reporter;
pub mod scanner;

// Re-export commonly used types
pub use cache::{CacheStore, HashCache, JsonCacheStore};
pub use grouper::{group, DuplicateGroup};
pub use hasher::{fingerprint, Fingerprint, HashAlgorithmKind};
pub use pipeline::{Pipeline, PipelineBuilder, PipelineResult};
pub use reporter::{load_report, report, DuplicateReport};
pub use scanner::{ScanResult, WalkDirScanner};

//! # Pipeline Module
//!
//! Orchestrates the full duplicate detection workflow.
//!
//! ## Pipeline Stages
//! 1. **Load** - Read the fingerprint cache (a corrupt cache stops the run)
//! 2. **Scan** - Discover image files under the root directory
//! 3. **Hash** - Fingerprint cache misses on a fixed-size worker pool
//! 4. **Persist** - Write the merged cache back once
//! 5. **Group** - Collect paths sharing an identical fingerprint
//! 6. **Report** - Write the duplicate report
//!
//! ## Parallelism
//! Uses a dedicated rayon pool of exactly `worker_count` threads.

mod executor;
mod pool;

pub use executor::{
    Pipeline, PipelineBuilder, PipelineConfig, PipelineResult, DEFAULT_WORKER_COUNT,
};
pub use pool::{ComputeOutcome, FingerprintOutcome, FingerprintPool};

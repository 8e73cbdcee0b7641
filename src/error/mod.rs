//! # Error Module
//!
//! Typed errors for the duplicate photo finder.
//!
//! ## Propagation Policy
//! - **Per-file errors become data** - a `HashError` turns into a missing
//!   fingerprint and the batch continues
//! - **Systemic errors surface** - cache corruption, persist failures and
//!   worker failures abort the run
//! - **Never delete user data** - a corrupt cache is reported, not replaced

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum DuplicateFinderError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Report generation error: {0}")]
    Report(#[from] ReportError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur during photo scanning
///
/// None of these abort a scan; they are collected alongside the results.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Skipping file with a non-UTF-8 name: {path}")]
    NonUtf8Path { path: PathBuf },
}

/// Errors that occur while fingerprinting a single image
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Failed to decode image {path}: {reason}")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Image is empty or corrupted: {path}")]
    EmptyImage { path: PathBuf },

    #[error("Failed to open image file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur with the hash cache
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to read cache file at {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache corruption detected at {path}: {reason}. Fix or move this file and try again.")]
    Corrupted { path: PathBuf, reason: String },

    #[error("Failed to persist cache to {path}: {reason}")]
    PersistFailed { path: PathBuf, reason: String },

    #[error("Failed to serialize hash data: {0}")]
    SerializationFailed(String),
}

/// Errors that abort a fingerprinting batch
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to start worker pool with {workers} workers: {reason}")]
    PoolStartFailed { workers: usize, reason: String },

    #[error("A fingerprint worker terminated abnormally: {reason}. Nothing was persisted; re-run the scan.")]
    WorkerFailed { reason: String },
}

/// Errors that occur during report generation
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report to {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("Failed to read report at {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, DuplicateFinderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_error_includes_path() {
        let error = ScanError::DirectoryNotFound {
            path: PathBuf::from("/photos/vacation"),
        };
        let message = error.to_string();
        assert!(message.contains("/photos/vacation"));
    }

    #[test]
    fn hash_error_includes_path() {
        let error = HashError::DecodeError {
            path: PathBuf::from("/photos/broken.jpg"),
            reason: "invalid JPEG".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("/photos/broken.jpg"));
        assert!(message.contains("invalid JPEG"));
    }

    #[test]
    fn corrupted_cache_does_not_suggest_deletion() {
        let error = CacheError::Corrupted {
            path: PathBuf::from("/cache/image_hashes.json"),
            reason: "expected value at line 1".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("/cache/image_hashes.json"));
        assert!(!message.contains("Delete"));
    }

    #[test]
    fn worker_failure_suggests_rerun() {
        let error = PipelineError::WorkerFailed {
            reason: "decoder panicked".to_string(),
        };
        assert!(error.to_string().contains("re-run"));
    }

    #[test]
    fn nested_errors_convert_to_top_level() {
        let error: DuplicateFinderError = CacheError::SerializationFailed("bad".into()).into();
        assert!(matches!(error, DuplicateFinderError::Cache(_)));
    }
}

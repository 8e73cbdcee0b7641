//! # Scanner Module
//!
//! Discovers photo files under a root directory.
//!
//! ## Default Extensions
//! `jpg`, `jpeg`, `png`, `bmp`, `gif`, `tiff`, `webp`, `heic`
//! (matched case-insensitively).
//!
//! Results come back in traversal order. Unreadable directories and
//! permission errors are recorded and skipped; they never stop a scan.
//!
//! ## Example
//! ```rust,ignore
//! use photo_dedup::core::scanner::{PhotoScanner, ScanConfig, WalkDirScanner};
//!
//! let scanner = WalkDirScanner::new(ScanConfig::default());
//! let result = scanner.scan(Path::new("/Users/me/Pictures"))?;
//! ```

mod filter;
mod walker;

pub use filter::{ImageFilter, DEFAULT_EXTENSIONS};
pub use walker::{ScanConfig, WalkDirScanner};

use crate::error::ScanError;
use crate::events::EventSender;
use std::path::{Path, PathBuf};

/// Result of a scan operation
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Discovered image paths, in traversal order
    pub photos: Vec<PathBuf>,
    /// Errors that occurred during scanning (non-fatal)
    pub errors: Vec<ScanError>,
}

/// Trait for photo scanners
///
/// Implement this trait to create custom scanners (e.g., for testing).
pub trait PhotoScanner: Send + Sync {
    /// Scan a directory tree and return discovered photos
    fn scan(&self, root: &Path) -> ScanResult;

    /// Scan with progress reporting via events
    fn scan_with_events(&self, root: &Path, events: &EventSender) -> ScanResult;
}

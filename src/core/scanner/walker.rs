//! Directory walking implementation using walkdir.

use super::filter::{is_hidden, ImageFilter};
use super::{PhotoScanner, ScanResult};
use crate::error::ScanError;
use crate::events::{Event, EventSender, ScanEvent};
use std::io;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Configuration for the directory scanner
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to follow symbolic links (walkdir detects loops)
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Custom extensions to include (None = use defaults)
    pub extensions: Option<Vec<String>>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            include_hidden: true,
            extensions: None,
        }
    }
}

/// Scanner implementation using the walkdir crate
pub struct WalkDirScanner {
    config: ScanConfig,
    filter: ImageFilter,
}

impl WalkDirScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        let mut filter = ImageFilter::new().with_hidden(config.include_hidden);

        if let Some(ref extensions) = config.extensions {
            filter = filter.with_extensions(extensions);
        }

        Self { config, filter }
    }

    fn walk(&self, root: &Path, events: &EventSender) -> ScanResult {
        let mut result = ScanResult::default();

        if !root.is_dir() {
            let error = ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            };
            warn!("{}", error);
            events.send(Event::Scan(ScanEvent::Error {
                path: root.to_path_buf(),
                message: error.to_string(),
            }));
            result.errors.push(error);
            return result;
        }

        let walker = WalkDir::new(root).follow_links(self.config.follow_symlinks);

        let include_hidden = self.filter.includes_hidden();

        // Pruning here skips whole hidden subtrees; the root itself is
        // always walked even if its own name starts with a dot
        let entries = walker
            .into_iter()
            .filter_entry(|entry| include_hidden || entry.depth() == 0 || !is_hidden(entry.path()));

        for entry_result in entries {
            match entry_result {
                Ok(entry) => {
                    // Links to files count even when directory links are not followed
                    let is_file = entry.file_type().is_file()
                        || (entry.path_is_symlink() && entry.path().is_file());
                    if !is_file {
                        continue;
                    }

                    let path = entry.path();
                    if !self.filter.should_include(path) {
                        continue;
                    }

                    // Cache and report keys are JSON strings
                    if path.to_str().is_none() {
                        let error = ScanError::NonUtf8Path {
                            path: path.to_path_buf(),
                        };
                        warn!("skipping: {}", error);
                        events.send(Event::Scan(ScanEvent::Error {
                            path: path.to_path_buf(),
                            message: error.to_string(),
                        }));
                        result.errors.push(error);
                        continue;
                    }

                    debug!(path = %path.display(), "found photo");
                    events.send(Event::Scan(ScanEvent::PhotoFound {
                        path: path.to_path_buf(),
                    }));
                    result.photos.push(entry.into_path());
                }
                Err(e) => {
                    let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();

                    let error = if e.io_error().map(|e| e.kind())
                        == Some(io::ErrorKind::PermissionDenied)
                    {
                        ScanError::PermissionDenied { path: path.clone() }
                    } else {
                        ScanError::ReadDirectory {
                            path: path.clone(),
                            source: io::Error::other(e.to_string()),
                        }
                    };

                    warn!("skipping: {}", error);
                    events.send(Event::Scan(ScanEvent::Error {
                        path,
                        message: error.to_string(),
                    }));

                    result.errors.push(error);
                }
            }
        }

        result
    }
}

impl PhotoScanner for WalkDirScanner {
    fn scan(&self, root: &Path) -> ScanResult {
        self.scan_with_events(root, &crate::events::null_sender())
    }

    fn scan_with_events(&self, root: &Path, events: &EventSender) -> ScanResult {
        events.send(Event::Scan(ScanEvent::Started {
            root: root.to_path_buf(),
        }));

        let result = self.walk(root, events);

        debug!(
            root = %root.display(),
            photos = result.photos.len(),
            errors = result.errors.len(),
            "scan finished"
        );
        events.send(Event::Scan(ScanEvent::Completed {
            total_photos: result.photos.len(),
        }));

        result
    }
}

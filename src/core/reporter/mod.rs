//! # Reporter Module
//!
//! Writes duplicate groups to the report artifact consumed by review
//! tools.
//!
//! ## Format
//! A pretty-printed JSON object mapping each fingerprint to the ordered
//! list of photo paths that share it:
//!
//! ```json
//! {
//!   "c3c3e1f0...": [
//!     "/photos/a.jpg",
//!     "/photos/copy of a.jpg"
//!   ]
//! }
//! ```
//!
//! Keys keep the group order, so an unchanged cache produces a
//! byte-identical report. Paths are written as cached; a path whose file
//! has since disappeared is still reported.

use crate::core::atomic::write_json_atomically;
use crate::core::grouper::DuplicateGroup;
use crate::core::hasher::Fingerprint;
use crate::error::ReportError;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name used when no report path is configured
pub const DEFAULT_REPORT_FILE: &str = "duplicates.json";

/// The duplicate report: groups in order, serialized as a JSON object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateReport {
    groups: Vec<DuplicateGroup>,
}

impl DuplicateReport {
    /// Wrap groups for serialization
    pub fn new(groups: Vec<DuplicateGroup>) -> Self {
        Self { groups }
    }

    /// The groups, in report order
    pub fn groups(&self) -> &[DuplicateGroup] {
        &self.groups
    }

    /// Consume the report, returning its groups
    pub fn into_groups(self) -> Vec<DuplicateGroup> {
        self.groups
    }
}

impl Serialize for DuplicateReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for group in &self.groups {
            map.serialize_entry(&group.fingerprint, &group.photos)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DuplicateReport {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ReportVisitor;

        impl<'de> Visitor<'de> for ReportVisitor {
            type Value = DuplicateReport;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of fingerprint to list of photo paths")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut groups = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((fingerprint, photos)) =
                    access.next_entry::<Fingerprint, Vec<PathBuf>>()?
                {
                    groups.push(DuplicateGroup {
                        fingerprint,
                        photos,
                    });
                }
                Ok(DuplicateReport { groups })
            }
        }

        deserializer.deserialize_map(ReportVisitor)
    }
}

/// Write `groups` to `destination`, replacing any previous report
pub fn report(groups: &[DuplicateGroup], destination: &Path) -> Result<(), ReportError> {
    let report = DuplicateReport::new(groups.to_vec());

    write_json_atomically(destination, &report).map_err(|e| ReportError::WriteFailed {
        path: destination.to_path_buf(),
        reason: e.to_string(),
    })?;

    info!(
        path = %destination.display(),
        groups = groups.len(),
        "wrote duplicate report"
    );
    Ok(())
}

/// Read a report back, keeping its group order
pub fn load_report(path: &Path) -> Result<DuplicateReport, ReportError> {
    let read_failed = |reason: String| ReportError::ReadFailed {
        path: path.to_path_buf(),
        reason,
    };

    let contents = fs::read_to_string(path).map_err(|e| read_failed(e.to_string()))?;
    serde_json::from_str(&contents).map_err(|e| read_failed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_groups() -> Vec<DuplicateGroup> {
        vec![
            DuplicateGroup {
                fingerprint: Fingerprint::from("ff00"),
                photos: vec![PathBuf::from("/p/a.jpg"), PathBuf::from("/p/b.jpg")],
            },
            DuplicateGroup {
                fingerprint: Fingerprint::from("00ff"),
                photos: vec![PathBuf::from("/p/c.jpg"), PathBuf::from("/p/d.jpg")],
            },
        ]
    }

    #[test]
    fn serializes_groups_in_order() {
        let json = serde_json::to_string(&DuplicateReport::new(sample_groups())).unwrap();

        assert_eq!(
            json,
            r#"{"ff00":["/p/a.jpg","/p/b.jpg"],"00ff":["/p/c.jpg","/p/d.jpg"]}"#
        );
    }

    #[test]
    fn empty_report_is_empty_object() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("duplicates.json");

        report(&[], &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{}\n");
    }

    #[test]
    fn written_report_loads_back_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("duplicates.json");

        report(&sample_groups(), &path).unwrap();
        let loaded = load_report(&path).unwrap();

        assert_eq!(loaded.into_groups(), sample_groups());
    }

    #[test]
    fn rewriting_same_groups_is_byte_identical() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("duplicates.json");

        report(&sample_groups(), &path).unwrap();
        let first = fs::read(&path).unwrap();
        report(&sample_groups(), &path).unwrap();
        let second = fs::read(&path).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn unwritable_destination_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();

        let error = report(&sample_groups(), &blocker.join("duplicates.json")).unwrap_err();

        assert!(matches!(error, ReportError::WriteFailed { .. }));
    }

    #[test]
    fn malformed_report_fails_to_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("duplicates.json");
        fs::write(&path, "{\"ff\": \"not a list\"}").unwrap();

        assert!(matches!(
            load_report(&path),
            Err(ReportError::ReadFailed { .. })
        ));
    }
}

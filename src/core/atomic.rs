//! Atomic JSON file writes shared by the cache and the report.
//!
//! Data goes to a temporary file next to the destination, is flushed
//! to disk, then renamed over the destination. Readers see either the
//! old file or the new one, never a partial write.

use serde::Serialize;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Serialize `value` as pretty JSON and atomically replace `path` with it
pub(crate) fn write_json_atomically<T>(path: &Path, value: &T) -> io::Result<()>
where
    T: Serialize + ?Sized,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut file = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(file.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    file.as_file().sync_all()?;

    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn replaces_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.json");
        fs::write(&path, "stale").unwrap();

        let mut value = BTreeMap::new();
        value.insert("key", "value");
        write_json_atomically(&path, &value).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{\n  \"key\": \"value\"\n}\n");
    }

    #[test]
    fn leaves_no_temporary_files_behind() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.json");

        write_json_atomically(&path, &Vec::<u8>::new()).unwrap();

        let entries: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}

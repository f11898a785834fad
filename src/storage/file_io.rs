//! JSON data files
//!
//! Every data file is JSON. Writes go to a sibling temp file that is synced
//! and renamed over the target, so a crash leaves either the old or the new
//! contents on disk.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::TallyError;

/// Read a JSON file, or `T::default()` when it is absent
pub fn read_json<T, P>(path: P) -> Result<T, TallyError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    read_json_or_else(path, T::default)
}

/// Read a JSON file, or build `fallback()` when it is absent
///
/// The category set starts out with the built-in labels rather than empty.
pub fn read_json_or_else<T, P, F>(path: P, fallback: F) -> Result<T, TallyError>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
    F: FnOnce() -> T,
{
    let path = path.as_ref();
    if !path.exists() {
        return Ok(fallback());
    }
    parse_file(path)
}

/// Read JSON from a file that must exist
pub fn read_json_required<T, P>(path: P) -> Result<T, TallyError>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    parse_file(path.as_ref())
}

fn storage_err(action: &str, path: &Path, e: impl std::fmt::Display) -> TallyError {
    TallyError::Storage(format!("cannot {} {}: {}", action, path.display(), e))
}

fn parse_file<T: DeserializeOwned>(path: &Path) -> Result<T, TallyError> {
    let file = File::open(path).map_err(|e| storage_err("open", path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| storage_err("parse", path, e))
}

/// Replace `path` with the pretty-printed JSON of `data`
///
/// The temp file sits next to the target so the rename never crosses
/// filesystems.
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), TallyError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| storage_err("create", dir, e))?;
    }

    let staging = path.with_extension("json.tmp");
    let result = write_synced(&staging, data).and_then(|()| {
        fs::rename(&staging, path).map_err(|e| storage_err("replace", path, e))
    });
    if result.is_err() {
        let _ = fs::remove_file(&staging);
    }
    result?;

    log::debug!("wrote {}", path.display());
    Ok(())
}

fn write_synced<T: Serialize>(staging: &Path, data: &T) -> Result<(), TallyError> {
    let mut writer =
        BufWriter::new(File::create(staging).map_err(|e| storage_err("create", staging, e))?);
    serde_json::to_writer_pretty(&mut writer, data).map_err(|e| storage_err("write", staging, e))?;
    writer.flush().map_err(|e| storage_err("flush", staging, e))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| storage_err("sync", staging, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
    struct Ledger {
        owner: String,
        entries: Vec<i64>,
    }

    fn sample() -> Ledger {
        Ledger {
            owner: "household".to_string(),
            entries: vec![1250, -300],
        }
    }

    #[test]
    fn test_read_missing_returns_default() {
        let temp_dir = TempDir::new().unwrap();
        let data: Ledger = read_json(temp_dir.path().join("missing.json")).unwrap();
        assert_eq!(data, Ledger::default());
    }

    #[test]
    fn test_read_missing_uses_fallback() {
        let temp_dir = TempDir::new().unwrap();
        let data: Ledger = read_json_or_else(temp_dir.path().join("missing.json"), sample).unwrap();
        assert_eq!(data, sample());
    }

    #[test]
    fn test_overwrite_replaces_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ledger.json");

        write_json_atomic(&path, &sample()).unwrap();
        write_json_atomic(&path, &Ledger::default()).unwrap();
        let loaded: Ledger = read_json(&path).unwrap();
        assert_eq!(loaded, Ledger::default());
    }

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ledger.json");

        write_json_atomic(&path, &sample()).unwrap();
        let loaded: Ledger = read_json_required(&path).unwrap();
        assert_eq!(loaded, sample());
        assert!(!temp_dir.path().join("ledger.json.tmp").exists());
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a").join("b").join("ledger.json");

        write_json_atomic(&path, &sample()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_corrupt_file_is_storage_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ledger.json");
        fs::write(&path, "not json at all").unwrap();

        let result: Result<Ledger, _> = read_json(&path);
        assert!(matches!(result, Err(TallyError::Storage(_))));
    }

    #[test]
    fn test_read_required_missing_fails() {
        let temp_dir = TempDir::new().unwrap();
        assert!(read_json_required::<Ledger, _>(temp_dir.path().join("nope.json")).is_err());
    }
}

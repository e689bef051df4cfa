//! Flat key-value slot storage.
//!
//! # File Layout
//!
//! Each slot is one JSON file under the data directory:
//!
//! ```text
//! ~/.config/haulmate/
//! ├── truck_profile.json
//! ├── trailers.json
//! ├── gallery_photos.json
//! └── ...
//! ```
//!
//! # Design Notes
//!
//! - **Atomic writes**: Write to `{key}.json.tmp`, then rename
//! - **Self-healing reads**: A slot that exists but does not parse as the
//!   expected shape is deleted and the caller gets the default state back.
//!   Corrupt state never blocks startup and is never surfaced as an error.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Error type for slot operations.
#[derive(Debug)]
pub enum StorageError {
    /// IO error
    Io(std::io::Error),
    /// JSON error
    Json(serde_json::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "IO error: {e}"),
            StorageError::Json(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Json(e)
    }
}

/// A flat key-value store, one JSON file per slot.
pub struct SlotStore {
    dir: PathBuf,
}

impl SlotStore {
    /// Create a store rooted at the given data directory.
    ///
    /// The directory itself is created lazily on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The data directory this store writes under.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Read a slot's raw contents, or `None` if the slot is absent.
    pub fn read_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(key);

        if !path.exists() {
            return Ok(None);
        }

        Ok(Some(fs::read_to_string(&path)?))
    }

    /// Write a slot's raw contents.
    ///
    /// Writes to `{key}.json.tmp` first, then renames, so an interrupted
    /// write never leaves a half-written slot behind.
    pub fn write_raw(&self, key: &str, payload: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;

        let file_path = self.slot_path(key);
        let temp_path = self.dir.join(format!("{key}.json.tmp"));

        fs::write(&temp_path, payload)?;
        fs::rename(&temp_path, &file_path)?;

        Ok(())
    }

    /// Remove a slot. Removing an absent slot succeeds.
    pub fn clear(&self, key: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key);

        if path.exists() {
            fs::remove_file(&path)?;
        }

        Ok(())
    }

    /// Serialize a value into a slot.
    pub fn save_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value)?;
        self.write_raw(key, &json)
    }

    /// Load a slot, falling back to the default state.
    ///
    /// An absent slot yields the default. A slot that cannot be read or does
    /// not parse as `T` is cleared and also yields the default; the reset is
    /// logged but never surfaced to the caller.
    pub fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.load_optional(key).unwrap_or_default()
    }

    /// Load a slot that may legitimately be absent.
    ///
    /// Returns `None` for an absent slot, and for a corrupt one after
    /// clearing it.
    pub fn load_optional<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.read_raw(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("failed to read slot {key}, treating as absent: {e}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("slot {key} is corrupt, resetting to default: {e}");
                if let Err(e) = self.clear(key) {
                    log::warn!("failed to clear corrupt slot {key}: {e}");
                }
                None
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, Serialize, Deserialize, Default, PartialEq)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn write_and_read_roundtrip() {
        let dir = tempdir().unwrap();
        let store = SlotStore::new(dir.path());

        store.write_raw("sample", r#"{"name":"a","count":1}"#).unwrap();
        let raw = store.read_raw("sample").unwrap();

        assert_eq!(raw, Some(r#"{"name":"a","count":1}"#.to_string()));
    }

    #[test]
    fn read_absent_slot_returns_none() {
        let dir = tempdir().unwrap();
        let store = SlotStore::new(dir.path());

        assert!(store.read_raw("missing").unwrap().is_none());
    }

    #[test]
    fn save_and_load_json() {
        let dir = tempdir().unwrap();
        let store = SlotStore::new(dir.path());
        let value = Sample {
            name: "truck".to_string(),
            count: 3,
        };

        store.save_json("sample", &value).unwrap();
        let loaded: Sample = store.load_or_default("sample");

        assert_eq!(loaded, value);
    }

    #[test]
    fn load_or_default_on_absent_slot() {
        let dir = tempdir().unwrap();
        let store = SlotStore::new(dir.path());

        let loaded: Sample = store.load_or_default("missing");

        assert_eq!(loaded, Sample::default());
    }

    #[test]
    fn corrupt_slot_resets_to_default_and_clears() {
        let dir = tempdir().unwrap();
        let store = SlotStore::new(dir.path());

        store.write_raw("sample", "not json at all").unwrap();
        let loaded: Sample = store.load_or_default("sample");

        assert_eq!(loaded, Sample::default());
        // The corrupt slot is gone; a subsequent read sees absence.
        assert!(store.read_raw("sample").unwrap().is_none());
    }

    #[test]
    fn wrong_shape_slot_resets_to_default_and_clears() {
        let dir = tempdir().unwrap();
        let store = SlotStore::new(dir.path());

        // Valid JSON, wrong container kind.
        store.write_raw("sample", r#"["a","b"]"#).unwrap();
        let loaded: Sample = store.load_or_default("sample");

        assert_eq!(loaded, Sample::default());
        assert!(store.read_raw("sample").unwrap().is_none());
    }

    #[test]
    fn load_optional_absent_vs_present() {
        let dir = tempdir().unwrap();
        let store = SlotStore::new(dir.path());

        let absent: Option<Sample> = store.load_optional("sample");
        assert!(absent.is_none());

        store
            .save_json(
                "sample",
                &Sample {
                    name: "x".to_string(),
                    count: 1,
                },
            )
            .unwrap();
        let present: Option<Sample> = store.load_optional("sample");
        assert!(present.is_some());
    }

    #[test]
    fn clear_removes_slot() {
        let dir = tempdir().unwrap();
        let store = SlotStore::new(dir.path());

        store.write_raw("sample", "{}").unwrap();
        store.clear("sample").unwrap();

        assert!(store.read_raw("sample").unwrap().is_none());
    }

    #[test]
    fn clear_absent_slot_succeeds() {
        let dir = tempdir().unwrap();
        let store = SlotStore::new(dir.path());

        assert!(store.clear("missing").is_ok());
    }

    #[test]
    fn atomic_write_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let store = SlotStore::new(dir.path());

        store.write_raw("sample", "{}").unwrap();

        assert!(!dir.path().join("sample.json.tmp").exists());
        assert!(dir.path().join("sample.json").exists());
    }
}

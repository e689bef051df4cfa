//! The managed attachment directory.
//!
//! Transient camera/picker files are copied into `user_files/` under the
//! data directory and referred to by bare filename from then on. On
//! platforms without an addressable private filesystem the library is
//! constructed rootless and every operation is a passthrough.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rand::Rng;
use thiserror::Error;

use super::resolve::{
    file_name_of, is_external, relative_with_root, resolve_with_root, strip_file_scheme,
    MANAGED_DIR_NAME,
};

/// Fallback extension when the source filename carries none.
const DEFAULT_EXTENSION: &str = "jpg";

/// Error type for media library operations.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("failed to create media directory {dir}: {source}")]
    CreateDir {
        dir: String,
        source: std::io::Error,
    },
    #[error("failed to copy {path} into the media library: {source}")]
    Copy {
        path: String,
        source: std::io::Error,
    },
}

/// Owner of the managed `user_files` directory.
pub struct MediaLibrary {
    dir: Option<PathBuf>,
}

impl MediaLibrary {
    /// Create a library rooted under the given data directory.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: Some(data_dir.as_ref().join(MANAGED_DIR_NAME)),
        }
    }

    /// Create a rootless library for runtimes with no private filesystem.
    ///
    /// Every operation becomes a passthrough: values are stored and read
    /// verbatim and no files are copied or deleted.
    pub fn unavailable() -> Self {
        Self { dir: None }
    }

    /// The managed directory, if the runtime has one.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Map a stored value to an absolute path under the managed directory.
    pub fn resolve(&self, value: &str) -> String {
        match &self.dir {
            Some(dir) => resolve_with_root(dir, value),
            None => value.to_string(),
        }
    }

    /// Map a value to its at-rest form (bare filename for managed files).
    pub fn to_relative(&self, value: &str) -> String {
        match &self.dir {
            Some(dir) => relative_with_root(dir, value),
            None => value.to_string(),
        }
    }

    /// Copy a transient file into the managed directory.
    ///
    /// Returns the new bare filename. Re-saving a file that already lives in
    /// the managed directory returns its existing filename without copying.
    /// External URIs and empty values pass through unchanged. A failed copy
    /// propagates; callers must not touch persisted state in that case.
    pub fn save(&self, value: &str) -> Result<String, LibraryError> {
        let dir = match &self.dir {
            Some(dir) => dir,
            None => return Ok(value.to_string()),
        };

        if value.is_empty() || is_external(value) {
            return Ok(value.to_string());
        }

        let source = strip_file_scheme(value);
        if Path::new(source).starts_with(dir) {
            return Ok(file_name_of(source).to_string());
        }

        fs::create_dir_all(dir).map_err(|e| LibraryError::CreateDir {
            dir: dir.display().to_string(),
            source: e,
        })?;

        let name = unique_name(&extension_of(source));
        fs::copy(source, dir.join(&name)).map_err(|e| LibraryError::Copy {
            path: source.to_string(),
            source: e,
        })?;

        Ok(name)
    }

    /// Remove a managed file, best-effort.
    ///
    /// Accepts a bare filename or a full path. A missing file is not an
    /// error; removal failures are logged and swallowed so cleanup never
    /// blocks a logical delete.
    pub fn delete(&self, value: &str) {
        if self.dir.is_none() || value.is_empty() || is_external(value) {
            return;
        }

        let path = PathBuf::from(self.resolve(value));
        if !path.exists() {
            return;
        }

        if let Err(e) = fs::remove_file(&path) {
            log::warn!("failed to remove media file {}: {e}", path.display());
        }
    }
}

/// Derive a fresh managed filename: `<millis>-<base36 fragment>.<ext>`.
fn unique_name(extension: &str) -> String {
    format!(
        "{}-{}.{}",
        Utc::now().timestamp_millis(),
        base36_fragment(6),
        extension
    )
}

/// A short random base36 string.
pub(crate) fn base36_fragment(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| {
            char::from_digit(rng.gen_range(0..36), 36).unwrap_or('0')
        })
        .collect()
}

/// The source file's extension, lowercased, defaulting to `jpg`.
fn extension_of(path: &str) -> String {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

// ============================================================================
// TESTS
// ============================================================================

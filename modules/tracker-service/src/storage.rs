//! Byte-level backing for a single collection.
//!
//! A `RecordStore` never touches the filesystem directly; it talks to a
//! `Storage` handle. `FileStorage` is what the service runs on,
//! `MemoryStorage` is for tests and in-process embedding.

use crate::error::{StoreError, StoreResult};
use parking_lot::Mutex;
use std::io::ErrorKind;
use std::path::PathBuf;

pub trait Storage: Send + Sync {
    /// Whether any content has been written yet
    fn exists(&self) -> StoreResult<bool>;

    /// Full current content, or `None` if nothing has been written
    fn read(&self) -> StoreResult<Option<String>>;

    /// Replace the full content. Readers must observe either the old or the
    /// new content, never a mix.
    fn write(&self, contents: &str) -> StoreResult<()>;

    /// Human-readable location, for logs only
    fn describe(&self) -> String;
}

/// One JSON file on disk, replaced via temp file + rename.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Sibling temp file so the rename stays on one filesystem.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Storage for FileStorage {
    fn exists(&self) -> StoreResult<bool> {
        match std::fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::Io(format!(
                "Failed to stat '{}': {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn read(&self) -> StoreResult<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) if e.kind() == ErrorKind::InvalidData => Err(StoreError::Corrupt(format!(
                "'{}' is not valid UTF-8: {}",
                self.path.display(),
                e
            ))),
            Err(e) => Err(StoreError::Io(format!(
                "Failed to read '{}': {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn write(&self, contents: &str) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::Io(format!(
                        "Failed to create directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let temp_path = self.temp_path();
        std::fs::write(&temp_path, contents).map_err(|e| {
            StoreError::Io(format!(
                "Failed to write temp file '{}': {}",
                temp_path.display(),
                e
            ))
        })?;

        if let Err(e) = std::fs::rename(&temp_path, &self.path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(StoreError::Io(format!(
                "Failed to replace '{}': {}",
                self.path.display(),
                e
            )));
        }

        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory backing; content lives as long as the handle.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    contents: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
        }
    }
}

impl Storage for MemoryStorage {
    fn exists(&self) -> StoreResult<bool> {
        Ok(self.contents.lock().is_some())
    }

    fn read(&self) -> StoreResult<Option<String>> {
        Ok(self.contents.lock().clone())
    }

    fn write(&self, contents: &str) -> StoreResult<()> {
        *self.contents.lock() = Some(contents.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}

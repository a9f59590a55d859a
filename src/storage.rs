//! Whole-file text storage for localization files
//!
//! Localization files are read and written as complete UTF-8 documents; a
//! write replaces the previous content entirely. [`FsStorage`] talks to the
//! local filesystem, [`MemoryStorage`] keeps everything in a map for tests
//! and dry runs.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Errors raised by a [`Storage`] backend
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("file '{0}' not found")]
    NotFound(PathBuf),

    /// The file exists but is not UTF-8 text
    #[error("'{path}' is not valid UTF-8: {source}")]
    InvalidContent {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound(path.to_path_buf()),
            io::ErrorKind::InvalidData => StorageError::InvalidContent {
                path: path.to_path_buf(),
                source,
            },
            _ => StorageError::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}

/// Read/write access to localization files
pub trait Storage: Send + Sync {
    /// Read the whole file as UTF-8 text
    fn read(&self, path: &Path) -> Result<String, StorageError>;

    /// Replace the file content, creating the file if needed
    fn write(&self, path: &Path, content: &str) -> Result<(), StorageError>;

    /// Names of the immediate sub-directories of `path`, sorted
    fn list_directories(&self, path: &Path) -> Result<Vec<String>, StorageError>;
}

/// Storage on the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStorage;

impl Storage for FsStorage {
    fn read(&self, path: &Path) -> Result<String, StorageError> {
        fs::read_to_string(path).map_err(|e| StorageError::from_io(path, e))
    }

    fn write(&self, path: &Path, content: &str) -> Result<(), StorageError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StorageError::from_io(parent, e))?;
        }
        fs::write(path, content).map_err(|e| StorageError::from_io(path, e))
    }

    fn list_directories(&self, path: &Path) -> Result<Vec<String>, StorageError> {
        let entries = fs::read_dir(path).map_err(|e| StorageError::from_io(path, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::from_io(path, e))?;
            let is_dir = entry
                .file_type()
                .map_err(|e| StorageError::from_io(&entry.path(), e))?
                .is_dir();
            if is_dir {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// In-memory storage keyed by path
///
/// Directories are implied by the files stored below them. Every successful
/// write is also appended to a log, so callers can check what was written
/// and in which order.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: Mutex<BTreeMap<PathBuf, String>>,
    writes: Mutex<Vec<PathBuf>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`MemoryStorage::insert`]
    pub fn with_file(self, path: impl Into<PathBuf>, content: &str) -> Self {
        self.insert(path, content);
        self
    }

    /// Seed a file without recording it as a write
    pub fn insert(&self, path: impl Into<PathBuf>, content: &str) {
        if let Ok(mut files) = self.files.lock() {
            files.insert(path.into(), content.to_string());
        }
    }

    /// Current content of `path`, if any
    pub fn get(&self, path: &Path) -> Option<String> {
        self.files
            .lock()
            .ok()
            .and_then(|files| files.get(path).cloned())
    }

    /// Paths passed to [`Storage::write`], in call order
    pub fn writes(&self) -> Vec<PathBuf> {
        self.writes
            .lock()
            .map(|writes| writes.clone())
            .unwrap_or_default()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, path: &Path) -> Result<String, StorageError> {
        self.get(path)
            .ok_or_else(|| StorageError::NotFound(path.to_path_buf()))
    }

    fn write(&self, path: &Path, content: &str) -> Result<(), StorageError> {
        self.insert(path, content);
        if let Ok(mut writes) = self.writes.lock() {
            writes.push(path.to_path_buf());
        }
        Ok(())
    }

    fn list_directories(&self, path: &Path) -> Result<Vec<String>, StorageError> {
        let files = self.files.lock().map_err(|_| StorageError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("storage lock poisoned"),
        })?;

        let mut names: Vec<String> = files
            .keys()
            .filter_map(|file| file.strip_prefix(path).ok())
            .filter(|relative| relative.components().count() > 1)
            .filter_map(|relative| relative.components().next())
            .map(|first| first.as_os_str().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names.dedup();

        if names.is_empty() {
            return Err(StorageError::NotFound(path.to_path_buf()));
        }
        Ok(names)
    }
}

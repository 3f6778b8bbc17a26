//! Where preset and settings documents live.
//!
//! The catalog and settings loaders only see whole text documents; this
//! module decides whether that text comes from disk or from memory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// A single text document that can be read back and replaced.
pub trait TextStorage {
    /// `Ok(None)` when the document does not exist yet.
    fn read(&self) -> Result<Option<String>, StorageError>;

    /// Replace the whole document.
    fn write(&mut self, contents: &str) -> Result<(), StorageError>;

    /// Human-readable location, for log lines.
    fn describe(&self) -> String;
}

/// Document stored in a file on disk
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TextStorage for FileStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    fn write(&mut self, contents: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, contents)?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Document held in memory; handy for tests and embedding hosts
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    contents: Option<String>,
    writes: usize,
}

impl MemoryStorage {
    /// Storage with no document yet
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Some(contents.into()),
            writes: 0,
        }
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }

    /// How many times the document was replaced
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl TextStorage for MemoryStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        Ok(self.contents.clone())
    }

    fn write(&mut self, contents: &str) -> Result<(), StorageError> {
        self.contents = Some(contents.to_string());
        self.writes += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_missing_then_written() {
        let dir = std::env::temp_dir().join(format!("dmtx_rescue_storage_{}", std::process::id()));
        let path = dir.join("nested").join("doc.ini");
        let mut storage = FileStorage::new(&path);
        assert!(storage.read().unwrap().is_none());

        storage.write("[A]\nk = v\n").unwrap();
        assert_eq!(storage.read().unwrap().as_deref(), Some("[A]\nk = v\n"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_memory_storage_counts_writes() {
        let mut storage = MemoryStorage::empty();
        assert!(storage.read().unwrap().is_none());
        storage.write("x").unwrap();
        storage.write("y").unwrap();
        assert_eq!(storage.contents(), Some("y"));
        assert_eq!(storage.writes(), 2);
    }
}

//! Configuration source abstraction.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// Something a [`SourceWatcher`](super::SourceWatcher) can read raw
/// configuration bytes from.
pub trait ConfigSource: Send + Sync + 'static {
    /// Human readable identifier used in logs and status output.
    fn name(&self) -> &str;

    /// Read the full current contents.
    fn read(&self) -> io::Result<Vec<u8>>;
}

/// A source backed by a file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    name: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }
}

/// An in-memory source whose contents can be replaced at runtime.
///
/// Reads fail with `NotFound` until contents are set.
#[derive(Debug)]
pub struct MemorySource {
    name: String,
    content: RwLock<Option<Vec<u8>>>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: RwLock::new(None),
        }
    }

    pub fn with_content(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        let source = Self::new(name);
        source.set(content);
        source
    }

    /// Replace the contents.
    pub fn set(&self, content: impl Into<Vec<u8>>) {
        *self.content.write().unwrap_or_else(PoisonError::into_inner) = Some(content.into());
    }

    /// Make subsequent reads fail as if the source were deleted.
    pub fn remove(&self) {
        *self.content.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl ConfigSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> io::Result<Vec<u8>> {
        self.content
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{} does not exist", self.name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_lifecycle() {
        let source = MemorySource::new("mem");
        assert_eq!(source.read().unwrap_err().kind(), io::ErrorKind::NotFound);

        source.set("a: b");
        assert_eq!(source.read().unwrap(), b"a: b");

        source.remove();
        assert!(source.read().is_err());
    }

    #[test]
    fn test_file_source_reads_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apollo.yaml");
        let source = FileSource::new(&path);

        assert!(source.read().is_err());
        std::fs::write(&path, "x: y").unwrap();
        assert_eq!(source.read().unwrap(), b"x: y");
        assert_eq!(source.name(), path.display().to_string());
    }
}

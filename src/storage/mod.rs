// src/storage/mod.rs - Host filesystem storage standing in for the SD card
pub mod file;
pub mod log_sink;

pub use file::MockFile;
pub use log_sink::FileLogSink;

use std::fs;
use std::path::PathBuf;

use astra_shared::Storage;

/// Storage backed by the host filesystem.
///
/// Filenames are used as-is unless a root is set, in which case relative
/// names resolve under it. `begin`/`end` always succeed.
#[derive(Debug, Clone, Default)]
pub struct MockStorage {
    root: Option<PathBuf>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    pub fn resolve(&self, filename: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(filename.trim_start_matches('/')),
            None => PathBuf::from(filename),
        }
    }
}

impl Storage for MockStorage {
    type File = MockFile;

    fn begin(&mut self) -> bool {
        tracing::debug!("MockStorage begin (root: {:?})", self.root);
        true
    }

    fn end(&mut self) -> bool {
        true
    }

    fn ok(&self) -> bool {
        true
    }

    fn open_read(&mut self, filename: &str) -> MockFile {
        MockFile::open_read(&self.resolve(filename))
    }

    fn open_write(&mut self, filename: &str, append: bool) -> MockFile {
        MockFile::open_write(&self.resolve(filename), append)
    }

    fn exists(&self, filename: &str) -> bool {
        self.resolve(filename).is_file()
    }

    fn remove(&mut self, filename: &str) -> bool {
        fs::remove_file(self.resolve(filename)).is_ok()
    }

    fn mkdir(&mut self, path: &str) -> bool {
        let dir = self.resolve(path);
        match fs::create_dir_all(&dir) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("mkdir {} failed: {}", dir.display(), e);
                false
            }
        }
    }

    fn rmdir(&mut self, path: &str) -> bool {
        let dir = self.resolve(path);
        match fs::remove_dir(&dir) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("rmdir {} failed: {}", dir.display(), e);
                false
            }
        }
    }
}

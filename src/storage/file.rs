// src/storage/file.rs - File handle on the host filesystem
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use astra_shared::StorageFile;

/// A possibly-unopened file. Every operation on a handle that failed to open,
/// or has been closed, returns 0/false/None.
#[derive(Debug)]
pub struct MockFile {
    file: Option<File>,
}

impl MockFile {
    pub fn open_read(path: &Path) -> Self {
        Self::from_result(path, File::open(path))
    }

    /// Create if missing; `append` keeps existing content, otherwise truncate.
    pub fn open_write(path: &Path, append: bool) -> Self {
        let mut options = OpenOptions::new();
        options.create(true);
        if append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }
        Self::from_result(path, options.open(path))
    }

    fn from_result(path: &Path, result: std::io::Result<File>) -> Self {
        match result {
            Ok(file) => Self { file: Some(file) },
            Err(e) => {
                tracing::debug!("open {} failed: {}", path.display(), e);
                Self { file: None }
            }
        }
    }

    fn len(file: &File) -> u64 {
        file.metadata().map(|m| m.len()).unwrap_or(0)
    }
}

impl StorageFile for MockFile {
    fn write_byte(&mut self, b: u8) -> usize {
        self.write(&[b])
    }

    fn write(&mut self, data: &[u8]) -> usize {
        let Some(file) = self.file.as_mut() else {
            return 0;
        };
        match file.write_all(data) {
            Ok(()) => data.len(),
            Err(e) => {
                tracing::warn!("file write failed: {}", e);
                0
            }
        }
    }

    fn flush(&mut self) -> bool {
        self.file.as_mut().is_some_and(|f| f.flush().is_ok())
    }

    fn read_byte(&mut self) -> Option<u8> {
        let mut b = [0u8; 1];
        match self.read_bytes(&mut b) {
            1 => Some(b[0]),
            _ => None,
        }
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> usize {
        let Some(file) = self.file.as_mut() else {
            return 0;
        };
        let mut filled = 0;
        while filled < buf.len() {
            match file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
        filled
    }

    fn available(&mut self) -> u64 {
        let Some(file) = self.file.as_mut() else {
            return 0;
        };
        let pos = file.stream_position().unwrap_or(0);
        Self::len(file).saturating_sub(pos)
    }

    fn seek(&mut self, pos: u64) -> bool {
        self.file
            .as_mut()
            .is_some_and(|f| f.seek(SeekFrom::Start(pos)).is_ok())
    }

    fn position(&mut self) -> u64 {
        self.file
            .as_mut()
            .and_then(|f| f.stream_position().ok())
            .unwrap_or(0)
    }

    fn size(&mut self) -> u64 {
        self.file.as_ref().map(Self::len).unwrap_or(0)
    }

    fn close(&mut self) -> bool {
        match self.file.take() {
            Some(mut file) => file.flush().is_ok(),
            None => false,
        }
    }

    fn is_open(&self) -> bool {
        self.file.is_some()
    }
}

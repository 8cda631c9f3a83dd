// src/storage/log_sink.rs - Flight data log written to a host file
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use astra_shared::LogSink;

use crate::error::HarnessError;

const BUFFER_CAPACITY: usize = 256 * 1024;

/// Appends logger output to a file. The file is opened by `begin` and closed
/// by `end` or drop.
#[derive(Debug)]
pub struct FileLogSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    write_failed: bool,
}

impl FileLogSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
            write_failed: false,
        }
    }

    /// Create and `begin` in one step, reporting why the file could not be opened.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, HarnessError> {
        let mut sink = Self::new(path);
        sink.writer = Some(sink.open_file()?);
        Ok(sink)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_file(&self) -> Result<BufWriter<File>, HarnessError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| HarnessError::Storage {
                path: self.path.display().to_string(),
                source,
            })?;
        Ok(BufWriter::with_capacity(BUFFER_CAPACITY, file))
    }

    fn record(&mut self, result: std::io::Result<()>, len: usize) -> usize {
        match result {
            Ok(()) => len,
            Err(e) => {
                tracing::error!("log sink {} write failed: {}", self.path.display(), e);
                self.write_failed = true;
                0
            }
        }
    }
}

impl LogSink for FileLogSink {
    fn begin(&mut self) -> bool {
        match self.open_file() {
            Ok(writer) => {
                self.writer = Some(writer);
                self.write_failed = false;
                true
            }
            Err(e) => {
                tracing::warn!("{}", e);
                self.writer = None;
                false
            }
        }
    }

    fn end(&mut self) -> bool {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.flush() {
                tracing::warn!("log sink {} flush on close failed: {}", self.path.display(), e);
            }
        }
        true
    }

    fn ok(&self) -> bool {
        self.writer.is_some() && !self.write_failed
    }

    fn wants_prefix(&self) -> bool {
        false
    }

    fn flush(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            let result = writer.flush();
            self.record(result, 0);
        }
    }

    fn write_byte(&mut self, b: u8) -> usize {
        self.write(&[b])
    }

    fn write(&mut self, data: &[u8]) -> usize {
        let Some(writer) = self.writer.as_mut() else {
            return 0;
        };
        let result = writer.write_all(data);
        self.record(result, data.len())
    }
}

impl Drop for FileLogSink {
    fn drop(&mut self) {
        self.end();
    }
}

// Storage and log-sink capabilities the firmware records flight data through

/// An open file on a storage backend.
///
/// Mirrors the firmware's file handle: operations on a handle that failed to
/// open (or was closed) return `0`, `false`, or `None` rather than erroring.
pub trait StorageFile {
    fn write_byte(&mut self, b: u8) -> usize;
    fn write(&mut self, data: &[u8]) -> usize;
    fn flush(&mut self) -> bool;
    fn read_byte(&mut self) -> Option<u8>;
    fn read_bytes(&mut self, buf: &mut [u8]) -> usize;
    /// Bytes between the current position and the end of the file.
    fn available(&mut self) -> u64;
    fn seek(&mut self, pos: u64) -> bool;
    fn position(&mut self) -> u64;
    fn size(&mut self) -> u64;
    fn close(&mut self) -> bool;
    fn is_open(&self) -> bool;
}

/// A storage device (SD card, flash) holding named files.
pub trait Storage {
    type File: StorageFile;

    fn begin(&mut self) -> bool;
    fn end(&mut self) -> bool;
    fn ok(&self) -> bool;
    fn open_read(&mut self, filename: &str) -> Self::File;
    fn open_write(&mut self, filename: &str, append: bool) -> Self::File;
    fn exists(&self, filename: &str) -> bool;
    fn remove(&mut self, filename: &str) -> bool;
    fn mkdir(&mut self, path: &str) -> bool;
    fn rmdir(&mut self, path: &str) -> bool;
}

/// Destination for the firmware's data logger.
pub trait LogSink {
    fn begin(&mut self) -> bool;
    fn end(&mut self) -> bool;
    fn ok(&self) -> bool;
    /// Whether the logger should prepend its record prefix for this sink.
    fn wants_prefix(&self) -> bool;
    fn flush(&mut self);
    fn write_byte(&mut self, b: u8) -> usize;
    fn write(&mut self, data: &[u8]) -> usize;
}

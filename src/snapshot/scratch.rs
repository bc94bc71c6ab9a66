//! snapshot/scratch - local copy of state.bin made during extraction.
//!
//! Хранится в памяти до `spool_mem_bytes`, дальше переливается во временный файл
//! (tempfile::SpooledTempFile). Файл удаляется при drop на любом пути выхода.

use std::fmt;
use std::io::{self, Read, Seek, SeekFrom, Write};
use tempfile::SpooledTempFile;

/// Re-readable scratch copy of the payload member. Owned by one stage at a time.
pub struct ScratchPayload {
    spool: SpooledTempFile,
    len: u64,
}

impl ScratchPayload {
    pub fn new(spool_mem_bytes: usize) -> Self {
        Self {
            spool: SpooledTempFile::new(spool_mem_bytes),
            len: 0,
        }
    }

    /// Bytes written so far.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True once the copy no longer fits in memory and lives in a temp file.
    pub fn is_on_disk(&self) -> bool {
        self.spool.is_rolled()
    }

    /// Move the read position back to the first byte.
    pub fn rewind(&mut self) -> io::Result<()> {
        self.spool.seek(SeekFrom::Start(0)).map(|_| ())
    }

    /// Rewind and return a reader positioned at the first byte.
    pub fn reader(&mut self) -> io::Result<&mut ScratchPayload> {
        self.rewind()?;
        Ok(self)
    }
}

impl fmt::Debug for ScratchPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScratchPayload")
            .field("len", &self.len)
            .field("on_disk", &self.is_on_disk())
            .finish()
    }
}

impl Write for ScratchPayload {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.spool.write(buf)?;
        self.len += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.spool.flush()
    }
}

impl Read for ScratchPayload {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.spool.read(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reread_from_start() {
        let mut s = ScratchPayload::new(1024);
        s.write_all(b"hello world").unwrap();
        assert_eq!(s.len(), 11);
        assert!(!s.is_on_disk());

        for _ in 0..2 {
            let mut out = String::new();
            s.reader().unwrap().read_to_string(&mut out).unwrap();
            assert_eq!(out, "hello world");
        }
    }

    #[test]
    fn rolls_over_to_disk() {
        let mut s = ScratchPayload::new(8);
        s.write_all(&[7u8; 64]).unwrap();
        assert!(s.is_on_disk());
        let mut out = Vec::new();
        s.reader().unwrap().read_to_end(&mut out).unwrap();
        assert_eq!(out, vec![7u8; 64]);
    }
}

//! File abstraction for volume data files.
//!
//! The lifecycle only needs a handful of operations beyond `Read + Write +
//! Seek`: a size query, the file's identity for diagnostics, and the
//! recreate operation used by the permission-recovery path. Keeping them
//! behind a trait lets tests drive the recovery state machine with a
//! scripted in-memory double instead of real filesystem permissions.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Backing file of a volume.
pub trait DataFile: Read + Write + Seek {
    /// Identity of the file, used in error context and logging.
    fn path(&self) -> &Path;

    /// Current size in bytes.
    fn size(&self) -> io::Result<u64>;

    /// Reopen the file at the same path with open-or-create semantics,
    /// truncating it. Used only by the permission-recovery path, where the
    /// existing handle is presumed stale.
    fn recreate(&mut self) -> io::Result<()>;
}

/// `std::fs::File`-backed volume data file.
#[derive(Debug)]
pub struct DiskFile {
    path: PathBuf,
    file: File,
}

impl DiskFile {
    /// Open or create the data file at `path` for reading and writing.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;
        Ok(DiskFile { path, file })
    }

    /// Open the data file read-only. Writes through this handle will fail;
    /// for empty files the lifecycle's recovery path can recreate the
    /// handle writable.
    pub fn open_read_only(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file = File::open(&path)?;
        Ok(DiskFile { path, file })
    }
}

impl DataFile for DiskFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    fn recreate(&mut self) -> io::Result<()> {
        // Read stays enabled: the super block is re-read through this
        // handle right after a successful recovery.
        self.file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)?;
        Ok(())
    }
}

impl Read for DiskFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for DiskFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Seek for DiskFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

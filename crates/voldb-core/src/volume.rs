//! Volume lifecycle.
//!
//! Opening a volume either materializes its super block (empty file) or
//! loads the existing one. The on-disk header is authoritative: after any
//! write the in-memory value is rebuilt from the file's leading bytes.

use crate::data_file::DataFile;
use crate::super_block::{read_super_block, SuperBlock};
use std::io::{ErrorKind, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::{info, instrument, warn};
use voldb_types::{Version, VolumeError};

/// A storage volume backed by a single data file.
#[derive(Debug)]
pub struct Volume<F: DataFile> {
    data_file: F,
    super_block: SuperBlock,
    read_only: bool,
}

impl<F: DataFile> Volume<F> {
    /// Open a volume, ensuring its super block exists.
    ///
    /// If the data file is empty, `super_block` is written as the fresh
    /// header with its version pinned to [`Version::CURRENT`]; otherwise it
    /// serves only as a template and the on-disk header wins. `read_only`
    /// is the caller's current writability status for this volume; the
    /// permission-recovery path clears it when recovery succeeds.
    #[instrument(skip_all, fields(volume = %data_file.path().display()))]
    pub fn open(
        mut data_file: F,
        mut super_block: SuperBlock,
        mut read_only: bool,
    ) -> Result<Self, VolumeError> {
        maybe_write_super_block(&mut data_file, &mut super_block, &mut read_only)?;
        let path = data_file.path().to_path_buf();
        let super_block = read_super_block(&mut data_file, &path)?;
        Ok(Volume {
            data_file,
            super_block,
            read_only,
        })
    }

    pub fn super_block(&self) -> &SuperBlock {
        &self.super_block
    }

    pub fn version(&self) -> Version {
        self.super_block.version()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn path(&self) -> &Path {
        self.data_file.path()
    }

    /// Offset at which data blocks begin: the super block's total length.
    pub fn data_offset(&self) -> Result<u64, VolumeError> {
        self.super_block.block_size().map(|size| size as u64)
    }
}

/// Write a fresh super block into `data_file` if it is empty; leave a
/// non-empty file untouched.
///
/// A `PermissionDenied` write on a file known to be zero-length is treated
/// as a stale or incorrectly-opened handle rather than a genuinely
/// unwritable filesystem: the handle is recreated at the same path and the
/// write retried once, clearing `read_only` on success. If recreation or
/// the retry fails, that final error propagates and `read_only` is left
/// untouched. Every other failure propagates directly.
#[instrument(skip_all, fields(volume = %data_file.path().display()))]
pub fn maybe_write_super_block<F: DataFile>(
    data_file: &mut F,
    super_block: &mut SuperBlock,
    read_only: &mut bool,
) -> Result<(), VolumeError> {
    let path = data_file.path().to_path_buf();
    let size = data_file.size().map_err(|e| {
        warn!("failed to stat data file {}: {}", path.display(), e);
        VolumeError::io(&path, format!("cannot stat data file: {e}"))
    })?;
    if size != 0 {
        return Ok(());
    }

    super_block.version = Version::CURRENT;
    let bytes = super_block.bytes()?;
    if let Err(e) = write_at_start(data_file, &bytes) {
        if e.kind() != ErrorKind::PermissionDenied {
            return Err(VolumeError::io(
                &path,
                format!("cannot write super block: {e}"),
            ));
        }
        warn!(
            "permission denied writing super block to empty volume {}, recreating",
            path.display()
        );
        data_file.recreate().map_err(|e| {
            VolumeError::io(&path, format!("cannot recreate data file: {e}"))
        })?;
        write_at_start(data_file, &bytes).map_err(|e| {
            VolumeError::io(
                &path,
                format!("cannot write super block after recreate: {e}"),
            )
        })?;
        *read_only = false;
        info!(
            "recovered volume {}: super block written through recreated handle",
            path.display()
        );
    }
    Ok(())
}

fn write_at_start<F: DataFile>(data_file: &mut F, bytes: &[u8]) -> std::io::Result<()> {
    data_file.seek(SeekFrom::Start(0))?;
    data_file.write_all(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io::{self, Cursor, Read};
    use std::path::PathBuf;
    use voldb_types::Ttl;

    /// Scripted in-memory data file for driving the recovery state machine.
    #[derive(Debug)]
    struct MockFile {
        path: PathBuf,
        cursor: Cursor<Vec<u8>>,
        write_errors: VecDeque<io::ErrorKind>,
        size_error: Option<io::ErrorKind>,
        recreate_error: Option<io::ErrorKind>,
        writes_attempted: usize,
        recreated: bool,
    }

    impl MockFile {
        fn empty() -> Self {
            Self::with_contents(Vec::new())
        }

        fn with_contents(data: Vec<u8>) -> Self {
            MockFile {
                path: PathBuf::from("7.dat"),
                cursor: Cursor::new(data),
                write_errors: VecDeque::new(),
                size_error: None,
                recreate_error: None,
                writes_attempted: 0,
                recreated: false,
            }
        }

        fn failing_writes(mut self, kinds: impl IntoIterator<Item = io::ErrorKind>) -> Self {
            self.write_errors = kinds.into_iter().collect();
            self
        }

        fn contents(&self) -> &[u8] {
            self.cursor.get_ref()
        }
    }

    impl Read for MockFile {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.cursor.read(buf)
        }
    }

    impl Write for MockFile {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.writes_attempted += 1;
            if let Some(kind) = self.write_errors.pop_front() {
                return Err(kind.into());
            }
            self.cursor.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Seek for MockFile {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.cursor.seek(pos)
        }
    }

    impl DataFile for MockFile {
        fn path(&self) -> &Path {
            &self.path
        }

        fn size(&self) -> io::Result<u64> {
            if let Some(kind) = self.size_error {
                return Err(kind.into());
            }
            Ok(self.cursor.get_ref().len() as u64)
        }

        fn recreate(&mut self) -> io::Result<()> {
            if let Some(kind) = self.recreate_error {
                return Err(kind.into());
            }
            self.recreated = true;
            self.cursor = Cursor::new(Vec::new());
            Ok(())
        }
    }

    fn template() -> SuperBlock {
        SuperBlock::new(
            Version::V2,
            "010".parse().unwrap(),
            "3d".parse().unwrap(),
        )
    }

    #[test]
    fn fresh_file_gets_current_version_header() {
        let volume = Volume::open(MockFile::empty(), template(), false).unwrap();

        let mut expected = template();
        expected.version = Version::CURRENT;
        assert_eq!(volume.super_block(), &expected);
        assert_eq!(volume.version(), Version::CURRENT);
        assert_eq!(volume.data_offset().unwrap(), 8);
        assert_eq!(
            volume.data_file.contents(),
            expected.bytes().unwrap().as_slice()
        );
    }

    #[test]
    fn existing_file_is_left_untouched_and_wins() {
        let mut on_disk = SuperBlock::new(Version::V2, "001".parse().unwrap(), Ttl::NONE);
        on_disk.compact_revision = 9;
        let bytes = on_disk.bytes().unwrap();

        let volume = Volume::open(MockFile::with_contents(bytes.clone()), template(), false)
            .unwrap();

        assert_eq!(volume.data_file.writes_attempted, 0);
        assert_eq!(volume.data_file.contents(), bytes.as_slice());
        // The on-disk header is authoritative, not the template.
        assert_eq!(volume.super_block(), &on_disk);
    }

    #[test]
    fn permission_denied_on_empty_file_recreates_and_retries() {
        let file = MockFile::empty().failing_writes([io::ErrorKind::PermissionDenied]);
        let volume = Volume::open(file, template(), true).unwrap();

        assert!(volume.data_file.recreated);
        assert!(!volume.is_read_only());
        let mut expected = template();
        expected.version = Version::CURRENT;
        assert_eq!(
            volume.data_file.contents(),
            expected.bytes().unwrap().as_slice()
        );
    }

    #[test]
    fn recovery_retry_failure_propagates_and_keeps_read_only() {
        let mut file = MockFile::empty().failing_writes([
            io::ErrorKind::PermissionDenied,
            io::ErrorKind::PermissionDenied,
        ]);
        let mut super_block = template();
        let mut read_only = true;

        let err = maybe_write_super_block(&mut file, &mut super_block, &mut read_only)
            .unwrap_err();

        assert!(matches!(err, VolumeError::Io { .. }));
        assert!(read_only, "read-only status must be left untouched");
        assert!(file.recreated);
    }

    #[test]
    fn recreate_failure_propagates_and_keeps_read_only() {
        let mut file = MockFile::empty().failing_writes([io::ErrorKind::PermissionDenied]);
        file.recreate_error = Some(io::ErrorKind::NotFound);
        let mut super_block = template();
        let mut read_only = true;

        let err = maybe_write_super_block(&mut file, &mut super_block, &mut read_only)
            .unwrap_err();

        assert!(matches!(err, VolumeError::Io { .. }));
        assert!(read_only);
    }

    #[test]
    fn non_permission_write_error_skips_recovery() {
        let mut file = MockFile::empty().failing_writes([io::ErrorKind::WriteZero]);
        let mut super_block = template();
        let mut read_only = false;

        let err = maybe_write_super_block(&mut file, &mut super_block, &mut read_only)
            .unwrap_err();

        assert!(matches!(err, VolumeError::Io { .. }));
        assert!(!file.recreated);
    }

    #[test]
    fn size_query_failure_prevents_any_write() {
        let mut file = MockFile::empty();
        file.size_error = Some(io::ErrorKind::Other);
        let mut super_block = template();
        let mut read_only = false;

        let err = maybe_write_super_block(&mut file, &mut super_block, &mut read_only)
            .unwrap_err();

        assert!(matches!(err, VolumeError::Io { .. }));
        assert_eq!(file.writes_attempted, 0);
    }

    #[test]
    fn truncated_existing_file_fails_to_decode() {
        // Non-empty but shorter than the fixed region: no write happens and
        // the load reports a truncated super block.
        let err = Volume::open(MockFile::with_contents(vec![0x02, 0x00, 0x00]), template(), false)
            .unwrap_err();
        assert!(matches!(err, VolumeError::Io { .. }));
    }
}

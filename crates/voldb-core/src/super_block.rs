//! Super block codec.
//!
//! The super block is the byte region at offset 0 of a volume data file:
//!
//! * Byte 0: format version
//! * Byte 1: replica placement, decimal-packed
//! * Bytes 2-3: TTL as `[count, unit]`
//! * Bytes 4-5: compaction revision, big-endian u16
//! * Bytes 6-7: extension length, big-endian u16 (zero when absent)
//! * Bytes 8..: bincode extension message, only when the length is non-zero
//!
//! Version 1 has no extension region; data blocks start at byte 8
//! regardless of the length bytes. Every reader and writer of a volume
//! must agree on this layout, so the codec round-trips byte-exactly and
//! refuses to produce any header it could not parse back.

use crate::extension::VolumeExtension;
use bytes::BufMut;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use voldb_types::{ReplicaPlacement, Ttl, Version, VolumeError};

/// Size of the fixed super block region.
pub const SUPER_BLOCK_SIZE: usize = 8;

/// Largest serialized extension the length field will carry. The top two
/// u16 codepoints are reserved for future growth of the extension
/// mechanism.
pub const MAX_EXTENSION_LEN: usize = u16::MAX as usize - 1;

/// In-memory super block of a volume.
///
/// The extension length is never cached: it is derived from the serialized
/// extension at encode time, every time, so it cannot drift from the
/// payload that is actually written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuperBlock {
    pub(crate) version: Version,
    pub replica_placement: ReplicaPlacement,
    pub ttl: Ttl,
    pub compact_revision: u16,
    pub extension: Option<VolumeExtension>,
}

impl SuperBlock {
    pub fn new(version: Version, replica_placement: ReplicaPlacement, ttl: Ttl) -> Self {
        SuperBlock {
            version,
            replica_placement,
            ttl,
            compact_revision: 0,
            extension: None,
        }
    }

    pub fn with_extension(mut self, extension: VolumeExtension) -> Self {
        self.extension = Some(extension);
        self
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Total header length: data blocks start at this offset.
    pub fn block_size(&self) -> Result<usize, VolumeError> {
        Ok(SUPER_BLOCK_SIZE + self.encoded_extension()?.map_or(0, |d| d.len()))
    }

    /// Encode into the exact byte sequence stored at offset 0.
    ///
    /// Any version byte is encoded as-is; only the extension region
    /// branches on the version. Fails with [`VolumeError::ExtensionTooLarge`]
    /// or [`VolumeError::ExtensionEncode`] before producing any bytes, so a
    /// header that cannot be losslessly parsed back is never written.
    pub fn bytes(&self) -> Result<Vec<u8>, VolumeError> {
        let extension = self.encoded_extension()?;
        let mut header =
            Vec::with_capacity(SUPER_BLOCK_SIZE + extension.as_ref().map_or(0, Vec::len));
        header.put_u8(self.version.as_u8());
        header.put_u8(self.replica_placement.as_byte());
        header.extend_from_slice(&self.ttl.to_bytes());
        header.put_u16(self.compact_revision);
        match &extension {
            Some(data) => {
                header.put_u16(data.len() as u16);
                header.extend_from_slice(data);
            }
            None => header.put_u16(0),
        }
        Ok(header)
    }

    fn encoded_extension(&self) -> Result<Option<Vec<u8>>, VolumeError> {
        if !self.version.has_extension_region() {
            return Ok(None);
        }
        let extension = match &self.extension {
            Some(extension) => extension,
            None => return Ok(None),
        };
        let data = extension.to_bytes()?;
        if data.len() > MAX_EXTENSION_LEN {
            return Err(VolumeError::ExtensionTooLarge {
                len: data.len(),
                max: MAX_EXTENSION_LEN,
            });
        }
        Ok(Some(data))
    }
}

impl Default for SuperBlock {
    fn default() -> Self {
        SuperBlock::new(
            Version::CURRENT,
            ReplicaPlacement::default(),
            Ttl::NONE,
        )
    }
}

/// Decode the super block at the start of a volume file.
///
/// Seeks to offset 0 and reads exactly [`SUPER_BLOCK_SIZE`] bytes; when the
/// length field is non-zero and the version has an extension region, reads
/// exactly that many further bytes and hands them to the extension codec.
/// Any failure aborts the decode with the volume path attached; no partial
/// super block is returned.
pub fn read_super_block<R: Read + Seek>(
    reader: &mut R,
    path: &Path,
) -> Result<SuperBlock, VolumeError> {
    reader
        .seek(SeekFrom::Start(0))
        .map_err(|e| VolumeError::io(path, format!("cannot seek to the beginning: {e}")))?;
    let mut header = [0u8; SUPER_BLOCK_SIZE];
    reader
        .read_exact(&mut header)
        .map_err(|e| VolumeError::io(path, format!("cannot read super block: {e}")))?;

    let version = Version::from(header[0]);
    let replica_placement = ReplicaPlacement::from_byte(header[1])?;
    let ttl = Ttl::from_bytes([header[2], header[3]]);
    let compact_revision = u16::from_be_bytes([header[4], header[5]]);
    let extension_len = u16::from_be_bytes([header[6], header[7]]);

    let extension = if extension_len > 0 && version.has_extension_region() {
        let mut data = vec![0u8; extension_len as usize];
        reader.read_exact(&mut data).map_err(|e| {
            VolumeError::io(
                path,
                format!("cannot read super block extension of {extension_len} bytes: {e}"),
            )
        })?;
        let message = VolumeExtension::from_bytes(&data).map_err(|e| {
            VolumeError::ExtensionDecode {
                path: path.display().to_string(),
                detail: e.to_string(),
            }
        })?;
        Some(message)
    } else {
        None
    };

    Ok(SuperBlock {
        version,
        replica_placement,
        ttl,
        compact_revision,
        extension,
    })
}

use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Centralized error type for volume operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VolumeError {
    #[error("I/O error on volume {path}: {detail}")]
    Io { path: String, detail: String },

    #[error("cannot read replica placement: {0}")]
    ReplicaPlacement(#[from] ReplicaPlacementError),

    #[error("super block extension is {len} bytes, larger than the {max} byte limit")]
    ExtensionTooLarge { len: usize, max: usize },

    #[error("cannot encode super block extension: {0}")]
    ExtensionEncode(String),

    #[error("cannot decode super block extension of volume {path}: {detail}")]
    ExtensionDecode { path: String, detail: String },
}

impl VolumeError {
    /// I/O failure tagged with the volume file it occurred on.
    pub fn io(path: &Path, detail: impl fmt::Display) -> Self {
        VolumeError::Io {
            path: path.display().to_string(),
            detail: detail.to_string(),
        }
    }
}

/// Replica placement codec errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplicaPlacementError {
    #[error("unknown replica placement byte: {0:#04x}")]
    UnknownByte(u8),

    #[error("invalid replica placement string: {0:?}")]
    InvalidString(String),
}

/// TTL string parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TtlError {
    #[error("invalid ttl: {0:?}")]
    InvalidString(String),

    #[error("unknown ttl unit: {0:?}")]
    UnknownUnit(String),
}

//! Optional super block extension message.
//!
//! The extension carries forward-compatible volume metadata that does not
//! fit the fixed 8-byte region. It is serialized with bincode and stored
//! length-prefixed immediately after the fixed region.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use voldb_types::VolumeError;

/// Erasure coding layout of a volume, when it has been EC-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErasureCodingInfo {
    pub data_shards: u32,
    pub parity_shards: u32,
    /// Volume ids whose shards share this layout.
    pub volume_ids: Vec<u32>,
}

/// Variable-length metadata appended after the fixed super block region.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VolumeExtension {
    pub erasure_coding: Option<ErasureCodingInfo>,
    /// Free-form metadata for future growth.
    pub attributes: BTreeMap<String, String>,
}

impl VolumeExtension {
    /// Serialize for the on-disk extension region.
    pub fn to_bytes(&self) -> Result<Vec<u8>, VolumeError> {
        bincode::serialize(self).map_err(|e| VolumeError::ExtensionEncode(e.to_string()))
    }

    /// Deserialize the extension region. The caller attaches file context.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}

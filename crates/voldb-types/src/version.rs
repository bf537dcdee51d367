use serde::{Deserialize, Serialize};
use std::fmt;

/// On-disk format version of a volume data file.
///
/// Stored as a raw byte at offset 0 of the super block. Unknown values are
/// preserved as-is; only layout behavior branches on the known versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version(u8);

impl Version {
    pub const V1: Version = Version(1);
    pub const V2: Version = Version(2);
    pub const V3: Version = Version(3);

    /// Version written for newly created volumes.
    pub const CURRENT: Version = Version::V3;

    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// Whether this version stores the variable-length extension region
    /// after the 8-byte fixed region. Version 1 never does, regardless of
    /// the extension length bytes.
    pub const fn has_extension_region(self) -> bool {
        self.0 != 1
    }
}

impl From<u8> for Version {
    fn from(b: u8) -> Self {
        Version(b)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//! # voldb-core
//!
//! Volume storage internals for VolDb.
//!
//! A volume is a single data file whose first bytes are a super block:
//! format version, replica placement, TTL, compaction revision, and an
//! optional variable-length extension. This crate owns the byte-exact
//! super block codec and the open-time lifecycle that writes a fresh
//! super block into an empty file or loads the existing one.

pub mod data_file;
pub mod extension;
pub mod super_block;
pub mod volume;

pub use data_file::{DataFile, DiskFile};
pub use extension::{ErasureCodingInfo, VolumeExtension};
pub use super_block::{read_super_block, SuperBlock, MAX_EXTENSION_LEN, SUPER_BLOCK_SIZE};
pub use volume::{maybe_write_super_block, Volume};

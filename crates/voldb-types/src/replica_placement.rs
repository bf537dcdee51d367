//! Replica placement policy and its 1-byte codec.
//!
//! A placement is three copy counts packed into one decimal byte, written
//! in the super block at offset 1. The string form is three digits, e.g.
//! "010" means one extra copy on a different rack in the same data center.

use crate::error::ReplicaPlacementError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum extra copies per failure domain.
const MAX_COUNT: u8 = 2;

/// How a volume's data is replicated across failure domains.
///
/// Byte form: `100 * diff_data_center_count + 10 * diff_rack_count +
/// same_rack_count`. Any byte whose decimal digits exceed the supported
/// copy counts is rejected on decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReplicaPlacement {
    pub same_rack_count: u8,
    pub diff_rack_count: u8,
    pub diff_data_center_count: u8,
}

impl ReplicaPlacement {
    pub fn new(
        diff_data_center_count: u8,
        diff_rack_count: u8,
        same_rack_count: u8,
    ) -> Result<Self, ReplicaPlacementError> {
        let rp = ReplicaPlacement {
            same_rack_count,
            diff_rack_count,
            diff_data_center_count,
        };
        if same_rack_count > MAX_COUNT
            || diff_rack_count > MAX_COUNT
            || diff_data_center_count > MAX_COUNT
        {
            return Err(ReplicaPlacementError::InvalidString(rp.to_string()));
        }
        Ok(rp)
    }

    /// Decode the 1-byte form. Fails on any unrecognized pattern.
    pub fn from_byte(b: u8) -> Result<Self, ReplicaPlacementError> {
        let diff_data_center_count = b / 100;
        let diff_rack_count = (b / 10) % 10;
        let same_rack_count = b % 10;
        if same_rack_count > MAX_COUNT
            || diff_rack_count > MAX_COUNT
            || diff_data_center_count > MAX_COUNT
        {
            return Err(ReplicaPlacementError::UnknownByte(b));
        }
        Ok(ReplicaPlacement {
            same_rack_count,
            diff_rack_count,
            diff_data_center_count,
        })
    }

    /// Encode to the 1-byte form written in the super block.
    pub fn as_byte(&self) -> u8 {
        self.diff_data_center_count * 100 + self.diff_rack_count * 10 + self.same_rack_count
    }

    /// Total number of copies, the original included.
    pub fn copy_count(&self) -> u8 {
        self.same_rack_count + self.diff_rack_count + self.diff_data_center_count + 1
    }
}

impl fmt::Display for ReplicaPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.diff_data_center_count, self.diff_rack_count, self.same_rack_count
        )
    }
}

impl FromStr for ReplicaPlacement {
    type Err = ReplicaPlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.as_bytes();
        if digits.len() != 3 || !digits.iter().all(|d| d.is_ascii_digit()) {
            return Err(ReplicaPlacementError::InvalidString(s.to_string()));
        }
        ReplicaPlacement::new(digits[0] - b'0', digits[1] - b'0', digits[2] - b'0')
            .map_err(|_| ReplicaPlacementError::InvalidString(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_round_trip() {
        for s in ["000", "001", "010", "100", "110", "200", "222"] {
            let rp: ReplicaPlacement = s.parse().expect("valid placement");
            let b = rp.as_byte();
            assert_eq!(ReplicaPlacement::from_byte(b).unwrap(), rp);
            assert_eq!(rp.to_string(), s);
        }
    }

    #[test]
    fn packed_byte_values() {
        let rp: ReplicaPlacement = "010".parse().unwrap();
        assert_eq!(rp.as_byte(), 10);
        let rp: ReplicaPlacement = "112".parse().unwrap();
        assert_eq!(rp.as_byte(), 112);
    }

    #[test]
    fn rejects_unknown_bytes() {
        for b in [3u8, 9, 55, 123, 199, 255] {
            assert_eq!(
                ReplicaPlacement::from_byte(b),
                Err(ReplicaPlacementError::UnknownByte(b))
            );
        }
    }

    #[test]
    fn rejects_malformed_strings() {
        for s in ["", "01", "0100", "abc", "03!", "931"] {
            assert!(s.parse::<ReplicaPlacement>().is_err(), "accepted {s:?}");
        }
    }

    #[test]
    fn copy_count_includes_original() {
        assert_eq!("000".parse::<ReplicaPlacement>().unwrap().copy_count(), 1);
        assert_eq!("010".parse::<ReplicaPlacement>().unwrap().copy_count(), 2);
        assert_eq!("112".parse::<ReplicaPlacement>().unwrap().copy_count(), 5);
    }
}

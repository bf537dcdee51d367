//! Time-to-live policy and its 2-byte codec.
//!
//! A TTL is a count plus a unit, written in the super block at offsets 2-3
//! as `[count, unit]`. Decoding never fails: malformed bytes fall back to
//! the degenerate [`Ttl::NONE`] ("no expiration").

use crate::error::TtlError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit of a TTL count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TtlUnit {
    #[default]
    Empty,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl TtlUnit {
    fn from_byte(b: u8) -> Option<TtlUnit> {
        match b {
            0 => Some(TtlUnit::Empty),
            1 => Some(TtlUnit::Minute),
            2 => Some(TtlUnit::Hour),
            3 => Some(TtlUnit::Day),
            4 => Some(TtlUnit::Week),
            5 => Some(TtlUnit::Month),
            6 => Some(TtlUnit::Year),
            _ => None,
        }
    }

    fn as_byte(self) -> u8 {
        match self {
            TtlUnit::Empty => 0,
            TtlUnit::Minute => 1,
            TtlUnit::Hour => 2,
            TtlUnit::Day => 3,
            TtlUnit::Week => 4,
            TtlUnit::Month => 5,
            TtlUnit::Year => 6,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            TtlUnit::Empty => "",
            TtlUnit::Minute => "m",
            TtlUnit::Hour => "h",
            TtlUnit::Day => "d",
            TtlUnit::Week => "w",
            TtlUnit::Month => "M",
            TtlUnit::Year => "y",
        }
    }

    fn minutes(self) -> u32 {
        match self {
            TtlUnit::Empty => 0,
            TtlUnit::Minute => 1,
            TtlUnit::Hour => 60,
            TtlUnit::Day => 24 * 60,
            TtlUnit::Week => 7 * 24 * 60,
            TtlUnit::Month => 31 * 24 * 60,
            TtlUnit::Year => 365 * 24 * 60,
        }
    }
}

/// Expiration policy for all data in a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ttl {
    count: u8,
    unit: TtlUnit,
}

impl Ttl {
    /// No expiration. Encodes as `[0, 0]`.
    pub const NONE: Ttl = Ttl {
        count: 0,
        unit: TtlUnit::Empty,
    };

    pub fn new(count: u8, unit: TtlUnit) -> Ttl {
        if count == 0 || unit == TtlUnit::Empty {
            return Ttl::NONE;
        }
        Ttl { count, unit }
    }

    /// Decode the 2-byte form. Never fails: a zero count or an unrecognized
    /// unit yields [`Ttl::NONE`].
    pub fn from_bytes(bytes: [u8; 2]) -> Ttl {
        match TtlUnit::from_byte(bytes[1]) {
            Some(unit) => Ttl::new(bytes[0], unit),
            None => Ttl::NONE,
        }
    }

    /// Encode to the 2-byte form written in the super block.
    pub fn to_bytes(&self) -> [u8; 2] {
        [self.count, self.unit.as_byte()]
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    pub fn unit(&self) -> TtlUnit {
        self.unit
    }

    /// Total lifetime in minutes; zero means no expiration.
    pub fn minutes(&self) -> u32 {
        u32::from(self.count) * self.unit.minutes()
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Ttl::NONE {
            return Ok(());
        }
        write!(f, "{}{}", self.count, self.unit.suffix())
    }
}

impl FromStr for Ttl {
    type Err = TtlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Ttl::NONE);
        }
        if !s.is_ascii() {
            return Err(TtlError::InvalidString(s.to_string()));
        }
        let (count_part, unit_part) = s.split_at(s.len() - 1);
        let unit = match unit_part {
            "m" => TtlUnit::Minute,
            "h" => TtlUnit::Hour,
            "d" => TtlUnit::Day,
            "w" => TtlUnit::Week,
            "M" => TtlUnit::Month,
            "y" => TtlUnit::Year,
            _ => return Err(TtlError::UnknownUnit(unit_part.to_string())),
        };
        let count: u8 = count_part
            .parse()
            .map_err(|_| TtlError::InvalidString(s.to_string()))?;
        Ok(Ttl::new(count, unit))
    }
}

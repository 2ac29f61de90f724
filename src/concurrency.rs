//! Concurrency modes that trade random bits for counter bits.

#[cfg(not(feature = "std"))]
use core as std;

use std::{fmt, str};

/// Selects how many leading bits of the random part of an identifier are replaced by the low bits
/// of a shared [`Counter`](crate::Counter).
///
/// A mode with more counter bits admits more identifiers per timestamp tick (2^16 nanoseconds)
/// without relying on randomness to avoid collisions, at the cost of fewer random bits.
///
/// | Mode     | Overwritten bits                     | Per-tick budget |
/// | -------- | ------------------------------------ | --------------- |
/// | `Nano`   | high nibble of byte 6                | 16              |
/// | `Low`    | byte 6                               | 256             |
/// | `Medium` | bytes 6 and 7                        | 65,536          |
/// | `High`   | bytes 6 through 8                    | 16,777,216      |
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub enum Concurrency {
    /// 4 counter bits, 44 random bits.
    Nano,

    /// 8 counter bits, 40 random bits.
    #[default]
    Low,

    /// 16 counter bits, 32 random bits.
    Medium,

    /// 24 counter bits, 24 random bits.
    High,
}

impl Concurrency {
    /// All modes in ascending order of counter width.
    pub const ALL: [Self; 4] = [Self::Nano, Self::Low, Self::Medium, Self::High];

    /// Returns the number of counter bits embedded by this mode.
    pub const fn counter_bits(self) -> u32 {
        match self {
            Self::Nano => 4,
            Self::Low => 8,
            Self::Medium => 16,
            Self::High => 24,
        }
    }

    /// Returns the number of distinct counter values this mode can embed.
    pub const fn capacity(self) -> u64 {
        1 << self.counter_bits()
    }

    /// Returns the lowercase name of this mode.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nano => "nano",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Overwrites the leading bits of the random part of `bytes` with the low bits of `count`.
    pub(crate) fn apply(self, bytes: &mut [u8; 12], count: u64) {
        match self {
            Self::Nano => {
                bytes[6] = ((count << 4) as u8 & 0xf0) | (bytes[6] & 0x0f);
            }
            Self::Low => {
                bytes[6] = count as u8;
            }
            Self::Medium => {
                bytes[6] = (count >> 8) as u8;
                bytes[7] = count as u8;
            }
            Self::High => {
                bytes[6] = (count >> 16) as u8;
                bytes[7] = (count >> 8) as u8;
                bytes[8] = count as u8;
            }
        }
    }
}

impl fmt::Display for Concurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl str::FromStr for Concurrency {
    type Err = ParseConcurrencyError;

    /// Parses the lowercase mode name.
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_str() == src)
            .ok_or(ParseConcurrencyError {})
    }
}

/// Error parsing an unknown concurrency mode name.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ParseConcurrencyError {}

impl fmt::Display for ParseConcurrencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected one of `nano`, `low`, `medium`, or `high`")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseConcurrencyError {}

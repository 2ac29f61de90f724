#[cfg(not(feature = "std"))]
use core as std;

use std::{array, fmt, str};

use fstr::FStr;

/// Digit characters used in the base32 text representation, in ascending bit-value order.
const DIGITS: &[u8; 32] = b"0123456789abcdefghijklmnopqrstuv";

/// O(1) map from ASCII code points to base32 digit values, or `0xff` if not a digit.
const DECODE_MAP: [u8; 256] = {
    let mut map = [0xff; 256];
    let mut i = 0;
    while i < DIGITS.len() {
        map[DIGITS[i] as usize] = i as u8;
        i += 1;
    }
    map
};

/// Represents a 12-byte, K-ordered unique identifier.
///
/// The first six bytes hold the high 48 bits of a big-endian Unix timestamp in nanoseconds, and
/// the remaining six bytes hold random bits, part of which may be replaced by a counter value
/// depending on the [`Concurrency`](crate::Concurrency) mode used to create the identifier.
///
/// The byte order and the text order of identifiers are consistent with each other, so sorting
/// either form sorts identifiers by creation time down to the timestamp granularity.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Xid([u8; 12]);

impl Xid {
    /// Nil identifier (00000000000000000000)
    pub const NIL: Self = Self([0x00; 12]);

    /// Max identifier (vvvvvvvvvvvvvvvvvvvg)
    pub const MAX: Self = Self([0xff; 12]);

    /// Returns a reference to the underlying byte array.
    pub const fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }

    /// Creates an identifier from a Unix timestamp in nanoseconds and a 48-bit `counter` field.
    ///
    /// Only the high 48 bits of `unix_ts_ns` are stored.
    ///
    /// # Panics
    ///
    /// Panics if `counter` is not a 48-bit unsigned integer.
    pub const fn from_fields(unix_ts_ns: u64, counter: u64) -> Self {
        if counter >= 1 << 48 {
            panic!("invalid field value");
        }

        Self([
            (unix_ts_ns >> 56) as u8,
            (unix_ts_ns >> 48) as u8,
            (unix_ts_ns >> 40) as u8,
            (unix_ts_ns >> 32) as u8,
            (unix_ts_ns >> 24) as u8,
            (unix_ts_ns >> 16) as u8,
            (counter >> 40) as u8,
            (counter >> 32) as u8,
            (counter >> 24) as u8,
            (counter >> 16) as u8,
            (counter >> 8) as u8,
            counter as u8,
        ])
    }

    /// Returns the embedded Unix timestamp in nanoseconds.
    ///
    /// The low 16 bits of the returned value are always zero because only the high 48 bits of a
    /// timestamp are stored.
    pub const fn timestamp(&self) -> u64 {
        let b = &self.0;
        u64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], 0, 0])
    }

    /// Returns the trailing six bytes as a 48-bit big-endian unsigned integer.
    ///
    /// This is the random (or partly counter-derived) part of the identifier.
    pub const fn counter(&self) -> u64 {
        let b = &self.0;
        u64::from_be_bytes([0, 0, b[6], b[7], b[8], b[9], b[10], b[11]])
    }

    /// Returns the 20-digit base32 string representation stored in a stack-allocated string type
    /// that can be dereferenced as `str`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kxid::Xid;
    ///
    /// let x = "9m4e2mr0ui3e8a215n4g".parse::<Xid>()?;
    /// let y = x.encode();
    /// assert_eq!(&y as &str, "9m4e2mr0ui3e8a215n4g");
    /// assert_eq!(format!("{}", y), "9m4e2mr0ui3e8a215n4g");
    /// # Ok::<(), kxid::ParseError>(())
    /// ```
    pub fn encode(&self) -> FStr<20> {
        let s = &self.0;
        let d = |i: u8| DIGITS[i as usize];
        let buffer = [
            d(s[0] >> 3),
            d((s[1] >> 6) & 0x1f | (s[0] << 2) & 0x1f),
            d((s[1] >> 1) & 0x1f),
            d((s[2] >> 4) & 0x1f | (s[1] << 4) & 0x1f),
            d(s[3] >> 7 | (s[2] << 1) & 0x1f),
            d((s[3] >> 2) & 0x1f),
            d(s[4] >> 5 | (s[3] << 3) & 0x1f),
            d(s[4] & 0x1f),
            d(s[5] >> 3),
            d((s[6] >> 6) & 0x1f | (s[5] << 2) & 0x1f),
            d((s[6] >> 1) & 0x1f),
            d((s[7] >> 4) & 0x1f | (s[6] << 4) & 0x1f),
            d(s[8] >> 7 | (s[7] << 1) & 0x1f),
            d((s[8] >> 2) & 0x1f),
            d(s[9] >> 5 | (s[8] << 3) & 0x1f),
            d(s[9] & 0x1f),
            d(s[10] >> 3),
            d((s[11] >> 6) & 0x1f | (s[10] << 2) & 0x1f),
            d((s[11] >> 1) & 0x1f),
            d((s[11] << 4) & 0x1f),
        ];
        debug_assert!(buffer.is_ascii());
        // SAFETY: every byte is taken from `DIGITS`
        unsafe { FStr::from_inner_unchecked(buffer) }
    }

    /// Creates an object from the 20-digit base32 representation given as an ASCII byte slice.
    ///
    /// The input is validated as a whole before any byte of the result is computed. Uppercase
    /// digits are rejected, and so is a final digit that carries nonzero padding bits.
    pub const fn parse_ascii(src: &[u8]) -> Result<Self, ParseError> {
        if src.len() != 20 {
            return Err(ParseError::InvalidLength(src.len()));
        }

        let mut v = [0u8; 20];
        let mut i = 0;
        while i < 20 {
            v[i] = DECODE_MAP[src[i] as usize];
            if v[i] == 0xff {
                return Err(ParseError::InvalidDigit(i));
            }
            i += 1;
        }

        // the last digit holds two payload bits followed by four padding bits
        if v[19] & 0x0f != 0 {
            return Err(ParseError::NonCanonical);
        }

        Ok(Self([
            v[0] << 3 | v[1] >> 2,
            v[1] << 6 | v[2] << 1 | v[3] >> 4,
            v[3] << 4 | v[4] >> 1,
            v[4] << 7 | v[5] << 2 | v[6] >> 3,
            v[6] << 5 | v[7],
            v[8] << 3 | v[9] >> 2,
            v[9] << 6 | v[10] << 1 | v[11] >> 4,
            v[11] << 4 | v[12] >> 1,
            v[12] << 7 | v[13] << 2 | v[14] >> 3,
            v[14] << 5 | v[15],
            v[16] << 3 | v[17] >> 2,
            v[17] << 6 | v[18] << 1 | v[19] >> 4,
        ]))
    }
}

impl fmt::Display for Xid {
    /// Returns the 20-digit canonical base32 string representation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl str::FromStr for Xid {
    type Err = ParseError;

    /// Creates an object from the 20-digit base32 string representation.
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        Self::parse_ascii(src.as_bytes())
    }
}

impl TryFrom<&str> for Xid {
    type Error = ParseError;

    fn try_from(src: &str) -> Result<Self, Self::Error> {
        src.parse()
    }
}

impl From<Xid> for [u8; 12] {
    fn from(src: Xid) -> Self {
        src.0
    }
}

impl From<[u8; 12]> for Xid {
    fn from(src: [u8; 12]) -> Self {
        Self(src)
    }
}

impl TryFrom<&[u8]> for Xid {
    type Error = array::TryFromSliceError;

    fn try_from(src: &[u8]) -> Result<Self, Self::Error> {
        <[u8; 12]>::try_from(src).map(Self)
    }
}

impl AsRef<[u8]> for Xid {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<Xid> for u128 {
    fn from(src: Xid) -> Self {
        let mut buffer = [0u8; 16];
        buffer[4..].copy_from_slice(&src.0);
        Self::from_be_bytes(buffer)
    }
}

/// Error parsing an invalid string representation of identifier.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ParseError {
    /// The input was not 20 bytes long.
    InvalidLength(usize),

    /// The byte at the given position is not a lowercase base32 digit.
    InvalidDigit(usize),

    /// The final digit sets padding bits that no 12-byte value produces.
    NonCanonical,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "xid: invalid ID: ")?;
        match self {
            Self::InvalidLength(n) => write!(f, "expected 20 digits, found {}", n),
            Self::InvalidDigit(i) => write!(f, "invalid digit at position {}", i),
            Self::NonCanonical => write!(f, "nonzero padding bits in final digit"),
        }
    }
}

#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
mod std_ext {
    use super::{ParseError, Xid};
    use std::time;

    impl Xid {
        /// Returns the embedded timestamp as a [`SystemTime`](time::SystemTime).
        pub fn time(&self) -> time::SystemTime {
            time::UNIX_EPOCH + time::Duration::from_nanos(self.timestamp())
        }
    }

    impl From<Xid> for String {
        fn from(src: Xid) -> Self {
            src.to_string()
        }
    }

    impl TryFrom<String> for Xid {
        type Error = ParseError;

        fn try_from(src: String) -> Result<Self, Self::Error> {
            src.parse()
        }
    }

    impl std::error::Error for ParseError {}
}

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
mod serde_support {
    use super::{fmt, Xid};
    use serde::{de, Deserializer, Serializer};

    impl serde::Serialize for Xid {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if serializer.is_human_readable() {
                serializer.serialize_str(&self.encode())
            } else {
                serializer.serialize_bytes(self.as_bytes())
            }
        }
    }

    impl<'de> serde::Deserialize<'de> for Xid {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            if deserializer.is_human_readable() {
                deserializer.deserialize_str(VisitorImpl)
            } else {
                deserializer.deserialize_bytes(VisitorImpl)
            }
        }
    }

    struct VisitorImpl;

    impl<'de> de::Visitor<'de> for VisitorImpl {
        type Value = Xid;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(formatter, "an xid representation")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            value.parse::<Self::Value>().map_err(de::Error::custom)
        }

        fn visit_bytes<E: de::Error>(self, value: &[u8]) -> Result<Self::Value, E> {
            match value.len() {
                12 => Self::Value::try_from(value).map_err(de::Error::custom),
                20 => Self::Value::parse_ascii(value).map_err(de::Error::custom),
                _ => Err(de::Error::invalid_length(value.len(), &self)),
            }
        }
    }

}

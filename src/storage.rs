//! Conversion to and from opaque database column values.
//!
//! Database drivers exchange column values as a small set of primitive types. [`StorageValue`]
//! mirrors that set so that a driver integration can map its own value type to it and let [`Xid`]
//! do the validation. An identifier is always written as its raw 12-byte form; it is read back
//! from either the raw form or the 20-digit text form.
//!
//! ```rust
//! use kxid::{storage::StorageValue, Xid};
//!
//! let x = "9m4e2mr0ui3e8a215n4g".parse::<Xid>()?;
//! assert_eq!(x.to_storage_value(), StorageValue::Bytes(x.as_bytes()));
//! assert_eq!(Xid::scan(&StorageValue::Text("9m4e2mr0ui3e8a215n4g")), Ok(x));
//! assert!(Xid::scan(&StorageValue::Int(42)).is_err());
//! # Ok::<(), kxid::ParseError>(())
//! ```

#[cfg(not(feature = "std"))]
use core as std;

use std::fmt;

use crate::{ParseError, Xid};

/// A borrowed database column value.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum StorageValue<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Bytes(&'a [u8]),
    Text(&'a str),
}

impl StorageValue<'_> {
    /// Returns the name of the value type for use in diagnostics.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bytes(_) => "bytes",
            Self::Text(_) => "text",
        }
    }
}

impl Xid {
    /// Returns the value to be written to a database column, i.e., the raw 12-byte form.
    pub const fn to_storage_value(&self) -> StorageValue<'_> {
        StorageValue::Bytes(self.as_bytes())
    }

    /// Reads an identifier from a database column value.
    ///
    /// Accepts the 20-digit text form and the raw 12-byte form.
    pub fn scan(value: &StorageValue<'_>) -> Result<Self, ScanError> {
        match *value {
            StorageValue::Text(text) => text.parse().map_err(ScanError::Parse),
            StorageValue::Bytes(bytes) => {
                Self::try_from(bytes).map_err(|_| ScanError::InvalidLength(bytes.len()))
            }
            _ => Err(ScanError::UnsupportedType(value.type_name())),
        }
    }
}

impl<'a> From<&'a Xid> for StorageValue<'a> {
    fn from(src: &'a Xid) -> Self {
        src.to_storage_value()
    }
}

impl TryFrom<StorageValue<'_>> for Xid {
    type Error = ScanError;

    fn try_from(src: StorageValue<'_>) -> Result<Self, Self::Error> {
        Self::scan(&src)
    }
}

/// Error reading an identifier from a database column value.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ScanError {
    /// The value is neither bytes nor text.
    UnsupportedType(&'static str),

    /// The byte value is not 12 bytes long.
    InvalidLength(usize),

    /// The text value is not a valid identifier.
    Parse(ParseError),
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedType(t) => write!(f, "xid: scanning unsupported type: {}", t),
            Self::InvalidLength(n) => {
                write!(f, "xid: scanning byte slice invalid length: {}", n)
            }
            Self::Parse(err) => fmt::Display::fmt(err, f),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ScanError, StorageValue};
    use crate::{ParseError, Xid};

    /// Writes raw bytes and reads them back
    #[test]
    fn writes_raw_bytes_and_reads_them_back() {
        for _ in 0..1_000 {
            let e = Xid::from(rand::random::<[u8; 12]>());
            let value = StorageValue::from(&e);
            assert_eq!(value, StorageValue::Bytes(&<[u8; 12]>::from(e)));
            assert_eq!(Xid::scan(&value), Ok(e));
            assert_eq!(Xid::try_from(value), Ok(e));
        }
    }

    /// Reads text form
    #[test]
    fn reads_text_form() {
        let e = Xid::scan(&StorageValue::Text("9m4e2mr0ui3e8a215n4g")).unwrap();
        assert_eq!(
            e.as_bytes(),
            &[0x4d, 0x88, 0xe1, 0x5b, 0x60, 0xf4, 0x86, 0xe4, 0x28, 0x41, 0x2d, 0xc9]
        );
    }

    /// Rejects unsupported values with description
    #[test]
    fn rejects_unsupported_values_with_description() {
        let cases = [
            (StorageValue::Null, ScanError::UnsupportedType("null")),
            (StorageValue::Bool(true), ScanError::UnsupportedType("bool")),
            (StorageValue::Int(12), ScanError::UnsupportedType("int")),
            (StorageValue::Float(1.5), ScanError::UnsupportedType("float")),
            (StorageValue::Bytes(&[]), ScanError::InvalidLength(0)),
            (StorageValue::Bytes(&[0; 11]), ScanError::InvalidLength(11)),
            (StorageValue::Bytes(&[0; 20]), ScanError::InvalidLength(20)),
            (
                StorageValue::Text("123"),
                ScanError::Parse(ParseError::InvalidLength(3)),
            ),
            (
                StorageValue::Text("9m4e2mr0ui3e8a2z5n4g"),
                ScanError::Parse(ParseError::InvalidDigit(15)),
            ),
        ];

        for (value, err) in cases {
            assert_eq!(Xid::scan(&value), Err(err));
        }

        assert_eq!(
            ScanError::UnsupportedType("int").to_string(),
            "xid: scanning unsupported type: int"
        );
        assert_eq!(
            ScanError::InvalidLength(11).to_string(),
            "xid: scanning byte slice invalid length: 11"
        );
    }
}

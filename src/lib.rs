//! Compact, K-ordered, coordination-free 12-byte unique identifiers
//!
//! ```rust
//! let x = kxid::xid();
//! println!("{}", x); // e.g., "9m4e2mr0ui3e8a215n4g"
//! println!("{:?}", x.as_bytes()); // as 12-byte array
//!
//! // use a counter to keep identifiers distinct within the same timestamp tick
//! let y = kxid::xid_with_concurrency(kxid::Concurrency::Medium);
//! assert_eq!(y.to_string().parse(), Ok(y));
//! ```
//!
//! No central server and no configured machine or process ID are involved: every identifier is
//! built from a timestamp and random bits only.
//!
//! # Field and bit layout
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                          unix_ts_ns                           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |          unix_ts_ns           |             rand              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                             rand                              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Where:
//!
//! - The 48-bit `unix_ts_ns` field holds the high 48 bits of the 64-bit Unix timestamp in
//!   nanoseconds, so one timestamp tick lasts 2^16 nanoseconds.
//! - The 48-bit `rand` field is filled with random bits. In a [`Concurrency`] mode, its leading
//!   4, 8, 16, or 24 bits are replaced by the low bits of a shared [`Counter`], which guarantees
//!   distinct identifiers for up to 16, 256, 65,536, or 16,777,216 identifiers per tick.
//!
//! The binary form is compatible by convention with the 12-byte MongoDB ObjectId.
//!
//! # Text representation
//!
//! The 20-digit text form is a lowercase base32 encoding with the alphabet
//! `0123456789abcdefghijklmnopqrstuv` and no padding. The alphabet is in ascending order, so the
//! text form sorts the same way as the binary form. A valid string matches `^[0-9a-v]{19}[0g]$`;
//! the last digit carries only two payload bits.
//!
//! # Crate features
//!
//! Default features:
//!
//! - `global_gen`: enables the process-wide counter and the [`xid()`] family of entry point
//!   functions. This feature implies `std`.
//!
//! Optional features:
//!
//! - `std`: enables `std::error::Error` implementations, [`String`] conversions, and the
//!   clock-based generator methods.
//! - `serde`: enables serialization and deserialization of [`Xid`] via serde.
//! - `tracing`: instruments generator methods with `tracing` spans.

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod id;
pub use id::{ParseError, Xid};

mod concurrency;
pub use concurrency::{Concurrency, ParseConcurrencyError};

mod counter;
pub use counter::Counter;

pub mod generator;
#[doc(no_inline)]
pub use generator::{RandError, RandSource, XidGenerator};

pub mod storage;

mod global_gen;
#[cfg(feature = "global_gen")]
pub use global_gen::{global_counter, xid, xid_concurrent, xid_with_concurrency};

//! Identifier generator and related types.

#[cfg(not(feature = "std"))]
use core as std;

use std::{fmt, num::NonZeroU32};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{Concurrency, Counter, Xid};

pub mod with_rand08;

/// A trait that defines the minimum random number generator interface for [`XidGenerator`].
pub trait RandSource {
    /// Fills `dest` entirely with random data, or fails without producing partial output.
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), RandError>;

    /// Returns the next random `u64`.
    fn try_next_u64(&mut self) -> Result<u64, RandError> {
        let mut buffer = [0u8; 8];
        self.try_fill_bytes(&mut buffer)?;
        Ok(u64::from_ne_bytes(buffer))
    }
}

/// Error reporting that the random number generator could not produce random data.
///
/// This error is not recoverable: there is no meaningful fallback for an identifier generator
/// without randomness, so the non-`try` generator methods panic upon it instead of returning an
/// identifier with weakened entropy.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct RandError {
    code: Option<NonZeroU32>,
}

impl RandError {
    /// Creates an error with an optional implementation-specific error code.
    pub const fn new(code: Option<NonZeroU32>) -> Self {
        Self { code }
    }

    /// Returns the implementation-specific error code, if any.
    pub const fn code(&self) -> Option<NonZeroU32> {
        self.code
    }
}

impl fmt::Display for RandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "random source unavailable (code {})", code),
            None => write!(f, "random source unavailable"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RandError {}

/// Represents an identifier generator that combines a timestamp, a random number generator, and a
/// shared [`Counter`].
///
/// The generator owns its random number generator and borrows the counter, so multiple
/// generators (e.g., one per thread) can draw from a single counter while each keeps its own
/// random state. Tests and embedders can create an isolated counter instead of the process-wide
/// one used by [`xid()`](crate::xid).
///
/// # Examples
///
/// ```rust
/// use kxid::{Concurrency, Counter, XidGenerator};
///
/// let counter = Counter::new(0);
/// let mut g = XidGenerator::with_rand08(&counter, rand::rngs::OsRng);
/// println!("{}", g.generate());
/// println!("{}", g.generate_with_concurrency(Concurrency::Medium));
/// ```
///
/// # Generator functions
///
/// | Flavor                                  | Timestamp | Counter | On random failure |
/// | --------------------------------------- | --------- | ------- | ----------------- |
/// | [`generate`]                            | Now       | No      | Panics            |
/// | [`generate_with_concurrency`]           | Now       | Yes     | Panics            |
/// | [`generate_core`]                       | Argument  | No      | Panics            |
/// | [`generate_with_concurrency_core`]      | Argument  | Yes     | Panics            |
/// | [`try_generate_core`]                   | Argument  | No      | Returns `Err`     |
/// | [`try_generate_with_concurrency_core`]  | Argument  | Yes     | Returns `Err`     |
///
/// [`generate`]: XidGenerator::generate
/// [`generate_with_concurrency`]: XidGenerator::generate_with_concurrency
/// [`generate_core`]: XidGenerator::generate_core
/// [`generate_with_concurrency_core`]: XidGenerator::generate_with_concurrency_core
/// [`try_generate_core`]: XidGenerator::try_generate_core
/// [`try_generate_with_concurrency_core`]: XidGenerator::try_generate_with_concurrency_core
#[derive(Clone, Debug)]
pub struct XidGenerator<'c, R> {
    counter: &'c Counter,

    /// The random number generator used by the generator.
    rng: R,
}

impl<'c, R: RandSource> XidGenerator<'c, R> {
    /// Creates a generator instance.
    pub const fn new(counter: &'c Counter, rng: R) -> Self {
        Self { counter, rng }
    }

    /// Returns the counter this generator draws from.
    pub const fn counter(&self) -> &'c Counter {
        self.counter
    }

    /// Generates a new identifier from the current timestamp and random bits.
    ///
    /// # Panics
    ///
    /// Panics if the random number generator fails.
    #[cfg(feature = "std")]
    #[cfg_attr(docsrs, doc(cfg(feature = "std")))]
    pub fn generate(&mut self) -> Xid {
        self.generate_core(unix_ts_ns())
    }

    /// Generates a new identifier from the current timestamp, embedding a counter value as
    /// specified by `mode`.
    ///
    /// # Panics
    ///
    /// Panics if the random number generator fails.
    #[cfg(feature = "std")]
    #[cfg_attr(docsrs, doc(cfg(feature = "std")))]
    pub fn generate_with_concurrency(&mut self, mode: Concurrency) -> Xid {
        self.generate_with_concurrency_core(mode, unix_ts_ns())
    }

    /// Generates a new identifier from the `unix_ts_ns` passed and random bits.
    ///
    /// # Panics
    ///
    /// Panics if the random number generator fails.
    pub fn generate_core(&mut self, unix_ts_ns: u64) -> Xid {
        self.try_generate_core(unix_ts_ns)
            .unwrap_or_else(|err| panic!("xid: cannot generate random number: {}", err))
    }

    /// Generates a new identifier from the `unix_ts_ns` passed, embedding a counter value as
    /// specified by `mode`.
    ///
    /// # Panics
    ///
    /// Panics if the random number generator fails.
    pub fn generate_with_concurrency_core(&mut self, mode: Concurrency, unix_ts_ns: u64) -> Xid {
        self.try_generate_with_concurrency_core(mode, unix_ts_ns)
            .unwrap_or_else(|err| panic!("xid: cannot generate random number: {}", err))
    }

    /// Generates a new identifier from the `unix_ts_ns` passed and random bits, or returns the
    /// error of the random number generator.
    ///
    /// Only the high 48 bits of `unix_ts_ns` are stored.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_generate_core(&mut self, unix_ts_ns: u64) -> Result<Xid, RandError> {
        let mut bytes = [0u8; 12];
        bytes[..6].copy_from_slice(&unix_ts_ns.to_be_bytes()[..6]);
        self.rng.try_fill_bytes(&mut bytes[6..])?;
        Ok(Xid::from(bytes))
    }

    /// Generates a new identifier from the `unix_ts_ns` passed, embedding a counter value as
    /// specified by `mode`, or returns the error of the random number generator.
    ///
    /// The counter is advanced only when random bits have been obtained.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_generate_with_concurrency_core(
        &mut self,
        mode: Concurrency,
        unix_ts_ns: u64,
    ) -> Result<Xid, RandError> {
        let mut bytes = <[u8; 12]>::from(self.try_generate_core(unix_ts_ns)?);
        mode.apply(&mut bytes, self.counter.increment());
        Ok(Xid::from(bytes))
    }
}

/// Returns the current Unix timestamp in nanoseconds.
#[cfg(feature = "std")]
fn unix_ts_ns() -> u64 {
    use std::time;
    time::SystemTime::now()
        .duration_since(time::UNIX_EPOCH)
        .expect("clock may have gone backwards")
        .as_nanos() as u64
}

/// Supports operations as an infinite iterator that produces a new random identifier for each
/// call of `next()`.
///
/// # Examples
///
/// ```rust
/// use kxid::{Counter, XidGenerator};
///
/// let counter = Counter::new(0);
/// XidGenerator::with_rand08(&counter, rand::thread_rng())
///     .enumerate()
///     .skip(4)
///     .take(4)
///     .for_each(|(i, e)| println!("[{}] {}", i, e));
/// ```
#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
impl<R: RandSource> Iterator for XidGenerator<'_, R> {
    type Item = Xid;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.generate())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
impl<R: RandSource> std::iter::FusedIterator for XidGenerator<'_, R> {}

#[cfg(test)]
mod tests {
    use super::{with_rand08, RandError, RandSource, XidGenerator};
    use crate::{Concurrency, Counter};

    type ThreadGen<'c> = XidGenerator<'c, with_rand08::Adapter<rand::rngs::ThreadRng>>;

    fn thread_gen(counter: &Counter) -> ThreadGen<'_> {
        XidGenerator::with_rand08(counter, rand::thread_rng())
    }

    /// Random source that fails after handing out a fixed number of bytes.
    struct FailingRandSource(usize);

    impl RandSource for FailingRandSource {
        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), RandError> {
            if self.0 < dest.len() {
                return Err(RandError::new(core::num::NonZeroU32::new(42)));
            }
            self.0 -= dest.len();
            dest.fill(0x5a);
            Ok(())
        }
    }

    /// Stores high 48 bits of timestamp
    #[test]
    fn stores_high_48_bits_of_timestamp() {
        let ts = 0x1234_5678_9abc_def0u64;
        let counter = Counter::new(0);
        let mut g = thread_gen(&counter);
        for mode in [None, Some(Concurrency::Nano), Some(Concurrency::High)] {
            let e = match mode {
                None => g.generate_core(ts),
                Some(mode) => g.generate_with_concurrency_core(mode, ts),
            };
            assert_eq!(e.as_bytes()[..6], ts.to_be_bytes()[..6]);
            assert_eq!(e.timestamp(), 0x1234_5678_9abc_0000);
        }
    }

    /// Leaves counter untouched without concurrency mode
    #[test]
    fn leaves_counter_untouched_without_concurrency_mode() {
        let counter = Counter::new(100);
        let mut g = thread_gen(&counter);
        for _ in 0..1_000 {
            g.generate_core(0x0123_4567_89ab_cdef);
        }
        assert_eq!(counter.load(), 100);
    }

    /// Embeds distinct counter values within same timestamp
    #[test]
    fn embeds_distinct_counter_values_within_same_timestamp() {
        use std::collections::HashSet;

        let ts = 0x0123_4567_89ab_cdefu64;
        for mode in Concurrency::ALL {
            // start near wraparound of the embedded bits
            let counter = Counter::new(mode.capacity() * 1_000 - 7);
            let mut g = thread_gen(&counter);
            let n = mode.capacity().min(4_096) as usize;
            let fields: HashSet<u64> = (0..n)
                .map(|_| g.generate_with_concurrency_core(mode, ts).counter())
                .map(|e| e >> (48 - mode.counter_bits()))
                .collect();
            assert_eq!(fields.len(), n, "{mode}");
        }
    }

    /// Embeds low 8 bits of counter in low mode
    #[test]
    fn embeds_low_8_bits_of_counter_in_low_mode() {
        let ts = 0x0123_4567_89ab_cdefu64;
        let counter = Counter::new(0x1ff);
        let mut g = thread_gen(&counter);

        let a = g.generate_with_concurrency_core(Concurrency::Low, ts);
        let b = g.generate_with_concurrency_core(Concurrency::Low, ts);
        assert_eq!(a.as_bytes()[6], 0x00);
        assert_eq!(b.as_bytes()[6], 0x01);
        assert_ne!(a, b);
        assert_eq!(a.timestamp(), b.timestamp());
    }

    /// Embeds shifted counter nibble in nano mode
    #[test]
    fn embeds_shifted_counter_nibble_in_nano_mode() {
        let ts = 0x0123_4567_89ab_cdefu64;
        let counter = Counter::new(0);
        let mut g = thread_gen(&counter);

        let mut low_nibbles = [0u32; 16];
        for _ in 0..16_000 {
            let e = g.generate_with_concurrency_core(Concurrency::Nano, ts);
            let n = counter.load();
            assert_eq!(e.as_bytes()[6] & 0xf0, (n << 4) as u8 & 0xf0);
            low_nibbles[(e.as_bytes()[6] & 0x0f) as usize] += 1;
        }

        // low nibble remains random
        for e in low_nibbles {
            assert!(e > 700, "{low_nibbles:?}");
        }
    }

    /// Shares one counter across modes and generators
    #[test]
    fn shares_one_counter_across_modes_and_generators() {
        let ts = 0x0123_4567_89ab_cdefu64;
        let counter = Counter::new(0);
        let mut g1 = thread_gen(&counter);
        let mut g2 = thread_gen(&counter);

        let a = g1.generate_with_concurrency_core(Concurrency::Medium, ts);
        let b = g2.generate_with_concurrency_core(Concurrency::High, ts);
        let c = g1.generate_with_concurrency_core(Concurrency::Low, ts);
        assert_eq!(a.as_bytes()[6..8], [0x00, 0x01]);
        assert_eq!(b.as_bytes()[6..9], [0x00, 0x00, 0x02]);
        assert_eq!(c.as_bytes()[6], 0x03);
        assert!(std::ptr::eq(g1.counter(), g2.counter()));
    }

    /// Generates distinct identifiers across threads sharing counter
    #[test]
    fn generates_distinct_identifiers_across_threads_sharing_counter() {
        use std::{collections::HashSet, thread};

        let ts = 0x0123_4567_89ab_cdefu64;
        let counter = Counter::new(0);
        let bytes6: Vec<u8> = thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    s.spawn(|| {
                        let mut g = thread_gen(&counter);
                        (0..64)
                            .map(|_| g.generate_with_concurrency_core(Concurrency::Low, ts))
                            .map(|e| e.as_bytes()[6])
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });

        assert_eq!(bytes6.iter().collect::<HashSet<_>>().len(), 256);
    }

    /// Returns error and leaves counter untouched upon random failure
    #[test]
    fn returns_error_and_leaves_counter_untouched_upon_random_failure() {
        let counter = Counter::new(0);
        let mut g = XidGenerator::new(&counter, FailingRandSource(6));

        let e = g.try_generate_with_concurrency_core(Concurrency::Low, 0);
        assert_eq!(e.unwrap().as_bytes()[7..], [0x5a; 5]);
        assert_eq!(counter.load(), 1);

        let err = g.try_generate_with_concurrency_core(Concurrency::Low, 0);
        assert_eq!(err.unwrap_err().code().map(|c| c.get()), Some(42));
        assert!(g.try_generate_core(0).is_err());
        assert_eq!(counter.load(), 1);
    }

    /// Panics upon random failure
    #[test]
    #[should_panic(expected = "xid: cannot generate random number")]
    fn panics_upon_random_failure() {
        let counter = Counter::new(0);
        XidGenerator::new(&counter, FailingRandSource(0)).generate_core(0);
    }

    /// Generates up-to-date timestamps as iterator
    #[test]
    fn generates_up_to_date_timestamps_as_iterator() {
        use std::time;

        let counter = Counter::new(0);
        for e in thread_gen(&counter).take(1_000) {
            let ts_now = time::SystemTime::now()
                .duration_since(time::UNIX_EPOCH)
                .expect("clock may have gone backwards")
                .as_nanos() as u64;
            assert!(e.timestamp() <= ts_now);
            assert!(ts_now - e.timestamp() < 1_000_000_000);
        }
    }
}

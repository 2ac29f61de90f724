//! Shared monotonic counter.

#[cfg(not(feature = "std"))]
use core as std;

use std::fmt;

use portable_atomic::{AtomicU64, Ordering};

use crate::generator::{RandError, RandSource};

/// A lock-free 64-bit counter shared by any number of [`XidGenerator`](crate::XidGenerator)s.
///
/// Every identifier created in a [`Concurrency`](crate::Concurrency) mode takes a fresh value
/// from the counter, so two such identifiers never receive the same counter value until the
/// counter wraps around. The counter is never reset; it starts from a random seed to keep
/// independent processes from producing the same counter sequence.
///
/// # Examples
///
/// ```rust
/// use kxid::{Concurrency, Counter, XidGenerator};
/// use std::thread;
///
/// let counter = Counter::new(0);
/// thread::scope(|s| {
///     for _ in 0..4 {
///         s.spawn(|| {
///             let mut g = XidGenerator::with_rand08(&counter, rand::thread_rng());
///             println!("{}", g.generate_with_concurrency(Concurrency::Low));
///         });
///     }
/// });
/// assert_eq!(counter.load(), 4);
/// ```
pub struct Counter(AtomicU64);

impl Counter {
    /// Creates a counter that starts from `seed`.
    pub const fn new(seed: u64) -> Self {
        Self(AtomicU64::new(seed))
    }

    /// Creates a counter seeded with a random value taken from `rng`.
    pub fn from_rand_source<R: RandSource>(rng: &mut R) -> Result<Self, RandError> {
        rng.try_next_u64().map(Self::new)
    }

    /// Increments the counter and returns the new value, wrapping around on overflow.
    pub fn increment(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    /// Returns the current value, i.e., the value most recently returned by
    /// [`increment`](Counter::increment) or the seed.
    pub fn load(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Counter").field(&self.load()).finish()
    }
}

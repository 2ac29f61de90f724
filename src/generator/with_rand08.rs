//! Integration with `rand` (v0.8) crate.

use super::{RandError, RandSource, XidGenerator};
use crate::Counter;
use rand::RngCore;

/// An adapter that implements [`RandSource`] for [`RngCore`] types.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Adapter<T>(/** The wrapped [`RngCore`] type. */ pub T);

impl<T: RngCore> RandSource for Adapter<T> {
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), RandError> {
        self.0
            .try_fill_bytes(dest)
            .map_err(|err| RandError::new(err.code()))
    }
}

impl<'c, T: RngCore> XidGenerator<'c, Adapter<T>> {
    /// Creates a generator object with a shared `counter` and a random number generator that
    /// implements [`RngCore`] from `rand` (v0.8) crate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kxid::{Counter, XidGenerator};
    ///
    /// let counter = Counter::new(0);
    /// let mut g = XidGenerator::with_rand08(&counter, rand::thread_rng());
    /// println!("{}", g.generate());
    /// ```
    pub const fn with_rand08(counter: &'c Counter, rng: T) -> Self {
        Self::new(counter, Adapter(rng))
    }
}

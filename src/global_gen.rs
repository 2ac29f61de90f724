//! Default generator and entry point functions.

#![cfg(feature = "global_gen")]
#![cfg_attr(docsrs, doc(cfg(feature = "global_gen")))]

use std::{cell::RefCell, sync};

use crate::{Concurrency, Counter, Xid, XidGenerator};
use inner::GlobalGenRng;

thread_local! {
    static DEFAULT_GENERATOR: RefCell<XidGenerator<'static, GlobalGenRng>> =
        RefCell::new(XidGenerator::new(global_counter(), GlobalGenRng::new()));
}

/// Returns the process-wide counter shared by the entry point functions, seeding it from the
/// operating system on first use.
///
/// # Panics
///
/// Panics if the operating system cannot provide random data.
pub fn global_counter() -> &'static Counter {
    static C: sync::OnceLock<Counter> = sync::OnceLock::new();
    C.get_or_init(|| {
        let counter = Counter::from_rand_source(&mut inner::os_rng())
            .unwrap_or_else(|err| panic!("xid: cannot generate random number: {}", err));
        #[cfg(feature = "tracing")]
        tracing::debug!("seeded process-wide xid counter");
        counter
    })
}

/// Generates an identifier from the current timestamp and random bits.
///
/// This function employs a thread-local generator that reseeds itself from the operating system
/// periodically and, on Unix, whenever the process ID changes (i.e., upon process forks).
///
/// # Examples
///
/// ```rust
/// let x = kxid::xid();
/// println!("{}", x); // e.g., "9m4e2mr0ui3e8a215n4g"
/// println!("{:?}", x.as_bytes()); // as 12-byte array
///
/// let xid_string: String = kxid::xid().to_string();
/// ```
pub fn xid() -> Xid {
    with_default_generator(|g| g.generate())
}

/// Generates an identifier in the [`Concurrency::Low`] mode, i.e., with the low 8 bits of the
/// process-wide counter in byte 6.
///
/// # Examples
///
/// ```rust
/// let a = kxid::xid_concurrent();
/// let b = kxid::xid_concurrent();
/// assert_ne!(a, b);
/// ```
pub fn xid_concurrent() -> Xid {
    xid_with_concurrency(Concurrency::Low)
}

/// Generates an identifier embedding a value of the process-wide counter as specified by `mode`.
///
/// # Examples
///
/// ```rust
/// use kxid::Concurrency;
///
/// let x = kxid::xid_with_concurrency(Concurrency::High);
/// println!("{}", x);
/// ```
pub fn xid_with_concurrency(mode: Concurrency) -> Xid {
    with_default_generator(|g| g.generate_with_concurrency(mode))
}

fn with_default_generator<T>(f: impl FnOnce(&mut XidGenerator<'static, GlobalGenRng>) -> T) -> T {
    DEFAULT_GENERATOR.with(|g| {
        if unix_fork_safety::pid_changed() {
            g.replace(XidGenerator::new(global_counter(), GlobalGenRng::new()));
        }

        f(&mut g.borrow_mut())
    })
}

mod inner {
    use rand::rngs::{adapter::ReseedingRng, OsRng};
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Core;

    use crate::generator::{with_rand08::Adapter, RandError, RandSource};

    /// Returns the operating system's random number generator as a [`RandSource`].
    pub fn os_rng() -> Adapter<OsRng> {
        Adapter(OsRng)
    }

    /// The random number generator for the default generator.
    ///
    /// The default generator currently employs [`ChaCha12Core`] with [`ReseedingRng`] wrapper to
    /// emulate the strategy used by [`rand::rngs::ThreadRng`].
    pub struct GlobalGenRng(Adapter<ReseedingRng<ChaCha12Core, OsRng>>);

    impl GlobalGenRng {
        /// Creates a generator seeded from the operating system.
        ///
        /// # Panics
        ///
        /// Panics if the operating system cannot provide random data.
        pub fn new() -> Self {
            let core = ChaCha12Core::from_rng(OsRng)
                .unwrap_or_else(|err| panic!("xid: cannot generate random number: {}", err));
            Self(Adapter(ReseedingRng::new(core, 1024 * 64, OsRng)))
        }
    }

    impl RandSource for GlobalGenRng {
        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), RandError> {
            self.0.try_fill_bytes(dest)
        }
    }
}

#[cfg(unix)]
mod unix_fork_safety {
    use std::{cell::Cell, process};

    thread_local! {
        static PID: Cell<u32> = Cell::new(process::id());
    }

    /// Returns true if the process ID has changed (i.e., upon process forks) since the last call
    /// on the current thread.
    pub fn pid_changed() -> bool {
        PID.with(|last_pid| {
            let pid = process::id();
            pid != last_pid.replace(pid)
        })
    }
}

#[cfg(not(unix))]
mod unix_fork_safety {
    pub const fn pid_changed() -> bool {
        false
    }
}

//! Time sources for the run loop.
//!
//! The run loop reads wake times from a [`Clock`] and blocks on it when the
//! earliest task is not due yet. [`SystemClock`] is the real monotonic clock;
//! [`ManualClock`] is a virtual clock whose sleeps complete instantly, for
//! deterministic tests.
//!
//! # Example: Virtual Time
//!
//! ```ignore
//! use reactor::time::ManualClock;
//! use reactor::{Runtime, sleep};
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let rt = Runtime::builder().clock(clock.clone()).build();
//!
//! rt.run(async { sleep(Duration::from_secs(60)).await }).unwrap();
//! assert_eq!(clock.elapsed(), Duration::from_secs(60));
//! ```

mod manual;

pub use crate::timer::{Sleep, sleep};
pub use manual::ManualClock;

use std::time::{Duration, Instant};

/// Wake time far enough out to stand in for "never" (about 30 years).
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `base + delay`, clamped to a far-future instant when the sum does not fit.
pub(crate) fn deadline(base: Instant, delay: Duration) -> Instant {
    base.checked_add(delay)
        .or_else(|| base.checked_add(FAR_FUTURE))
        .unwrap_or(base)
}

/// Monotonic time source used by a runtime.
///
/// `now` must never go backwards. `sleep_until` is the only place where the
/// runtime blocks its thread.
pub trait Clock {
    fn now(&self) -> Instant;

    /// Blocks until `deadline` has been reached.
    fn sleep_until(&self, deadline: Instant);
}

/// The host's monotonic clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep_until(&self, deadline: Instant) {
        let remaining = deadline.saturating_duration_since(Instant::now());

        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
    }
}

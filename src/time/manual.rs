use super::{Clock, deadline};

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Virtual clock that jumps forward instead of blocking.
///
/// Clones share the same time, so a test can keep one handle and give
/// another to the runtime.
#[derive(Clone, Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    /// Virtual time elapsed since the clock was created.
    pub fn elapsed(&self) -> Duration {
        self.offset.get()
    }

    /// Moves the clock forward by `by`. Saturates rather than overflowing.
    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get().saturating_add(by));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        deadline(self.origin, self.offset.get())
    }

    fn sleep_until(&self, deadline: Instant) {
        let remaining = deadline.saturating_duration_since(self.now());
        self.advance(remaining);
    }
}

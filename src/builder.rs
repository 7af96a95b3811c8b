//! Fluent builder for Runtime construction.
//!
//! Provides a builder pattern interface for creating and configuring Runtime instances.

use crate::runtime::Runtime;
use crate::time::{Clock, SystemClock};

use std::rc::Rc;

/// Builder for constructing Runtime instances with fluent API.
///
/// # Example
/// ```ignore
/// let rt = RuntimeBuilder::new().wait_for_all(true).build();
/// ```
pub struct RuntimeBuilder {
    wait_for_all: bool,
    clock: Rc<dyn Clock>,
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    ///
    /// Defaults: system clock, leftover tasks cancelled when the primary
    /// task finishes.
    pub fn new() -> Self {
        Self {
            wait_for_all: false,
            clock: Rc::new(SystemClock),
        }
    }

    /// Sets the default policy of [`Runtime::run`].
    ///
    /// When true, a run only returns once every spawned task has finished.
    pub fn wait_for_all(mut self, wait_for_all: bool) -> Self {
        self.wait_for_all = wait_for_all;
        self
    }

    /// Replaces the time source, e.g. with a
    /// [`ManualClock`](crate::time::ManualClock) in tests.
    pub fn clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Rc::new(clock);
        self
    }

    /// Builds and returns a configured Runtime instance.
    pub fn build(self) -> Runtime {
        Runtime::from_parts(self.clock, self.wait_for_all)
    }
}

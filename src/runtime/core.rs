//! Cooperative runtime that drives a primary task and everything it spawns.
//!
//! A [`Runtime`] is an explicit handle to one scheduler. Cloning it is cheap
//! and every clone refers to the same scheduler, so a task can hold a handle
//! to the runtime that runs it.

use crate::builder::RuntimeBuilder;
use crate::error::RuntimeError;
use crate::runtime::context::{self, enter_context};
use crate::runtime::scheduler::Scheduler;
use crate::task::JoinHandle;
use crate::time::Clock;

use std::fmt;
use std::future::Future;
use std::rc::Rc;

use tracing::{debug, debug_span, warn};

/// Single-threaded cooperative runtime.
///
/// Runs a primary future to completion with [`run`](Self::run), interleaving
/// every task spawned along the way at their suspension points.
#[derive(Clone)]
pub struct Runtime {
    scheduler: Rc<Scheduler>,
    wait_for_all: bool,
}

/// Marks the scheduler as running and tears down leftover tasks on exit,
/// including exit by panic.
struct RunGuard<'a> {
    scheduler: &'a Scheduler,
}

impl<'a> RunGuard<'a> {
    fn new(scheduler: &'a Scheduler) -> Self {
        scheduler.set_running(true);
        Self { scheduler }
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let discarded = self.scheduler.shutdown();
        if discarded > 0 {
            debug!(discarded, "cancelled unfinished tasks");
        }

        self.scheduler.set_running(false);
    }
}

impl Runtime {
    /// Creates a runtime on the system clock that cancels leftover tasks as
    /// soon as the primary task finishes.
    ///
    /// # Example
    /// ```ignore
    /// let rt = Runtime::new();
    /// assert_eq!(rt.run(async { 42 }), Ok(42));
    /// ```
    pub fn new() -> Self {
        RuntimeBuilder::new().build()
    }

    /// Returns a builder for configuring a runtime.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub(crate) fn from_parts(clock: Rc<dyn Clock>, wait_for_all: bool) -> Self {
        Self {
            scheduler: Rc::new(Scheduler::new(clock)),
            wait_for_all,
        }
    }

    /// Spawns a task on this runtime.
    ///
    /// Can be called before a run, in which case the task starts with the
    /// next run, or from inside a task running on this runtime.
    ///
    /// # Example
    /// ```ignore
    /// let rt = Runtime::new();
    /// let handle = rt.create_task(async { 1 });
    /// assert_eq!(rt.run(handle), Ok(1));
    /// ```
    pub fn create_task<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + 'static,
        F::Output: 'static,
    {
        self.scheduler.spawn(future)
    }

    /// Runs `future` as the primary task using the configured
    /// `wait_for_all` policy.
    pub fn run<F>(&self, future: F) -> Result<F::Output, RuntimeError>
    where
        F: Future + 'static,
        F::Output: 'static,
    {
        self.run_with(future, self.wait_for_all)
    }

    /// Runs `future` as the primary task and returns its output.
    ///
    /// With `wait_for_all` false, every other unfinished task is discarded
    /// as soon as the primary task finishes. With `wait_for_all` true, the
    /// loop keeps going until no task is ready or sleeping. Either way the
    /// runtime is empty again when this returns.
    ///
    /// # Errors
    /// - [`RuntimeError::AlreadyRunning`] if this or another runtime is
    ///   already running on the current thread; nothing is executed.
    /// - [`RuntimeError::ProtocolViolation`] if a task suspended without a
    ///   valid suspension command.
    /// - [`RuntimeError::Stalled`] if the primary task was still parked when
    ///   no work was left.
    pub fn run_with<F>(&self, future: F, wait_for_all: bool) -> Result<F::Output, RuntimeError>
    where
        F: Future + 'static,
        F::Output: 'static,
    {
        if self.scheduler.is_running() || context::is_active() {
            warn!("run called while an event loop is already running");
            return Err(RuntimeError::AlreadyRunning);
        }

        let span = debug_span!("run", wait_for_all);
        let _enter = span.enter();

        let scheduler = self.scheduler.clone();
        enter_context(scheduler.clone(), || {
            let _guard = RunGuard::new(&scheduler);
            let primary = scheduler.spawn_task(future);

            debug!(primary = %primary.id(), "run loop started");
            scheduler.drive(&primary, wait_for_all)
        })
    }

    /// Whether a run is in progress on this runtime.
    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Number of spawned tasks that have neither completed nor been discarded.
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending_tasks()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("running", &self.is_running())
            .field("pending_tasks", &self.pending_tasks())
            .field("wait_for_all", &self.wait_for_all)
            .finish()
    }
}

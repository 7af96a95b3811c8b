//! Thread-local runtime context for task spawning and suspension.
//!
//! While a run loop is active, its scheduler is installed in thread-local
//! storage so that [`Task::spawn`](crate::Task::spawn), [`sleep`](crate::sleep)
//! and the other awaitables can reach it without an explicit handle. At most
//! one scheduler is installed per thread; this is also what makes a nested
//! `run` detectable.

use crate::runtime::scheduler::Scheduler;

use std::cell::RefCell;
use std::rc::Rc;

thread_local! {
    /// The scheduler of the run loop active on this thread, if any.
    ///
    /// Set by [`enter_context`] for the duration of every run.
    static CURRENT: RefCell<Option<Rc<Scheduler>>> = const { RefCell::new(None) };
}

/// Restores the previous context on exit, including exit by panic.
struct ContextGuard {
    previous: Option<Rc<Scheduler>>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT.with(|current| *current.borrow_mut() = previous);
    }
}

/// Installs `scheduler` as the current context and runs `function` inside it.
pub(crate) fn enter_context<F, R>(scheduler: Rc<Scheduler>, function: F) -> R
where
    F: FnOnce() -> R,
{
    let previous = CURRENT.with(|current| current.borrow_mut().replace(scheduler));
    let _guard = ContextGuard { previous };

    function()
}

/// Returns the scheduler of the active run loop, if any.
pub(crate) fn current() -> Option<Rc<Scheduler>> {
    CURRENT.with(|current| current.borrow().clone())
}

/// Whether some run loop is active on this thread.
pub(crate) fn is_active() -> bool {
    CURRENT.with(|current| current.borrow().is_some())
}

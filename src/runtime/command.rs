//! The closed set of suspension commands a task can hand to the run loop.

use crate::event::Event;
use crate::runtime::context;
use crate::task::Runnable;

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// A request made by a suspending task.
pub(crate) enum Command {
    /// Reschedule the task once the duration has elapsed.
    Sleep(Duration),
    /// Park the task until the target task completes.
    Join(Rc<dyn Runnable>),
    /// Park the task until the event is set.
    WaitEvent(Event),
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Sleep(duration) => f.debug_tuple("Sleep").field(duration).finish(),
            Command::Join(task) => f.debug_tuple("Join").field(&task.header().id).finish(),
            Command::WaitEvent(event) => f.debug_tuple("WaitEvent").field(event).finish(),
        }
    }
}

/// What the last resumed task left behind for the loop.
#[derive(Debug)]
pub(crate) enum Yield {
    Empty,
    Command(Command),
    /// More than one command was deposited during a single resume.
    Conflict,
}

/// Hands a command to the run loop of the current thread.
///
/// Awaitables call this right before returning `Poll::Pending`.
///
/// # Panics
/// Panics if called outside of a runtime context.
pub(crate) fn suspend(command: Command) {
    let scheduler = context::current()
        .unwrap_or_else(|| panic!("suspension point awaited outside of a runtime context"));

    scheduler.deposit(command);
}

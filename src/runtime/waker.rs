//! Waker handed to continuations while they are resumed.
//!
//! Tasks in this runtime are rescheduled by the suspension commands they
//! deposit, never by wakers. The waker exists because `Future::poll` needs
//! one; waking it only leaves a trace in the logs.

use crate::task::TaskId;

use std::sync::Arc;
use std::task::{Wake, Waker};

use tracing::trace;

/// Inert waker bound to the task being resumed.
struct TaskWaker {
    task: TaskId,
}

impl Wake for TaskWaker {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        trace!(task = %self.task, "waker signal ignored; tasks resume through suspension commands");
    }
}

/// Creates the waker used while resuming `task`.
pub(crate) fn make_waker(task: TaskId) -> Waker {
    Waker::from(Arc::new(TaskWaker { task }))
}

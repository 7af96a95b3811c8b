//! Runtime error types.

use crate::task::TaskId;

use thiserror::Error;

/// Failures reported by [`Runtime::run`](crate::Runtime::run).
///
/// Errors raised by a task's own logic are never caught here: a task that
/// wants to report failure simply returns a `Result` as its output.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// `run` was called while a run loop is already active on this thread.
    #[error("already running an event loop")]
    AlreadyRunning,

    /// A task suspended without going through the suspension protocol.
    #[error("protocol violation in {task}: {reason}")]
    ProtocolViolation { task: TaskId, reason: String },

    /// The ready set drained while the primary task was still suspended.
    #[error("run loop drained before {task} completed")]
    Stalled { task: TaskId },
}

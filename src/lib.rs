//! Minimal cooperative task runtime.
//!
//! This crate runs many independently written tasks on a single thread. Tasks
//! are ordinary futures; they give up control only at explicit suspension
//! points and the run loop decides who goes next, strictly by wake time.
//!
//! # Architecture
//!
//! - **Runtime**: Handle to a scheduler; runs a primary future via `run`
//! - **Scheduler**: Ready queue ordered by wake time, plus the run loop
//! - **Task**: Wraps a future with its dependents and its result
//! - **Suspension commands**: sleep, join another task, wait for an event
//! - **Event**: Level-triggered flag that releases parked tasks
//! - **gather**: Spawns a batch of futures and collects results in order
//! - **Clock**: Real or virtual time source for the run loop
//! - **RuntimeBuilder**: Fluent builder pattern for runtime instantiation
//!
//! # Example
//!
//! ```ignore
//! use reactor::{create_task, sleep};
//! use std::time::Duration;
//!
//! async fn delayed_hello(delay: u64) {
//!     sleep(Duration::from_secs(delay)).await;
//!     println!("Hello! delay={delay}");
//! }
//!
//! let val = reactor::run(
//!     async {
//!         for i in 0..10 {
//!             create_task(delayed_hello(i));
//!         }
//!         9000
//!     },
//!     true,
//! )?;
//! assert_eq!(val, 9000);
//! ```

mod builder;
mod error;
mod event;
mod gather;
mod runtime;
mod task;
pub mod time;
mod timer;
mod utils;

pub use builder::RuntimeBuilder;
pub use error::RuntimeError;
pub use event::{Event, EventWait};
pub use gather::gather;
pub use runtime::Runtime;
pub use runtime::yield_now::yield_now;
pub use task::{JoinHandle, JoinSet, Task, TaskId, create_task};
pub use timer::{Sleep, sleep};

use std::future::Future;

/// Runs `future` on a fresh runtime driven by the system clock.
///
/// With `wait_for_all` false, tasks still pending when `future` finishes are
/// discarded; with `wait_for_all` true, the call returns only once every
/// spawned task has finished.
///
/// # Errors
/// See [`Runtime::run_with`].
pub fn run<F>(future: F, wait_for_all: bool) -> Result<F::Output, RuntimeError>
where
    F: Future + 'static,
    F::Output: 'static,
{
    Runtime::new().run_with(future, wait_for_all)
}

//! Task wrapper that combines a continuation with scheduler bookkeeping.
//!
//! A task owns a boxed future (its continuation), the list of tasks waiting on
//! its completion, and its result once the future has finished. The scheduler
//! only sees tasks through the type-erased [`Runnable`] trait, which lets tasks
//! with different output types share one ready queue.
//!
//! # Task Spawning
//!
//! Tasks are spawned using [`Task::spawn`] (or [`create_task`]) from within a
//! running task, or with [`Runtime::create_task`] before a run starts:
//!
//! ```ignore
//! use reactor::Task;
//!
//! async fn spawn_example() {
//!     Task::spawn(async {
//!         println!("Running in background");
//!     });
//!     println!("Task spawned, main continues");
//! }
//! ```
//!
//! # Join Handles
//!
//! [`Task::spawn`] returns a [`JoinHandle`] that can be awaited to wait for completion.
//! Awaiting a handle registers the caller as a *dependent* of the spawned task:
//! the caller is not polled again until the spawned task has finished.
//!
//! ```ignore
//! use reactor::Task;
//!
//! async fn wait_example() {
//!     let handle = Task::spawn(async { 42 });
//!     assert_eq!(handle.await, 42);
//! }
//! ```
//!
//! # How Tasks Work
//!
//! 1. A future is wrapped in a [`Task`] and pushed on the ready queue
//! 2. The run loop pops the earliest-due task and polls it once
//! 3. An awaited primitive deposits a suspension command and returns `Pending`
//! 4. The loop files the task under that command (timer, join, event)
//! 5. Once the command resolves the task goes back on the ready queue
//! 6. When the future returns `Ready`, its dependents are made ready
//!
//! [`Runtime::create_task`]: crate::Runtime::create_task

use crate::runtime::command::{Command, suspend};
use crate::runtime::context;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use tracing::warn;

/// Unique identifier of a task.
///
/// Identifiers are handed out in creation order and never reused within a process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub(crate) u64);

impl TaskId {
    /// Returns the raw numeric value of this id.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task #{}", self.0)
    }
}

/// Lifecycle of a task as seen by the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum State {
    /// Sitting in the ready queue, possibly with a wake time in the future.
    Ready,
    /// Parked on a join or an event; not in the ready queue.
    Suspended,
    Completed,
    Discarded,
}

/// Scheduler-facing state shared by every task regardless of its output type.
pub(crate) struct Header {
    pub(crate) id: TaskId,
    state: Cell<State>,
    dependents: RefCell<Vec<Rc<dyn Runnable>>>,
    slot: Cell<Option<usize>>,
}

impl Header {
    fn new(id: TaskId) -> Self {
        Self {
            id,
            state: Cell::new(State::Ready),
            dependents: RefCell::new(Vec::new()),
            slot: Cell::new(None),
        }
    }

    pub(crate) fn state(&self) -> State {
        self.state.get()
    }

    pub(crate) fn set_state(&self, state: State) {
        self.state.set(state);
    }

    /// True once the task has either completed or been discarded.
    pub(crate) fn is_done(&self) -> bool {
        matches!(self.state.get(), State::Completed | State::Discarded)
    }

    pub(crate) fn push_dependent(&self, task: Rc<dyn Runnable>) {
        self.dependents.borrow_mut().push(task);
    }

    /// Removes and returns every dependent, in registration order.
    pub(crate) fn take_dependents(&self) -> Vec<Rc<dyn Runnable>> {
        std::mem::take(&mut *self.dependents.borrow_mut())
    }

    pub(crate) fn set_slot(&self, slot: usize) {
        self.slot.set(Some(slot));
    }

    pub(crate) fn take_slot(&self) -> Option<usize> {
        self.slot.take()
    }
}

/// Outcome of resuming a continuation once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    Suspended,
    Finished,
}

/// Trait for objects that can be resumed as tasks by the run loop.
///
/// This trait is used internally to allow heterogeneous task types to be stored in the queue.
pub(crate) trait Runnable {
    fn header(&self) -> &Header;

    /// Polls the continuation once.
    fn resume(&self, cx: &mut Context<'_>) -> Step;

    /// Drops the continuation without running it to completion.
    ///
    /// Idempotent. Panics raised by destructors of the dropped future are
    /// swallowed.
    fn discard(&self);
}

/// A spawned task that wraps a future and supports generic output.
///
/// Tasks are created via [`Task::spawn`], [`create_task`] or
/// [`Runtime::create_task`](crate::Runtime::create_task) and are only ever
/// reachable from user code through their [`JoinHandle`].
///
/// # Type Parameters
///
/// * `T` - The output type of the wrapped future
pub struct Task<T> {
    header: Header,
    future: RefCell<Option<Pin<Box<dyn Future<Output = T>>>>>,
    result: RefCell<Option<T>>,
}

impl<T: 'static> Task<T> {
    pub(crate) fn new<F>(id: TaskId, fut: F) -> Rc<Self>
    where
        F: Future<Output = T> + 'static,
    {
        Rc::new(Task {
            header: Header::new(id),
            future: RefCell::new(Some(Box::pin(fut))),
            result: RefCell::new(None),
        })
    }

    pub(crate) fn id(&self) -> TaskId {
        self.header.id
    }

    pub(crate) fn take_result(&self) -> Option<T> {
        self.result.borrow_mut().take()
    }

    /// Spawns a task on the running runtime and returns a [`JoinHandle`].
    ///
    /// The new task is made ready immediately, behind every task that is
    /// already due. It does not run until the caller suspends.
    ///
    /// # Panics
    /// Panics if called outside of a runtime context.
    ///
    /// # Example
    /// ```ignore
    /// async fn example() {
    ///     let handle = Task::spawn(async { 7 });
    ///     assert_eq!(handle.await, 7);
    /// }
    /// ```
    pub fn spawn<F>(future: F) -> JoinHandle<T>
    where
        F: Future<Output = T> + 'static,
    {
        let scheduler = context::current()
            .unwrap_or_else(|| panic!("create_task() called outside of a runtime context"));

        scheduler.spawn(future)
    }
}

impl<T: 'static> Runnable for Task<T> {
    fn header(&self) -> &Header {
        &self.header
    }

    fn resume(&self, cx: &mut Context<'_>) -> Step {
        // The future is taken out for the duration of the poll so that code
        // running inside it may freely inspect this task (e.g. through a handle).
        let Some(mut future) = self.future.borrow_mut().take() else {
            return Step::Finished;
        };

        match future.as_mut().poll(cx) {
            Poll::Pending => {
                *self.future.borrow_mut() = Some(future);
                Step::Suspended
            }
            Poll::Ready(val) => {
                *self.result.borrow_mut() = Some(val);
                Step::Finished
            }
        }
    }

    fn discard(&self) {
        let future = self.future.borrow_mut().take();

        if let Some(future) = future
            && catch_unwind(AssertUnwindSafe(move || drop(future))).is_err()
        {
            warn!(task = %self.header.id, "panic while discarding task suppressed");
        }
    }
}

/// Spawns a task on the running runtime. Alias of [`Task::spawn`].
///
/// # Panics
/// Panics if called outside of a runtime context.
pub fn create_task<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + 'static,
    F::Output: 'static,
{
    Task::spawn(future)
}

/// A future that resolves when the associated task completes, returning the output value.
///
/// If the task has already finished, awaiting the handle returns its result
/// without suspending. Otherwise the awaiting task becomes a dependent of the
/// spawned task and is resumed right after it completes.
///
/// Dropping a handle detaches the task: it keeps running.
///
/// # Panics
/// Polling the handle again after it returned the result panics.
pub struct JoinHandle<T> {
    task: Rc<Task<T>>,
}

impl<T: 'static> JoinHandle<T> {
    pub(crate) fn new(task: Rc<Task<T>>) -> Self {
        Self { task }
    }

    /// Returns the id of the task this handle refers to.
    pub fn id(&self) -> TaskId {
        self.task.id()
    }

    /// Whether the task has run to completion.
    pub fn is_finished(&self) -> bool {
        self.task.header.state() == State::Completed
    }
}

impl<T: 'static> Future for JoinHandle<T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.is_finished() {
            return match self.task.take_result() {
                Some(result) => Poll::Ready(result),
                None => panic!("`JoinHandle` polled after completion"),
            };
        }

        let target: Rc<dyn Runnable> = self.task.clone();
        suspend(Command::Join(target));

        Poll::Pending
    }
}

impl<T> fmt::Debug for JoinHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinHandle")
            .field("id", &self.task.header.id)
            .field("state", &self.task.header.state())
            .finish()
    }
}

/// A helper to collect multiple [`JoinHandle`]s and await all of them at once.
///
/// Results come back in push order, whatever order the tasks finish in.
///
/// # Example
/// ```ignore
/// let mut set = JoinSet::new();
///
/// for i in 0..5 {
///     set.push(Task::spawn(async move { i * 2 }));
/// }
///
/// assert_eq!(set.join_all().await, vec![0, 2, 4, 6, 8]);
/// ```
pub struct JoinSet<T> {
    handles: Vec<JoinHandle<T>>,
}

impl<T: 'static> JoinSet<T> {
    /// Creates a new empty JoinSet.
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
        }
    }

    /// Adds a [`JoinHandle`] to the set.
    pub fn push(&mut self, handle: JoinHandle<T>) {
        self.handles.push(handle);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Awaits every handle in push order and collects their results.
    ///
    /// Handles are drained from the set as they complete.
    pub async fn join_all(&mut self) -> Vec<T> {
        let mut results = Vec::with_capacity(self.handles.len());

        for handle in self.handles.drain(..) {
            results.push(handle.await);
        }

        results
    }
}

impl<T: 'static> Default for JoinSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> FromIterator<JoinHandle<T>> for JoinSet<T> {
    fn from_iter<I: IntoIterator<Item = JoinHandle<T>>>(iter: I) -> Self {
        Self {
            handles: iter.into_iter().collect(),
        }
    }
}

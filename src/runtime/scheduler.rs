//! Scheduling state and the run loop.
//!
//! The scheduler owns the ready queue, the registry of unfinished tasks and
//! the slot through which a resumed task hands its suspension command back to
//! the loop. Everything here runs on one thread; the `RefCell`s are never
//! borrowed across a call into task code.

use crate::error::RuntimeError;
use crate::runtime::command::{Command, Yield};
use crate::runtime::queue::ReadyQueue;
use crate::runtime::waker::make_waker;
use crate::task::{Header, JoinHandle, Runnable, State, Step, Task, TaskId};
use crate::time::{Clock, deadline};
use crate::utils::Slab;

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::Context;
use std::time::Instant;

use tracing::{debug, trace, warn};

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) struct Scheduler {
    clock: Rc<dyn Clock>,
    ready: RefCell<ReadyQueue>,
    live: RefCell<Slab<Rc<dyn Runnable>>>,
    yielded: RefCell<Yield>,
    running: Cell<bool>,
}

impl Scheduler {
    pub(crate) fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            ready: RefCell::new(ReadyQueue::new()),
            live: RefCell::new(Slab::new()),
            yielded: RefCell::new(Yield::Empty),
            running: Cell::new(false),
        }
    }

    pub(crate) fn now(&self) -> Instant {
        self.clock.now()
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.get()
    }

    pub(crate) fn set_running(&self, running: bool) {
        self.running.set(running);
    }

    /// Number of tasks that have neither completed nor been discarded.
    pub(crate) fn pending_tasks(&self) -> usize {
        self.live.borrow().len()
    }

    /// Wraps `future` in a task, registers it and makes it ready now.
    pub(crate) fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + 'static,
        F::Output: 'static,
    {
        JoinHandle::new(self.spawn_task(future))
    }

    pub(crate) fn spawn_task<F>(&self, future: F) -> Rc<Task<F::Output>>
    where
        F: Future + 'static,
        F::Output: 'static,
    {
        let id = TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed));
        let task = Task::new(id, future);
        let runnable: Rc<dyn Runnable> = task.clone();

        let slot = self.live.borrow_mut().insert(runnable.clone());
        runnable.header().set_slot(slot);

        trace!(task = %id, "spawn");
        self.schedule_now(runnable);

        task
    }

    pub(crate) fn schedule_now(&self, task: Rc<dyn Runnable>) {
        self.schedule_at(self.clock.now(), task);
    }

    pub(crate) fn schedule_at(&self, wake_at: Instant, task: Rc<dyn Runnable>) {
        task.header().set_state(State::Ready);
        self.ready.borrow_mut().push(wake_at, task);
    }

    /// Records the command of the task currently being resumed.
    pub(crate) fn deposit(&self, command: Command) {
        let mut slot = self.yielded.borrow_mut();

        *slot = match std::mem::replace(&mut *slot, Yield::Empty) {
            Yield::Empty => Yield::Command(command),
            Yield::Command(_) | Yield::Conflict => Yield::Conflict,
        };
    }

    fn take_yield(&self) -> Yield {
        std::mem::replace(&mut *self.yielded.borrow_mut(), Yield::Empty)
    }

    /// Drops the registry entry of a finished task.
    fn retire(&self, header: &Header) {
        if let Some(slot) = header.take_slot() {
            let removed = self.live.borrow_mut().remove(slot);
            drop(removed);
        }
    }

    /// Runs tasks until the primary task finishes (or, with `wait_for_all`,
    /// until the ready queue drains).
    pub(crate) fn drive<T: 'static>(
        &self,
        primary: &Rc<Task<T>>,
        wait_for_all: bool,
    ) -> Result<T, RuntimeError> {
        let mut output = None;

        loop {
            let next = self.ready.borrow_mut().pop();
            let Some((wake_at, task)) = next else {
                break;
            };

            // Discarded while it was still queued.
            if task.header().is_done() {
                continue;
            }

            if wake_at > self.clock.now() {
                self.clock.sleep_until(wake_at);
            }

            let id = task.header().id;
            let waker = make_waker(id);
            let mut cx = Context::from_waker(&waker);

            trace!(task = %id, "resume");
            let step = task.resume(&mut cx);

            match (step, self.take_yield()) {
                (Step::Finished, Yield::Empty) => {
                    self.complete(&task);

                    if id == primary.id() {
                        debug!(task = %id, "primary task finished");
                        output = primary.take_result();

                        if !wait_for_all {
                            break;
                        }
                    }
                }
                (Step::Finished, _) => {
                    return Err(self.violation(id, "task finished after requesting suspension"));
                }
                (Step::Suspended, Yield::Empty) => {
                    return Err(self.violation(id, "task suspended without a suspension command"));
                }
                (Step::Suspended, Yield::Conflict) => {
                    return Err(self.violation(
                        id,
                        "more than one suspension command in a single resume",
                    ));
                }
                (Step::Suspended, Yield::Command(command)) => self.apply(task, command)?,
            }
        }

        match output {
            Some(output) => {
                let parked = self.pending_tasks();
                if wait_for_all && parked > 0 {
                    warn!(parked, "ready queue drained with tasks still parked");
                }
                Ok(output)
            }
            None => {
                warn!(task = %primary.id(), "ready queue drained before the primary task finished");
                Err(RuntimeError::Stalled { task: primary.id() })
            }
        }
    }

    /// Files a suspended task under the command it deposited.
    fn apply(&self, task: Rc<dyn Runnable>, command: Command) -> Result<(), RuntimeError> {
        let id = task.header().id;
        trace!(task = %id, ?command, "suspend");

        match command {
            Command::Sleep(duration) => {
                let wake_at = deadline(self.clock.now(), duration);
                self.schedule_at(wake_at, task);
            }
            Command::Join(target) => {
                let joined = target.header();

                if joined.id == id {
                    return Err(self.violation(id, "task joined itself"));
                }

                match joined.state() {
                    State::Completed => self.schedule_now(task),
                    State::Discarded => {
                        self.cancel(task);
                    }
                    State::Ready | State::Suspended => {
                        task.header().set_state(State::Suspended);
                        joined.push_dependent(task);
                    }
                }
            }
            Command::WaitEvent(event) => {
                if event.is_set() {
                    self.schedule_now(task);
                } else {
                    task.header().set_state(State::Suspended);
                    event.park(task);
                }
            }
        }

        Ok(())
    }

    /// Marks a task completed and moves its dependents to the ready queue.
    fn complete(&self, task: &Rc<dyn Runnable>) {
        let header = task.header();
        header.set_state(State::Completed);
        self.retire(header);

        let now = self.clock.now();
        for dependent in header.take_dependents() {
            if !dependent.header().is_done() {
                self.schedule_at(now, dependent);
            }
        }
    }

    /// Discards `root` and, transitively, every task waiting on it.
    ///
    /// Tasks that already completed or were discarded are skipped, so
    /// overlapping dependency chains are walked once. Returns the number of
    /// tasks discarded.
    pub(crate) fn cancel(&self, root: Rc<dyn Runnable>) -> usize {
        let mut stack = vec![root];
        let mut discarded = 0;

        while let Some(task) = stack.pop() {
            let header = task.header();
            if header.is_done() {
                continue;
            }

            header.set_state(State::Discarded);
            stack.extend(header.take_dependents());
            self.retire(header);

            trace!(task = %header.id, "discard");
            task.discard();
            discarded += 1;
        }

        discarded
    }

    /// Discards every unfinished task, leaving the scheduler empty.
    ///
    /// Destructors of discarded tasks may spawn new tasks; those are
    /// discarded as well.
    pub(crate) fn shutdown(&self) -> usize {
        let mut discarded = 0;

        loop {
            let queued = self.ready.borrow_mut().drain();
            let live = self.live.borrow_mut().drain();

            if queued.is_empty() && live.is_empty() {
                break;
            }

            // Slots are released up front so a task spawned during a discard
            // cannot inherit an index that a stale header still points to.
            for task in &live {
                task.header().take_slot();
            }

            for task in queued.into_iter().chain(live) {
                discarded += self.cancel(task);
            }
        }

        self.take_yield();

        discarded
    }

    fn violation(&self, task: TaskId, reason: &str) -> RuntimeError {
        warn!(task = %task, reason, "protocol violation, aborting run");

        RuntimeError::ProtocolViolation {
            task,
            reason: reason.to_string(),
        }
    }
}

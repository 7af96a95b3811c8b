//! Level-triggered notification between tasks.
//!
//! An [`Event`] is a boolean flag plus the tasks currently waiting for it to
//! become true. Setting the flag makes every waiter ready at once, in the
//! order they started waiting; waiting on an event that is already set does
//! not suspend at all.
//!
//! # Example
//!
//! ```ignore
//! use reactor::{Event, Task, sleep};
//! use std::time::Duration;
//!
//! async fn main_task() {
//!     let event = Event::new();
//!     let waiter = event.clone();
//!
//!     let handle = Task::spawn(async move {
//!         waiter.wait().await;
//!         println!("released");
//!     });
//!
//!     sleep(Duration::from_secs(1)).await;
//!     event.set();
//!     handle.await;
//! }
//! ```

use crate::runtime::command::{Command, suspend};
use crate::runtime::context;
use crate::task::Runnable;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

#[derive(Default)]
struct Inner {
    flag: Cell<bool>,
    waiters: RefCell<Vec<Rc<dyn Runnable>>>,
}

/// A level-triggered event. Clones refer to the same event.
#[derive(Clone, Default)]
pub struct Event {
    inner: Rc<Inner>,
}

impl Event {
    /// Creates an event whose flag is cleared.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.inner.flag.get()
    }

    /// Sets the flag and makes every current waiter ready.
    ///
    /// Setting an event that is already set only re-affirms the flag.
    pub fn set(&self) {
        self.inner.flag.set(true);

        let waiters = std::mem::take(&mut *self.inner.waiters.borrow_mut());
        if waiters.is_empty() {
            return;
        }

        // Waiters only exist while their run is active; outside a run they
        // have all been discarded already.
        if let Some(scheduler) = context::current() {
            let now = scheduler.now();

            for waiter in waiters {
                if !waiter.header().is_done() {
                    scheduler.schedule_at(now, waiter);
                }
            }
        }
    }

    /// Clears the flag. Tasks already released by [`set`](Self::set) are unaffected.
    pub fn clear(&self) {
        self.inner.flag.set(false);
    }

    /// Waits until the flag is set.
    ///
    /// Resolves without suspending if the flag is already set.
    pub fn wait(&self) -> EventWait {
        EventWait {
            event: self.clone(),
            yielded: false,
        }
    }

    /// Number of tasks currently parked on this event.
    pub fn waiter_count(&self) -> usize {
        self.inner
            .waiters
            .borrow()
            .iter()
            .filter(|waiter| !waiter.header().is_done())
            .count()
    }

    pub(crate) fn park(&self, task: Rc<dyn Runnable>) {
        self.inner.waiters.borrow_mut().push(task);
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("set", &self.is_set())
            .field("waiters", &self.waiter_count())
            .finish()
    }
}

/// Future returned by [`Event::wait`].
#[derive(Debug)]
#[must_use = "futures do nothing unless you `.await` them"]
pub struct EventWait {
    event: Event,
    yielded: bool,
}

impl Future for EventWait {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
        // A waiter released by `set` proceeds even if the flag has been
        // cleared again since.
        if self.yielded || self.event.is_set() {
            return Poll::Ready(());
        }

        self.yielded = true;
        suspend(Command::WaitEvent(self.event.clone()));

        Poll::Pending
    }
}

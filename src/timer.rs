//! Timed suspension.
//!
//! Provides `sleep()` to create futures that resolve after a specified
//! duration. A sleeping task is not polled at all until its deadline: the run
//! loop files it in the ready queue under its wake time and blocks on the
//! clock when nothing else is due.

use crate::runtime::command::{Command, suspend};

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

/// A future that completes after a specified duration.
///
/// Created via the `sleep()` function. The first poll asks the run loop to
/// reschedule the task `duration` from now and yields; the next poll, which
/// only happens once the duration has elapsed, completes.
#[derive(Debug)]
#[must_use = "futures do nothing unless you `.await` them"]
pub struct Sleep {
    duration: Duration,
    yielded: bool,
}

impl Sleep {
    /// Creates a new sleep future with the given duration.
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            yielded: false,
        }
    }
}

impl Future for Sleep {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.yielded {
            return Poll::Ready(());
        }

        self.yielded = true;
        suspend(Command::Sleep(self.duration));

        Poll::Pending
    }
}

/// Sleeps for the specified duration.
///
/// Always suspends, even for a zero duration, so `sleep(Duration::ZERO)` lets
/// every other due task run first.
///
/// # Panics
/// Awaiting the returned future outside of a runtime context panics.
///
/// # Example
/// ```ignore
/// use reactor::sleep;
/// use std::time::Duration;
///
/// async {
///     sleep(Duration::from_millis(100)).await;
///     println!("Woke up after 100ms");
/// };
/// ```
pub fn sleep(duration: Duration) -> Sleep {
    Sleep::new(duration)
}

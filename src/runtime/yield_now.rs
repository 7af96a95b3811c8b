use crate::timer::{Sleep, sleep};

use std::time::Duration;

/// Cooperative scheduler hint: yields once to let other tasks run.
///
/// The current task is requeued with a zero delay, so every task that is
/// already due runs before it resumes.
pub fn yield_now() -> Sleep {
    sleep(Duration::ZERO)
}

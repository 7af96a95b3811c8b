//! Spawn a batch of futures and wait for all of them.

use crate::task::{JoinSet, create_task};

use std::future::Future;

/// Spawns one task per future, in iteration order, and resolves to their
/// results in that same order.
///
/// The tasks are spawned eagerly when `gather` is called and run
/// interleaved; the order in which they finish does not affect the order of
/// the returned results. Built purely from [`create_task`] and joins.
///
/// # Panics
/// Panics if called outside of a runtime context.
///
/// # Example
/// ```ignore
/// let results = gather((1..=3).map(|n| async move { n * 10 })).await;
/// assert_eq!(results, vec![10, 20, 30]);
/// ```
pub fn gather<I, F>(futures: I) -> impl Future<Output = Vec<F::Output>>
where
    I: IntoIterator<Item = F>,
    F: Future + 'static,
    F::Output: 'static,
{
    let mut set: JoinSet<F::Output> = futures.into_iter().map(create_task).collect();

    async move { set.join_all().await }
}

//! Timeout enforcement.
//!
//! # Responsibilities
//! - Race a protected operation against a deadline
//! - Cancel the timer as soon as the operation settles
//! - Leave a slow operation running when the deadline wins
//!
//! # Design Decisions
//! - The operation runs in its own Tokio task, so neither the deadline nor a
//!   caller dropping the wait can cancel its side effects
//! - The timer is a `tokio::time::sleep` dropped by `select!` when it loses
//! - Timeouts are distinct from operation errors

use std::any::Any;
use std::future::Future;
use std::time::Duration;

/// How a deadline race settled.
pub enum Settled<T, E> {
    /// The operation finished before the deadline.
    Completed(Result<T, E>),
    /// The deadline fired first; the operation keeps running detached.
    Elapsed,
    /// The operation task panicked; the payload can be resumed by the caller.
    Panicked(Box<dyn Any + Send + 'static>),
    /// The operation task was cancelled (runtime shutting down).
    Aborted,
}

impl<T, E> std::fmt::Debug for Settled<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Settled::Completed(Ok(_)) => f.write_str("Completed(Ok)"),
            Settled::Completed(Err(_)) => f.write_str("Completed(Err)"),
            Settled::Elapsed => f.write_str("Elapsed"),
            Settled::Panicked(_) => f.write_str("Panicked"),
            Settled::Aborted => f.write_str("Aborted"),
        }
    }
}

/// Run `future` on its own task and wait at most `limit` for it.
///
/// Whichever settles first wins. When the operation wins, the pending timer
/// is dropped before returning. When the timer wins, the task's join handle
/// is released and its eventual output is discarded.
pub async fn execute_with_timeout<Fut, T, E>(future: Fut, limit: Duration) -> Settled<T, E>
where
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let mut task = tokio::spawn(future);
    let timer = tokio::time::sleep(limit);
    tokio::pin!(timer);

    tokio::select! {
        joined = &mut task => match joined {
            Ok(result) => Settled::Completed(result),
            Err(e) if e.is_panic() => Settled::Panicked(e.into_panic()),
            Err(_) => Settled::Aborted,
        },
        _ = &mut timer => {
            tracing::debug!(timeout_ms = limit.as_millis() as u64, "Operation exceeded deadline");
            Settled::Elapsed
        }
    }
}

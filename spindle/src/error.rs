use crate::task::TaskId;

use thiserror::Error;

/// Errors reported by the event loop and its tasks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A task was resumed after it had already signalled completion.
    ///
    /// The loop never does this: a finished task is dropped on the spot.
    /// It can only happen when a [`Task`](crate::task::Task) is driven by hand.
    #[error("task {0} was resumed after it completed")]
    ResumedAfterCompletion(TaskId),

    /// The loop drained before the task handed to
    /// [`Loop::run_task`](crate::Loop::run_task) completed.
    ///
    /// This happens when the task is parked on a primitive that nothing
    /// will ever resolve.
    #[error("loop drained with {parked} task(s) still parked before the task completed")]
    Stalled { parked: usize },

    /// [`Loop::run_bounded`](crate::Loop::run_bounded) gave up.
    #[error("loop did not drain within {turns} turns")]
    TurnLimitExceeded { turns: usize },

    /// An operation that needs the current loop ran outside of one.
    #[error("no event loop is running on this thread")]
    NoCurrentLoop,

    #[error("unknown idle strategy `{0}`, expected `spin` or `park`")]
    UnknownIdleStrategy(String),
}

/// Result type used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

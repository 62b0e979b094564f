/// Scheduling state of a [`Task`](super::Task).
///
/// A task moves between `Ready` and `Waiting` any number of times and
/// ends in `Finished`, which it never leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// The task can be resumed: it sits in a ready-queue, or is about to.
    Ready,

    /// The task is parked on a [`Future`](crate::sync::Future) and will be
    /// re-queued when that future is set.
    Waiting,

    /// The task ran to completion. Its body has been dropped.
    Finished,
}

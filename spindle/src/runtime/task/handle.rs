use super::TaskId;
use crate::sync::{Future, Wait};

use std::cell::RefCell;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

/// A handle to a spawned task.
///
/// A `JoinHandle` allows awaiting the result of a task spawned onto a
/// loop. It resolves once the task has completed. Completion is carried
/// by a one-shot [`Future`], so a task awaiting the handle is parked
/// rather than polled every turn.
///
/// Dropping the `JoinHandle` does **not** cancel the task; it only
/// discards the ability to observe its result.
pub struct JoinHandle<T> {
    /// Identifier of the spawned task.
    pub(crate) id: TaskId,

    /// Set by the task right after it stores its output.
    pub(crate) done: Future,

    /// Output slot filled by the task on completion.
    pub(crate) output: Rc<RefCell<Option<T>>>,

    /// Suspension on `done`, created on first pending poll.
    pub(crate) wait: Option<Wait>,
}

impl<T> JoinHandle<T> {
    /// Returns the identifier of the spawned task.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Returns `true` once the task has completed.
    pub fn is_finished(&self) -> bool {
        self.done.is_done()
    }

    /// Takes the output if the task has completed and it was not taken yet.
    pub(crate) fn try_take(&self) -> Option<T> {
        self.output.borrow_mut().take()
    }
}

impl<T> std::future::Future for JoinHandle<T> {
    type Output = T;

    /// Polls the join handle.
    ///
    /// If the task already completed, its output is returned immediately.
    /// Otherwise the current task suspends on the completion future.
    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        let this = self.get_mut();

        if this.done.is_done() {
            let value = this.try_take().expect("join handle polled after completion");
            return Poll::Ready(value);
        }

        let wait = this.wait.get_or_insert_with(|| this.done.wait());
        match Pin::new(wait).poll(cx) {
            Poll::Ready(()) => {
                let value = this.try_take().expect("join handle polled after completion");
                Poll::Ready(value)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

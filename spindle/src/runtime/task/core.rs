use super::state::TaskState;
use crate::error::{Error, Result};
use crate::runtime::context;
use crate::sync::Future;

use log::trace;

use std::fmt;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll, Waker};

/// Source of task identifiers, shared by every loop in the process.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier of a [`Task`], unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Why a task stopped at a suspension point.
///
/// Leaf awaitables record one of these right before returning
/// `Poll::Pending`; the task surfaces it as a [`Step`].
#[derive(Debug, Clone)]
pub enum Suspend {
    /// Plain cooperative yield: resume me on a later turn.
    Yield,

    /// Resume me only once this future has been set.
    Wait(Future),
}

/// Outcome of resuming a task once.
#[derive(Debug)]
pub enum Step<T> {
    /// The task yielded cooperatively and wants to run again.
    Yielded,

    /// The task is waiting for the given future to be set.
    Waiting(Future),

    /// The task ran to completion and produced a value.
    Complete(T),
}

impl<T> Step<T> {
    /// Returns `true` for [`Step::Complete`].
    pub fn is_complete(&self) -> bool {
        matches!(self, Step::Complete(_))
    }
}

/// A resumable unit of cooperative work.
///
/// A `Task` owns a future and advances it one suspension point at a time
/// through [`resume`](Self::resume). Every `Poll::Pending` of the inner
/// future, however deeply nested, surfaces as exactly one [`Step`], so
/// awaiting another async function forwards its suspension points outward
/// one by one and in order.
///
/// Tasks are usually handed to a [`Loop`](crate::Loop), which resumes them
/// in FIFO order, but they can also be driven by hand:
///
/// ```rust
/// use spindle::task::{Step, Task};
/// use spindle::yield_now;
///
/// let mut task = Task::new(async {
///     yield_now().await;
///     7
/// });
///
/// assert!(matches!(task.resume(), Ok(Step::Yielded)));
/// assert!(matches!(task.resume(), Ok(Step::Complete(7))));
/// assert!(task.resume().is_err());
/// ```
pub struct Task<T = ()> {
    /// Process-unique identifier, used for logging.
    id: TaskId,

    /// Current scheduling state.
    state: TaskState,

    /// Future the task is parked on while `Waiting`.
    awaiting: Option<Future>,

    /// The task body. `None` once the task has finished.
    future: Option<Pin<Box<dyn std::future::Future<Output = T>>>>,
}

impl<T> Task<T> {
    /// Wraps a future into a new task in the `Ready` state.
    pub fn new<F>(future: F) -> Self
    where
        F: std::future::Future<Output = T> + 'static,
    {
        Self {
            id: TaskId::next(),
            state: TaskState::Ready,
            awaiting: None,
            future: Some(Box::pin(future)),
        }
    }

    /// Returns the identifier of this task.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the current scheduling state.
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Returns `true` once the task has run to completion.
    pub fn is_finished(&self) -> bool {
        self.state == TaskState::Finished
    }

    /// Returns the future this task is parked on, if it is `Waiting`.
    pub fn awaited(&self) -> Option<&Future> {
        self.awaiting.as_ref()
    }

    /// Advances the task to its next suspension point or to completion.
    ///
    /// A pending poll that left no explicit signal (for instance a foreign
    /// future, or a readiness check that failed) is reported as a plain
    /// [`Step::Yielded`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResumedAfterCompletion`] if the task already
    /// finished. The body is not polled again.
    ///
    /// # Panics
    ///
    /// Panics if the task is `Waiting` on a future that is not set yet.
    pub fn resume(&mut self) -> Result<Step<T>> {
        let Some(future) = self.future.as_mut() else {
            return Err(Error::ResumedAfterCompletion(self.id));
        };

        if let Some(awaited) = self.awaiting.take() {
            assert!(
                awaited.is_done(),
                "task resumed while the future it awaits is still unset"
            );
        }

        // A stale signal can only come from a future polled outside a task.
        context::take_suspension();

        trace!("resuming task {}", self.id);

        let mut cx = Context::from_waker(Waker::noop());

        match future.as_mut().poll(&mut cx) {
            Poll::Ready(value) => {
                self.future = None;
                self.state = TaskState::Finished;

                Ok(Step::Complete(value))
            }
            Poll::Pending => match context::take_suspension() {
                Some(Suspend::Wait(future)) => {
                    self.state = TaskState::Waiting;
                    self.awaiting = Some(future.clone());
                    Ok(Step::Waiting(future))
                }
                Some(Suspend::Yield) | None => {
                    self.state = TaskState::Ready;
                    Ok(Step::Yielded)
                }
            },
        }
    }

    /// Marks a parked task as runnable again.
    pub(crate) fn wake(&mut self) {
        if self.state == TaskState::Waiting {
            self.state = TaskState::Ready;
            self.awaiting = None;
        }
    }
}

impl<T> fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::yield_now;

    use std::cell::RefCell;
    use std::rc::Rc;

    async fn two_yields(log: Rc<RefCell<Vec<&'static str>>>) {
        log.borrow_mut().push("inner start");
        yield_now().await;
        log.borrow_mut().push("inner middle");
        yield_now().await;
        log.borrow_mut().push("inner end");
    }

    #[test]
    fn nested_await_forwards_each_suspension() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let outer_log = log.clone();

        let mut task = Task::new(async move {
            two_yields(outer_log.clone()).await;
            outer_log.borrow_mut().push("done");
        });

        let mut suspensions = 0;
        loop {
            match task.resume().unwrap() {
                Step::Yielded => suspensions += 1,
                Step::Waiting(_) => panic!("no future is awaited"),
                Step::Complete(()) => break,
            }
        }

        assert_eq!(suspensions, 2);
        assert_eq!(
            *log.borrow(),
            vec!["inner start", "inner middle", "inner end", "done"]
        );
    }

    #[test]
    fn resume_after_completion_is_an_error() {
        let mut task = Task::new(async { 1 });
        let id = task.id();

        assert!(matches!(task.resume(), Ok(Step::Complete(1))));
        assert!(task.is_finished());
        assert_eq!(task.resume().unwrap_err(), Error::ResumedAfterCompletion(id));
    }

    #[test]
    fn waiting_step_carries_the_future() {
        let future = Future::new();
        let awaited = future.clone();

        let mut task = Task::new(async move { awaited.await });

        match task.resume().unwrap() {
            Step::Waiting(f) => assert!(f.ptr_eq(&future)),
            other => panic!("unexpected step {other:?}"),
        }
        assert_eq!(task.state(), TaskState::Waiting);

        future.set();
        assert!(task.resume().unwrap().is_complete());
    }

    #[test]
    fn foreign_pending_counts_as_yield() {
        let mut polled = false;
        let mut task = Task::new(std::future::poll_fn(move |_| {
            if polled {
                Poll::Ready(())
            } else {
                polled = true;
                Poll::Pending
            }
        }));

        assert!(matches!(task.resume(), Ok(Step::Yielded)));
        assert!(matches!(task.resume(), Ok(Step::Complete(()))));
    }

    #[test]
    #[should_panic(expected = "still unset")]
    fn premature_resume_is_rejected() {
        let future = Future::new();
        let mut task = Task::new(future.wait());

        assert!(matches!(task.resume(), Ok(Step::Waiting(_))));
        assert!(task.awaited().is_some_and(|f| f.ptr_eq(&future)));

        let _ = task.resume();
    }

    #[test]
    fn repolled_wait_records_its_future_again() {
        let future = Future::new();
        let mut wait = Box::pin(future.wait());
        let mut yielded = false;

        // Polls the wait alongside a one-shot yield, like a join would.
        let mut task = Task::new(std::future::poll_fn(move |cx| {
            let waited = std::future::Future::poll(wait.as_mut(), cx).is_ready();

            if !yielded {
                yielded = true;
                context::suspend(Suspend::Yield);
                return Poll::Pending;
            }

            if waited { Poll::Ready(()) } else { Poll::Pending }
        }));

        assert!(matches!(task.resume(), Ok(Step::Yielded)));
        assert!(task.awaited().is_none());

        match task.resume() {
            Ok(Step::Waiting(f)) => assert!(f.ptr_eq(&future)),
            other => panic!("unexpected step {other:?}"),
        }

        future.set();
        assert!(matches!(task.resume(), Ok(Step::Complete(()))));
    }

    #[test]
    fn task_ids_are_unique() {
        let a = Task::new(async {});
        let b = Task::new(async {});

        assert_ne!(a.id(), b.id());
    }
}

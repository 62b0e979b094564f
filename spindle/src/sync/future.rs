use crate::runtime::context;
use crate::runtime::core::Handle;
use crate::task::{Suspend, Task};

use log::trace;

use std::cell::RefCell;
use std::fmt;
use std::future::IntoFuture;
use std::mem;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

/// A one-shot completion signal.
///
/// A `Future` starts unset. Awaiting it suspends the current task, which
/// the loop then parks on this future instead of re-queueing it. Calling
/// [`set`](Self::set) marks the future done, for good, and hands every
/// parked task back to the ready-queue of the loop that parked it.
///
/// `Future` is a cheap, cloneable handle: clones share the same state.
///
/// Several tasks may await the same future; all of them are re-queued, in
/// the order they were parked, when it is set.
///
/// # Examples
///
/// ```rust
/// use spindle::Loop;
/// use spindle::sync::Future;
///
/// let mut event_loop = Loop::new();
/// let future = Future::new();
///
/// let waiting = future.clone();
/// event_loop.add_task(async move {
///     waiting.await;
///     println!("released");
/// });
///
/// let setter = future.clone();
/// event_loop.add_task(async move { setter.set() });
///
/// event_loop.run();
/// assert!(future.is_done());
/// ```
#[derive(Clone, Default)]
pub struct Future {
    inner: Rc<RefCell<Inner>>,
}

#[derive(Default)]
struct Inner {
    /// Monotonic: once true, never reset.
    done: bool,

    /// Parked tasks, each with the loop that must resume it.
    waiters: Vec<(Task, Handle)>,
}

impl Future {
    /// Creates a new, unset future.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` once [`set`](Self::set) has been called.
    pub fn is_done(&self) -> bool {
        self.inner.borrow().done
    }

    /// Marks the future done and re-queues every parked task.
    ///
    /// Setting an already set future has no further effect.
    pub fn set(&self) {
        let waiters = {
            let mut inner = self.inner.borrow_mut();
            inner.done = true;
            mem::take(&mut inner.waiters)
        };

        for (mut task, handle) in waiters {
            trace!("future set, re-queueing task {}", task.id());

            task.wake();
            handle.unpark();
            handle.schedule(task);
        }
    }

    /// Returns a future that suspends the current task until this one is
    /// set. Equivalent to `.await`-ing a clone.
    pub fn wait(&self) -> Wait {
        Wait {
            future: self.clone(),
            suspended: false,
        }
    }

    /// Returns `true` if both handles refer to the same future.
    pub fn ptr_eq(&self, other: &Future) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of tasks currently parked on this future.
    pub fn waiting(&self) -> usize {
        self.inner.borrow().waiters.len()
    }

    /// Parks `task` on this future.
    ///
    /// A task that suspended on a future which is already set goes straight
    /// back to the ready-queue instead of being parked forever.
    pub(crate) fn attach(&self, mut task: Task, handle: &Handle) {
        let mut inner = self.inner.borrow_mut();

        if inner.done {
            drop(inner);

            task.wake();
            handle.schedule(task);
            return;
        }

        trace!("task {} parked on a future", task.id());

        handle.park();
        inner.waiters.push((task, handle.clone()));
    }
}

impl fmt::Debug for Future {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();

        f.debug_struct("Future")
            .field("done", &inner.done)
            .field("waiting", &inner.waiters.len())
            .finish()
    }
}

impl IntoFuture for Future {
    type Output = ();
    type IntoFuture = Wait;

    fn into_future(self) -> Wait {
        Wait {
            future: self,
            suspended: false,
        }
    }
}

impl IntoFuture for &Future {
    type Output = ();
    type IntoFuture = Wait;

    fn into_future(self) -> Wait {
        self.wait()
    }
}

/// Suspension on a [`Future`], returned by [`Future::wait`].
///
/// The first poll always suspends, handing the future to the scheduler.
/// Later polls complete once the future is set, and suspend on it again
/// otherwise.
pub struct Wait {
    future: Future,
    suspended: bool,
}

impl std::future::Future for Wait {
    type Output = ();

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();

        if this.suspended && this.future.is_done() {
            return Poll::Ready(());
        }

        this.suspended = true;
        context::suspend(Suspend::Wait(this.future.clone()));

        Poll::Pending
    }
}

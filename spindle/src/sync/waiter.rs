use crate::runtime::context;
use crate::task::Suspend;

use log::warn;

use std::cell::Cell;
use std::future::IntoFuture;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

/// A counting rendezvous.
///
/// A `Waiter` is created with a required count `n`. Each call to
/// [`set`](Self::set) decrements it; a task awaiting the waiter resumes
/// only once the count reaches zero.
///
/// Unlike [`Future`](super::Future), awaiting a waiter does not park the
/// task: it yields plainly every turn and re-checks the count when
/// resumed. Cloning shares the count.
#[derive(Clone, Debug)]
pub struct Waiter {
    remaining: Rc<Cell<usize>>,
}

impl Waiter {
    /// Creates a waiter that releases after `n` calls to `set`.
    pub fn new(n: usize) -> Self {
        Self {
            remaining: Rc::new(Cell::new(n)),
        }
    }

    /// Decrements the remaining count.
    ///
    /// The count stays at zero once there; extra calls are logged.
    pub fn set(&self) {
        match self.remaining.get() {
            0 => warn!("waiter set more times than its initial count"),
            n => self.remaining.set(n - 1),
        }
    }

    /// Number of `set` calls still required.
    pub fn remaining(&self) -> usize {
        self.remaining.get()
    }

    /// Returns `true` once the count reached zero.
    pub fn is_released(&self) -> bool {
        self.remaining.get() == 0
    }

    /// Returns a future that completes once the count reaches zero.
    pub fn wait(&self) -> WaiterWait {
        WaiterWait {
            remaining: self.remaining.clone(),
        }
    }
}

impl IntoFuture for Waiter {
    type Output = ();
    type IntoFuture = WaiterWait;

    fn into_future(self) -> WaiterWait {
        WaiterWait {
            remaining: self.remaining,
        }
    }
}

impl IntoFuture for &Waiter {
    type Output = ();
    type IntoFuture = WaiterWait;

    fn into_future(self) -> WaiterWait {
        self.wait()
    }
}

/// Future returned by [`Waiter::wait`].
pub struct WaiterWait {
    remaining: Rc<Cell<usize>>,
}

impl std::future::Future for WaiterWait {
    type Output = ();

    /// Completes immediately when the count is zero, otherwise yields
    /// cooperatively so the check runs again on a later turn.
    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.remaining.get() == 0 {
            return Poll::Ready(());
        }

        context::suspend(Suspend::Yield);
        cx.waker().wake_by_ref();

        Poll::Pending
    }
}

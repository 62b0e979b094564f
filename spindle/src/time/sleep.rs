use crate::runtime::core::Handle;
use crate::sync::{Future, Wait};

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

/// Creates a future that completes after the given duration.
///
/// The deadline is fixed when `sleep` is called. On first poll the sleep
/// registers a timer with the current loop and parks the task on a
/// [`Future`], so sleeping tasks cost nothing until their deadline: only
/// the loop looks at the clock, and only at the earliest deadline.
///
/// # Panics
///
/// Panics if polled outside of a running loop.
///
/// # Examples
///
/// ```rust,ignore
/// use std::time::Duration;
///
/// sleep(Duration::from_millis(10)).await;
/// ```
pub fn sleep(duration: Duration) -> Sleep {
    sleep_until(Instant::now() + duration)
}

/// Creates a future that completes once `deadline` has passed.
///
/// # Panics
///
/// Panics if polled outside of a running loop.
pub fn sleep_until(deadline: Instant) -> Sleep {
    Sleep {
        deadline,
        future: Future::new(),
        wait: None,
    }
}

/// A future that completes once a specific deadline is reached.
///
/// Even a deadline already in the past goes through the timer heap, so
/// awaiting a `Sleep` always suspends at least once.
pub struct Sleep {
    /// Absolute point in time when the sleep completes.
    deadline: Instant,

    /// Set by the loop when the deadline passes.
    future: Future,

    /// Suspension on `future`, present once the timer is registered.
    wait: Option<Wait>,
}

impl Sleep {
    /// Returns the instant at which this sleep completes.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }
}

impl std::future::Future for Sleep {
    type Output = ();

    /// Polls the sleep future.
    ///
    /// On the first poll, the timer is registered with the loop via
    /// [`Handle::call_later`].
    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        let wait = this.wait.get_or_insert_with(|| {
            Handle::try_current()
                .expect("Sleep polled outside of a running loop")
                .call_later(this.deadline, this.future.clone());

            this.future.wait()
        });

        Pin::new(wait).poll(cx)
    }
}

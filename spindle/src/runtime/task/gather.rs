use crate::runtime::core::Handle;
use crate::sync::Waiter;

use log::debug;

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

/// Runs every future concurrently on the current loop and waits for all
/// of them.
///
/// Each input is wrapped in a task that stores its output and then sets a
/// shared [`Waiter`]; all wrappers are added to the ready-queue before the
/// caller suspends on the waiter. The inputs are therefore interleaved by
/// the scheduler rather than run one after the other. Outputs are returned
/// in input order, whatever order the tasks finished in.
///
/// # Panics
///
/// Panics if polled outside of a running loop. Use [`Handle::gather`] to
/// target a loop explicitly.
///
/// # Examples
///
/// ```rust
/// use spindle::{Loop, gather, yield_now};
///
/// let mut event_loop = Loop::new();
/// let sums = event_loop
///     .run_task(async {
///         gather((1..=3).map(|n| async move {
///             yield_now().await;
///             n * 10
///         }))
///         .await
///     })
///     .unwrap();
///
/// assert_eq!(sums, vec![10, 20, 30]);
/// ```
pub async fn gather<I, F, T>(futures: I) -> Vec<T>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = T> + 'static,
    T: 'static,
{
    let handle = Handle::try_current().expect("gather polled outside of a running loop");
    gather_on(&handle, futures).await
}

/// Shared implementation of [`gather`] and [`Handle::gather`].
pub(crate) async fn gather_on<I, F, T>(handle: &Handle, futures: I) -> Vec<T>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = T> + 'static,
    T: 'static,
{
    let futures: Vec<F> = futures.into_iter().collect();
    let count = futures.len();

    let waiter = Waiter::new(count);
    let slots: Rc<RefCell<Vec<Option<T>>>> =
        Rc::new(RefCell::new((0..count).map(|_| None).collect()));

    for (index, future) in futures.into_iter().enumerate() {
        let waiter = waiter.clone();
        let slots = slots.clone();

        let id = handle.add_task(async move {
            let value = future.await;
            slots.borrow_mut()[index] = Some(value);
            waiter.set();
        });

        debug!("gather: member {index} runs as task {id}");
    }

    waiter.wait().await;

    let outputs = slots.borrow_mut().drain(..).flatten().collect();
    outputs
}

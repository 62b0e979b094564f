use crate::runtime::core::Handle;
use crate::task::Suspend;

use std::cell::RefCell;

thread_local! {
    /// Handle to the loop currently running on this thread.
    ///
    /// Installed by [`enter_context`] for the duration of `Loop::run`, so
    /// that nested primitives (timers, gather, spawn) can reach the loop
    /// without explicit parameter passing.
    pub(crate) static CURRENT_LOOP: RefCell<Option<Handle>> = const { RefCell::new(None) };

    /// Signal left by the innermost suspension point of the task being
    /// resumed. Read back (and cleared) by `Task::resume`.
    static SUSPENSION: RefCell<Option<Suspend>> = const { RefCell::new(None) };
}

/// Installs `handle` as the current loop while `f` runs.
///
/// The previous value is restored afterwards, even if `f` unwinds, so
/// loops may be run from inside one another.
pub(crate) fn enter_context<R>(handle: Handle, f: impl FnOnce() -> R) -> R {
    let prev = CURRENT_LOOP.with(|cell| cell.replace(Some(handle)));
    let _reset = Reset(prev);

    f()
}

/// Puts the saved handle back on drop.
struct Reset(Option<Handle>);

impl Drop for Reset {
    fn drop(&mut self) {
        let prev = self.0.take();
        let _ = CURRENT_LOOP.try_with(|cell| cell.replace(prev));
    }
}

/// Returns a clone of the current loop handle, if any.
pub(crate) fn current() -> Option<Handle> {
    CURRENT_LOOP.with(|cell| cell.borrow().clone())
}

/// Records the reason the running task is about to return `Poll::Pending`.
///
/// A task may hit several leaves in one poll (a hand-written join, for
/// instance). A recorded `Yield` always wins. Between two waits the first
/// one is kept; the other leaves re-record theirs on the next resume.
pub(crate) fn suspend(signal: Suspend) {
    SUSPENSION.with(|cell| {
        let mut slot = cell.borrow_mut();

        let keep = matches!(
            (slot.as_ref(), &signal),
            (Some(Suspend::Yield), _) | (Some(Suspend::Wait(_)), Suspend::Wait(_))
        );

        if !keep {
            *slot = Some(signal);
        }
    });
}

/// Takes the recorded suspension signal, leaving the slot empty.
pub(crate) fn take_suspension() -> Option<Suspend> {
    SUSPENSION.with(|cell| cell.borrow_mut().take())
}

//! Tasks and task combinators.
//!
//! This module defines the [`Task`] abstraction driven by the loop,
//! together with the helpers built on top of it:
//! - [`Step`] and [`Suspend`], the suspension contract between a task and
//!   its scheduler,
//! - [`spawn`] and [`JoinHandle`] for awaiting a task's output,
//! - [`gather`] for running many futures concurrently.

pub(crate) mod gather;
pub(crate) mod handle;
pub(crate) mod state;

pub mod core;

pub use self::core::{Step, Suspend, Task, TaskId};
pub use gather::gather;
pub use handle::JoinHandle;
pub use state::TaskState;

use crate::runtime::core::Handle;

use std::future::Future;

/// Spawns a future as a task onto the current loop.
///
/// The task is appended to the tail of the ready-queue. The returned
/// [`JoinHandle`] resolves to the future's output.
///
/// # Panics
///
/// Panics if called outside the context of a running loop.
pub fn spawn<F, T>(future: F) -> JoinHandle<T>
where
    F: Future<Output = T> + 'static,
    T: 'static,
{
    Handle::try_current()
        .expect("spawn must be called within the context of a running loop")
        .spawn(future)
}

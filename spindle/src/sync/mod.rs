//! Synchronization primitives for tasks running on the loop.
//!
//! - [`Future`]: a one-shot signal. Awaiting it parks the task until
//!   [`Future::set`] re-queues it, so the loop never polls it in vain.
//! - [`Waiter`]: a counting rendezvous. Awaiting it yields every turn
//!   until its count reaches zero.
//!
//! Both are single-threaded handles (`Rc`-based) and are meant to be
//! shared between tasks of the same loop.

mod future;
mod waiter;

pub use future::{Future, Wait};
pub use waiter::{Waiter, WaiterWait};

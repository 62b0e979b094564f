//! # Spindle
//!
//! **Spindle** is a minimal cooperative event loop for Rust, built from
//! first principles: a resumable task, a FIFO ready-queue, a one-shot
//! [`Future`](sync::Future) a task can park on, a counting
//! [`Waiter`](sync::Waiter), and a timer heap that lets tasks sleep without
//! anyone busy-polling the clock.
//!
//! Everything runs on one thread. Exactly one task runs at a time and
//! hands control back to the loop only at the suspension points it
//! chooses: a plain [`yield_now`], or awaiting a future, a waiter, or a
//! [`sleep`](time::sleep).
//!
//! ## Quick Start
//!
//! ```rust
//! use spindle::time::sleep;
//! use spindle::{Loop, gather};
//! use std::time::Duration;
//!
//! async fn count(name: &'static str, n: u32) -> u32 {
//!     for i in 0..n {
//!         println!("{name}: {i}");
//!         sleep(Duration::from_millis(1)).await;
//!     }
//!     n
//! }
//!
//! let mut event_loop = Loop::new();
//! let totals = event_loop
//!     .run_task(async { gather([count("a", 2), count("b", 3)]).await })
//!     .unwrap();
//!
//! assert_eq!(totals, vec![2, 3]);
//! ```
//!
//! ## Modules
//!
//! - [`task`]: Tasks, the suspension contract, spawn and gather
//! - [`sync`]: `Future` and `Waiter`
//! - [`time`]: Timer-based sleep
//! - `net`: TCP sockets driven by readiness polling (unix)
//!
//! ## Limitations
//!
//! - **Single-threaded**: handles are `Rc`-based and never leave the thread.
//! - **No cancellation**: a parked task stays parked until its future is set.
//! - **Idle spin**: by default the loop spins while only timers are
//!   pending; [`IdleStrategy::Park`] sleeps until the next deadline instead.

mod error;
mod runtime;

#[cfg(unix)]
pub mod net;
pub mod sync;
pub mod time;

pub use error::{Error, Result};
pub use runtime::builder::{IDLE_ENV, IdleStrategy, LoopBuilder};
pub use runtime::core::{Handle, Loop, RunStats};
pub use runtime::task;
pub use runtime::task::{gather, spawn};
pub use runtime::yield_now::yield_now;

pub use spindle_macros::{gather, main, test};

//! Time utilities.
//!
//! This module provides timer-based waiting integrated with the loop's
//! timer heap:
//! - [`sleep`] to wait for a duration,
//! - [`sleep_until`] to wait for an absolute deadline.

mod sleep;

pub(crate) mod timer;

#[doc(inline)]
pub use sleep::{Sleep, sleep, sleep_until};

//! TCP sockets driven by readiness polling.
//!
//! These wrappers only rely on the plain cooperative yield: each
//! operation checks readiness with a zero-timeout `poll(2)` and yields to
//! the loop until the socket is ready. They need no timer or future
//! support from the loop.

mod readiness;
mod socket;

pub use socket::{PollListener, PollStream};

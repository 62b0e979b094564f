//! Core loop components.
//!
//! This module contains the fundamental building blocks of the event
//! loop: task execution, scheduling, and cooperative yielding.
//!
//! It is responsible for:
//! - resuming tasks in FIFO order,
//! - parking tasks on futures and firing timers,
//! - providing the "current loop" context to nested code,
//! - enabling cooperative multitasking via yielding.
//!
//! Most users will interact with the re-exports at the crate root rather
//! than with this module directly.

pub(crate) mod builder;
pub(crate) mod context;
pub(crate) mod core;
pub(crate) mod yield_now;

pub mod task;

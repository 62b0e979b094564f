use super::core::Loop;
use crate::error::{Error, Result};

use std::env;
use std::str::FromStr;

/// Environment variable read by [`LoopBuilder::from_env`].
pub const IDLE_ENV: &str = "SPINDLE_IDLE";

/// What the loop does on a turn where no task is ready but timers are
/// still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdleStrategy {
    /// Spin: go straight to the next turn and re-check the timer heap.
    ///
    /// This is the reference behaviour. It burns a core while every task
    /// is asleep.
    #[default]
    Spin,

    /// Put the thread to sleep until the earliest timer deadline.
    ///
    /// Timers still fire in deadline order and never early, so tasks
    /// observe exactly the same schedule as with [`IdleStrategy::Spin`].
    Park,
}

impl FromStr for IdleStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spin" => Ok(Self::Spin),
            "park" => Ok(Self::Park),
            other => Err(Error::UnknownIdleStrategy(other.to_owned())),
        }
    }
}

/// Builder for configuring and creating a loop.
///
/// # Examples
///
/// ```rust
/// use spindle::{IdleStrategy, LoopBuilder};
///
/// let event_loop = LoopBuilder::new()
///     .idle(IdleStrategy::Park)
///     .queue_capacity(64)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct LoopBuilder {
    /// Behaviour on turns with nothing ready to run.
    idle: IdleStrategy,

    /// Initial capacity of the ready-queue.
    queue_capacity: usize,
}

impl LoopBuilder {
    /// Creates a builder with the default configuration: spinning idle
    /// turns and a small ready-queue.
    pub fn new() -> Self {
        Self {
            idle: IdleStrategy::default(),
            queue_capacity: 16,
        }
    }

    /// Creates a builder configured from the environment.
    ///
    /// `SPINDLE_IDLE` selects the idle strategy (`spin` or `park`). Unset
    /// variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownIdleStrategy`] for any other value.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::new();

        if let Ok(value) = env::var(IDLE_ENV) {
            builder.idle = value.parse()?;
        }

        Ok(builder)
    }

    /// Sets what the loop does when no task is ready.
    pub fn idle(mut self, idle: IdleStrategy) -> Self {
        self.idle = idle;
        self
    }

    /// Sets the initial capacity of the ready-queue.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Builds the loop with the configured options.
    pub fn build(self) -> Loop {
        Loop::with_config(self.idle, self.queue_capacity)
    }
}

impl Default for LoopBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_idle_strategies() {
        assert_eq!("spin".parse::<IdleStrategy>(), Ok(IdleStrategy::Spin));
        assert_eq!(" Park ".parse::<IdleStrategy>(), Ok(IdleStrategy::Park));
        assert_eq!(
            "nap".parse::<IdleStrategy>(),
            Err(Error::UnknownIdleStrategy("nap".to_owned()))
        );
    }
}

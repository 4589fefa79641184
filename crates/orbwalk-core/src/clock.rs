//! Session clock: the tick counter and latency estimate the core reads.
//!
//! The core never advances time itself. It reads the current tick and the
//! round-trip latency through the [`Clock`] trait on every decision. Hosts
//! that already own a clock implement the trait directly; [`SessionClock`]
//! is the in-process implementation used by the engine and by tests.
//!
//! # Design Principles
//!
//! - Ticks are milliseconds and only move forward.
//! - All tick arithmetic is checked; advancing past `u64::MAX` is an error,
//!   not a wrap.

use orbwalk_types::Tick;

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance {by}ms beyond tick {tick}")]
    TickOverflow {
        /// The tick at the time of the failed advance.
        tick: Tick,
        /// The requested step.
        by: u64,
    },
}

/// Source of the current tick and latency estimate.
pub trait Clock {
    /// The current simulation tick.
    fn current_tick(&self) -> Tick;

    /// Current round-trip latency estimate in milliseconds.
    fn ping_ms(&self) -> u32;
}

/// A manually advanced clock.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionClock {
    /// Current tick.
    tick: Tick,

    /// Last latency sample.
    ping_ms: u32,
}

impl SessionClock {
    /// Create a clock starting at `tick` with the given latency.
    pub const fn new(tick: Tick, ping_ms: u32) -> Self {
        Self { tick, ping_ms }
    }

    /// Advance the clock by `by` milliseconds. Returns the new tick.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self, by: u64) -> Result<Tick, ClockError> {
        self.tick = self
            .tick
            .checked_add(by)
            .ok_or(ClockError::TickOverflow { tick: self.tick, by })?;
        Ok(self.tick)
    }

    /// Record a new latency sample.
    pub const fn set_ping(&mut self, ping_ms: u32) {
        self.ping_ms = ping_ms;
    }
}

impl Clock for SessionClock {
    fn current_tick(&self) -> Tick {
        self.tick
    }

    fn ping_ms(&self) -> u32 {
        self.ping_ms
    }
}

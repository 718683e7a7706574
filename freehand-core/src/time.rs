//! Time management for the recognition runtime
//!
//! Dwell and release-waiting times are soft timers: the runtime reads its
//! clock once per call and compares millisecond timestamps. Nothing is
//! scheduled, so a stalled frame loop only delays transitions.
//!
//! Clock sources:
//! - System clock (when `std` is available)
//! - Fixed value (owned, for single-owner tests)
//! - Manual clock (shared handle, for hosts that drive time themselves)

use alloc::rc::Rc;
use core::cell::Cell;

/// Timestamp in milliseconds since epoch (or an arbitrary host origin)
pub type Timestamp = u64;

/// Clock the runtime reads once per entry-point call
pub trait TimeSource {
    /// Milliseconds on this source's timeline
    fn now(&self) -> Timestamp;

    /// True when `now` follows the calendar clock rather than a host-driven
    /// timeline
    fn is_wall_clock(&self) -> bool;

    /// Smallest step `now` can move by, in milliseconds
    ///
    /// Dwell and release-waiting times shorter than this cannot be resolved.
    fn precision_ms(&self) -> u32;
}

/// Calendar clock, milliseconds since the Unix epoch
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTime;

#[cfg(feature = "std")]
impl TimeSource for SystemTime {
    fn now(&self) -> Timestamp {
        std::time::UNIX_EPOCH
            .elapsed()
            .map_or(0, |since| since.as_millis() as Timestamp)
    }

    fn is_wall_clock(&self) -> bool {
        true
    }

    fn precision_ms(&self) -> u32 {
        1
    }
}

/// Fixed time source for testing
#[derive(Debug, Clone)]
pub struct FixedTime {
    timestamp: Timestamp,
}

impl FixedTime {
    /// Create a source frozen at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Jump to an absolute time
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Move forward by `ms`
    pub fn advance(&mut self, ms: u64) {
        self.timestamp = self.timestamp.saturating_add(ms);
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp
    }

    fn is_wall_clock(&self) -> bool {
        false
    }

    fn precision_ms(&self) -> u32 {
        1
    }
}

/// Manually driven clock that can be shared with the runtime
///
/// Cloning yields another handle on the same clock. Hand one clone to
/// [`GestureRuntime::new`](crate::GestureRuntime::new) and keep the other to
/// advance time between frames. Not `Send`, matching the runtime's
/// single-thread model.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Timestamp>>,
}

impl ManualClock {
    /// Create a clock starting at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            now: Rc::new(Cell::new(timestamp)),
        }
    }

    /// Jump to an absolute time
    pub fn set(&self, timestamp: Timestamp) {
        self.now.set(timestamp);
    }

    /// Move forward by `ms`
    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get().saturating_add(ms));
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }

    fn is_wall_clock(&self) -> bool {
        false
    }

    fn precision_ms(&self) -> u32 {
        1
    }
}

/// Milliseconds from `earlier` to `later`, zero if the clock went backwards
pub fn delta_ms(earlier: Timestamp, later: Timestamp) -> u64 {
    later.saturating_sub(earlier)
}

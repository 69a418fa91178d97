//! Millisecond clock capability used for hold timing.

use core::cell::Cell;

/// A monotonic millisecond clock.
///
/// The gesture machine samples it once per control tick, so hold thresholds
/// resolve to the tick period. Timestamps wrap; callers compare them with
/// [`elapsed_ms`].
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin.
    fn now_ms(&self) -> u32;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

/// Milliseconds from `since` to `now`, tolerating counter wrap-around.
#[inline]
pub const fn elapsed_ms(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

/// A clock that only moves when told to.
///
/// Used by tests and by the CLI simulator, where one control tick advances
/// time by a fixed step.
///
/// # Example
///
/// ```rust
/// use ostinato_platform::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// clock.advance(300);
/// assert_eq!(clock.now_ms(), 300);
/// ```
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: Cell<u32>,
}

impl ManualClock {
    /// Creates a clock at t = 0.
    pub const fn new() -> Self {
        Self { now: Cell::new(0) }
    }

    /// Moves the clock forward by `ms`.
    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }

    /// Sets the absolute time.
    pub fn set(&self, ms: u32) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u32 {
        self.now.get()
    }
}

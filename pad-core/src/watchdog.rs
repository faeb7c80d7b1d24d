//! Communication-loss watchdog.

use core::time::Duration;

use crate::time::PadInstant;

/// Turns "no recent valid inbound message" into a persistent fail-safe
/// condition.
///
/// A timeout is a level re-evaluated every tick, not a one-shot event: it
/// stays asserted for as long as the link is silent and clears automatically
/// on the next valid receipt. No retry logic lives here.
#[derive(Copy, Clone, Debug)]
pub struct LinkWatchdog<I> {
    last_good_receive: I,
    timeout: Duration,
}

impl<I: PadInstant> LinkWatchdog<I> {
    /// Creates a watchdog counting from `start`, as if a valid message had
    /// just arrived.
    pub const fn new(start: I, timeout: Duration) -> Self {
        Self {
            last_good_receive: start,
            timeout,
        }
    }

    /// Records a structurally valid inbound message.
    pub fn feed(&mut self, now: I) {
        self.last_good_receive = now;
    }

    /// Returns `true` when the window has elapsed without a valid receipt.
    #[must_use]
    pub fn is_timed_out(&self, now: I) -> bool {
        now.saturating_duration_since(self.last_good_receive) > self.timeout
    }

    /// Returns the timestamp of the last valid receipt.
    #[must_use]
    pub fn last_good_receive(&self) -> I {
        self.last_good_receive
    }

    /// Returns the configured timeout window.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

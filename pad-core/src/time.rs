//! Monotonic time abstraction underpinning every timing decision in the core.
//!
//! The control loop never reads a clock directly; callers pass the current
//! instant into `tick` so the same logic runs against the Embassy monotonic
//! on the MCU and plain counters in host tests and the emulator.

use core::time::Duration;

/// Trait implemented by monotonic instant wrappers used by the control loop.
pub trait PadInstant: Copy {
    /// Returns the saturating duration from `earlier` to `self`.
    fn saturating_duration_since(&self, earlier: Self) -> Duration;
}

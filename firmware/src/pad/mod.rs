#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! Control-loop glue binding `pad-core` to the Embassy runtime.

#[cfg(target_os = "none")]
pub mod panel;

use core::convert::TryFrom;

use embassy_time::{Duration, Instant};
use pad_core::panel::HoldTimer;
use pad_core::time::PadInstant;

/// Monotonic instant backed by the Embassy time driver.
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub struct FirmwareInstant(Instant);

impl FirmwareInstant {
    /// Captures the current monotonic instant.
    #[must_use]
    pub fn now() -> Self {
        Self(Instant::now())
    }

    /// Returns the wrapped Embassy instant.
    #[must_use]
    pub const fn into_embassy(self) -> Instant {
        self.0
    }
}

impl From<Instant> for FirmwareInstant {
    fn from(instant: Instant) -> Self {
        Self(instant)
    }
}

impl PadInstant for FirmwareInstant {
    fn saturating_duration_since(&self, earlier: Self) -> core::time::Duration {
        let delta = self.0.saturating_duration_since(earlier.0);
        core::time::Duration::from_micros(delta.as_micros())
    }
}

/// Converts a core duration into the Embassy representation, saturating on
/// overflow.
#[must_use]
pub fn core_duration_to_embassy(duration: core::time::Duration) -> Duration {
    let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
    Duration::from_micros(micros)
}

/// Hold timer that busy-waits on the Embassy time driver.
///
/// A firing deliberately blocks the whole control loop; see the sequencer for
/// the interlock this enforces.
#[derive(Copy, Clone, Debug, Default)]
pub struct EmbassyHoldTimer;

impl EmbassyHoldTimer {
    /// Creates a new hold timer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HoldTimer for EmbassyHoldTimer {
    fn hold(&mut self, duration: core::time::Duration) {
        embassy_time::block_for(core_duration_to_embassy(duration));
    }
}

//! Fixed-cadence phase toggle driving LED blink and telemetry timing.

use core::time::Duration;

use crate::time::PadInstant;

/// Result of one heartbeat evaluation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PhaseEvent {
    /// The half-period has not yet elapsed.
    NoChange,
    /// Phase rose; the caller must push one telemetry frame.
    FlippedOn,
    /// Phase fell.
    FlippedOff,
}

/// Half-period phase toggle.
///
/// The half-period is a fixed constant with no drift correction: if a tick is
/// delayed past a full period, at most one flip occurs per call and the
/// missed flips are never made up.
#[derive(Copy, Clone, Debug)]
pub struct Heartbeat<I> {
    phase_on: bool,
    last_flip: I,
    half_period: Duration,
}

impl<I: PadInstant> Heartbeat<I> {
    /// Creates a heartbeat in the off phase, anchored at `start`.
    pub const fn new(start: I, half_period: Duration) -> Self {
        Self {
            phase_on: false,
            last_flip: start,
            half_period,
        }
    }

    /// Advances the phase when the half-period has elapsed.
    pub fn tick(&mut self, now: I) -> PhaseEvent {
        if now.saturating_duration_since(self.last_flip) < self.half_period {
            return PhaseEvent::NoChange;
        }

        self.phase_on = !self.phase_on;
        self.last_flip = now;
        if self.phase_on {
            PhaseEvent::FlippedOn
        } else {
            PhaseEvent::FlippedOff
        }
    }

    /// Returns the current phase level.
    #[must_use]
    pub const fn phase_on(&self) -> bool {
        self.phase_on
    }

    /// Returns the configured half-period.
    #[must_use]
    pub const fn half_period(&self) -> Duration {
        self.half_period
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    struct MillisInstant(u64);

    impl PadInstant for MillisInstant {
        fn saturating_duration_since(&self, earlier: Self) -> Duration {
            Duration::from_millis(self.0.saturating_sub(earlier.0))
        }
    }

    fn heartbeat() -> Heartbeat<MillisInstant> {
        Heartbeat::new(MillisInstant(0), Duration::from_millis(100))
    }

    #[test]
    fn phases_alternate_at_the_half_period() {
        let mut hb = heartbeat();

        assert_eq!(hb.tick(MillisInstant(50)), PhaseEvent::NoChange);
        assert_eq!(hb.tick(MillisInstant(100)), PhaseEvent::FlippedOn);
        assert!(hb.phase_on());
        assert_eq!(hb.tick(MillisInstant(150)), PhaseEvent::NoChange);
        assert_eq!(hb.tick(MillisInstant(200)), PhaseEvent::FlippedOff);
        assert!(!hb.phase_on());
    }

    #[test]
    fn delayed_tick_produces_a_single_flip() {
        let mut hb = heartbeat();

        // Five half-periods late: one flip, no catch-up.
        assert_eq!(hb.tick(MillisInstant(500)), PhaseEvent::FlippedOn);
        assert_eq!(hb.tick(MillisInstant(510)), PhaseEvent::NoChange);
        assert_eq!(hb.tick(MillisInstant(600)), PhaseEvent::FlippedOff);
    }

    #[test]
    fn flip_anchors_to_the_observed_tick() {
        let mut hb = heartbeat();

        assert_eq!(hb.tick(MillisInstant(130)), PhaseEvent::FlippedOn);
        // The next flip counts from t=130, not t=100.
        assert_eq!(hb.tick(MillisInstant(200)), PhaseEvent::NoChange);
        assert_eq!(hb.tick(MillisInstant(230)), PhaseEvent::FlippedOff);
    }
}

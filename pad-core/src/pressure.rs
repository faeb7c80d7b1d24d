//! Raw chamber pressure sampling.

/// Raw ADC counts for both launch chambers.
///
/// No smoothing and no calibration: the raw counts are the transmitted unit,
/// refreshed once per tick plus once more immediately after a firing so the
/// pressure drop is captured for telemetry.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct PressureReading {
    pub chamber1: u16,
    pub chamber2: u16,
}

impl PressureReading {
    /// Creates a reading from two raw samples.
    #[must_use]
    pub const fn new(chamber1: u16, chamber2: u16) -> Self {
        Self { chamber1, chamber2 }
    }
}

/// Direct, unfiltered read of the two analog channels.
pub trait PressureSensors {
    /// Samples both chambers.
    fn sample(&mut self) -> PressureReading;
}

/// Sensor bank that always reads zero.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopPressureSensors;

impl NoopPressureSensors {
    /// Creates a new no-op sensor bank.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl PressureSensors for NoopPressureSensors {
    fn sample(&mut self) -> PressureReading {
        PressureReading::default()
    }
}

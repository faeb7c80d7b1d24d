//! Digital output abstraction for the pad's actuators and indicators.
//!
//! The panel is a pure side-effecting sink: no channel's write is conditioned
//! on another channel inside this layer. All interlocking lives in the
//! sequencer so the actuation primitive stays trivially testable.

use core::time::Duration;

/// Launch pads served by the controller.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PadId {
    Pad1,
    Pad2,
}

impl PadId {
    /// Deterministic index for compact encodings.
    #[must_use]
    pub const fn as_index(self) -> usize {
        match self {
            PadId::Pad1 => 0,
            PadId::Pad2 => 1,
        }
    }

    /// Attempts to construct a [`PadId`] from a raw index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(PadId::Pad1),
            1 => Some(PadId::Pad2),
            _ => None,
        }
    }

    /// Returns the valve channel feeding this pad.
    #[must_use]
    pub const fn valve(self) -> OutputChannel {
        match self {
            PadId::Pad1 => OutputChannel::Pad1Valve,
            PadId::Pad2 => OutputChannel::Pad2Valve,
        }
    }
}

/// Logical output channels driven by the control loop.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputChannel {
    SafetyLed,
    ErrorLed,
    Pad1Valve,
    Pad2Valve,
    Compressor,
}

/// Compile-time catalog of every output channel.
pub const ALL_CHANNELS: [OutputChannel; 5] = [
    OutputChannel::SafetyLed,
    OutputChannel::ErrorLed,
    OutputChannel::Pad1Valve,
    OutputChannel::Pad2Valve,
    OutputChannel::Compressor,
];

impl OutputChannel {
    /// Deterministic index for lookups into [`ALL_CHANNELS`].
    #[must_use]
    pub const fn as_index(self) -> usize {
        match self {
            OutputChannel::SafetyLed => 0,
            OutputChannel::ErrorLed => 1,
            OutputChannel::Pad1Valve => 2,
            OutputChannel::Pad2Valve => 3,
            OutputChannel::Compressor => 4,
        }
    }

    /// Attempts to construct an [`OutputChannel`] from a raw index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(OutputChannel::SafetyLed),
            1 => Some(OutputChannel::ErrorLed),
            2 => Some(OutputChannel::Pad1Valve),
            3 => Some(OutputChannel::Pad2Valve),
            4 => Some(OutputChannel::Compressor),
            _ => None,
        }
    }

    /// Returns `true` for channels that move air or open a chamber.
    #[must_use]
    pub const fn is_energetic(self) -> bool {
        matches!(
            self,
            OutputChannel::Pad1Valve | OutputChannel::Pad2Valve | OutputChannel::Compressor
        )
    }
}

/// Abstraction over the physical output lines.
pub trait ActuatorPanel {
    /// Drives the requested channel to the given level.
    fn set_output(&mut self, channel: OutputChannel, on: bool);

    /// De-energizes the valves and the compressor. Indicator LEDs are left
    /// untouched so fault blinking survives the transition.
    fn fail_safe(&mut self) {
        self.set_output(OutputChannel::Pad1Valve, false);
        self.set_output(OutputChannel::Pad2Valve, false);
        self.set_output(OutputChannel::Compressor, false);
    }
}

/// Panel that performs no hardware interaction.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopPanel;

impl NoopPanel {
    /// Creates a new no-op panel.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ActuatorPanel for NoopPanel {
    fn set_output(&mut self, _: OutputChannel, _: bool) {}
}

/// Blocking hold primitive used while launch valves stay open.
///
/// A firing runs to completion within the tick that starts it; nothing else
/// may alter actuator state mid-fire, so the hold blocks the whole loop for
/// the configured duration.
pub trait HoldTimer {
    /// Blocks the control loop for the given duration.
    fn hold(&mut self, duration: Duration);
}

/// Hold timer that returns immediately; useful on the host.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopHoldTimer;

impl NoopHoldTimer {
    /// Creates a new no-op hold timer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HoldTimer for NoopHoldTimer {
    fn hold(&mut self, _: Duration) {}
}

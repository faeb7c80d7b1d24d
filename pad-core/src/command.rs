//! Decoded command state exposed by the Comm Link collaborator.

use crate::pressure::PressureReading;
use crate::time::PadInstant;

/// Pad valves addressed by the latest launch command. Either, both, or
/// neither may be set; both set means a simultaneous dual launch.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct PadSelection {
    pub pad1: bool,
    pub pad2: bool,
}

impl PadSelection {
    /// Creates a selection from individual pad flags.
    #[must_use]
    pub const fn new(pad1: bool, pad2: bool) -> Self {
        Self { pad1, pad2 }
    }

    /// Selection with neither pad addressed.
    #[must_use]
    pub const fn none() -> Self {
        Self::new(false, false)
    }

    /// Returns `true` when at least one pad is addressed.
    #[must_use]
    pub const fn any(self) -> bool {
        self.pad1 || self.pad2
    }
}

/// Decoded state of the most recent structurally valid inbound message.
///
/// Owned and mutated by the Comm Link collaborator; the core only reads it.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct CommandSnapshot {
    /// Master is asserting the launch request.
    pub launch_requested: bool,
    /// Master wants the compressor energized.
    pub compressor_requested: bool,
    /// Valves addressed by the launch request.
    pub pads: PadSelection,
}

/// Outbound telemetry pushed once per full heartbeat period.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct TelemetryFrame {
    pub pressures: PressureReading,
    pub pads: PadSelection,
    pub compressor_on: bool,
}

/// Channel to the remote master.
///
/// Framing, retries, and checksum validation are entirely the implementor's
/// responsibility; the core only learns "a fresh valid command arrived" plus
/// the decoded fields.
pub trait CommLink {
    /// Monotonic timestamp type used by the control loop.
    type Instant: PadInstant;

    /// Polls for inbound traffic. Returns `true` when a structurally valid
    /// command was decoded this call, updating the snapshot as a side effect.
    fn poll_inbound(&mut self, now: Self::Instant) -> bool;

    /// Returns the latest decoded command state.
    fn snapshot(&self) -> CommandSnapshot;

    /// Drops any latched launch/arm state so the master must re-arm
    /// explicitly once communication resumes.
    fn clear_arm_state(&mut self);

    /// Queues a telemetry frame for transmission.
    fn send_telemetry(&mut self, frame: &TelemetryFrame);
}

//! The safety-critical launch state machine.
//!
//! Energetic actuation happens only here, and only as an explicit,
//! freshly-confirmed, debounced command. Everything else in the crate exists
//! to hand this module trustworthy inputs.

use core::time::Duration;

use crate::command::{CommandSnapshot, PadSelection};
use crate::panel::{ActuatorPanel, HoldTimer, OutputChannel};

/// Operating mode of the launch sequencer.
///
/// `Firing` is transient: a firing runs to completion within the tick that
/// starts it, and the machine collapses back to `ArmMonitor` before the tick
/// returns.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PadState {
    SafeIdle,
    FaultCommLost,
    ArmMonitor,
    Firing,
}

/// Outcome of one sequencer evaluation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TickOutcome {
    /// Communication is lost; fail-safe outputs were forced.
    FailSafe,
    /// A still-asserted launch request was ignored by the debounce latch.
    Debounced,
    /// Valves actuated for the selected pads; chambers should be resampled.
    Fired(PadSelection),
    /// Normal monitoring; the compressor mirrors the request flag.
    Monitoring,
}

/// Consumes watchdog status, decoded command fields, and the heartbeat phase;
/// drives the actuator panel; guarantees single-shot, debounced actuation.
#[derive(Copy, Clone, Debug)]
pub struct LaunchSequencer {
    state: PadState,
    has_fired_this_arm_cycle: bool,
    compressor_on: bool,
}

impl LaunchSequencer {
    /// Creates a sequencer in the power-on state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: PadState::SafeIdle,
            has_fired_this_arm_cycle: false,
            compressor_on: false,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> PadState {
        self.state
    }

    /// Returns the level last commanded onto the compressor relay.
    #[must_use]
    pub const fn compressor_on(&self) -> bool {
        self.compressor_on
    }

    /// Returns `true` while repeated launch requests are being ignored.
    #[must_use]
    pub const fn is_latched(&self) -> bool {
        self.has_fired_this_arm_cycle
    }

    /// Evaluates one tick in fixed priority order: communication loss first,
    /// then launch handling, then compressor arbitration.
    pub fn evaluate<P, H>(
        &mut self,
        timed_out: bool,
        command: CommandSnapshot,
        phase_on: bool,
        valve_hold: Duration,
        panel: &mut P,
        hold: &mut H,
    ) -> TickOutcome
    where
        P: ActuatorPanel,
        H: HoldTimer,
    {
        if timed_out {
            // Level, not edge: re-entered every tick until the link recovers.
            self.state = PadState::FaultCommLost;
            self.compressor_on = false;
            panel.fail_safe();
            panel.set_output(OutputChannel::SafetyLed, false);
            panel.set_output(OutputChannel::ErrorLed, phase_on);
            return TickOutcome::FailSafe;
        }

        if command.launch_requested {
            if self.has_fired_this_arm_cycle {
                // The master holds the request flag set; a repeat is expected
                // and silently ignored.
                self.state = PadState::ArmMonitor;
                self.apply_run_indicators(phase_on, panel);
                return TickOutcome::Debounced;
            }

            self.state = PadState::Firing;
            self.has_fired_this_arm_cycle = true;

            // Compressor off strictly before any valve opens; feeding
            // pressure during actuation is never allowed.
            self.compressor_on = false;
            panel.set_output(OutputChannel::Compressor, false);

            if command.pads.pad1 {
                panel.set_output(OutputChannel::Pad1Valve, true);
            }
            if command.pads.pad2 {
                panel.set_output(OutputChannel::Pad2Valve, true);
            }

            // Nothing interrupts an in-progress firing.
            hold.hold(valve_hold);

            panel.set_output(OutputChannel::Pad1Valve, false);
            panel.set_output(OutputChannel::Pad2Valve, false);

            self.state = PadState::ArmMonitor;
            self.apply_run_indicators(phase_on, panel);
            return TickOutcome::Fired(command.pads);
        }

        // Request observed false: the debounce window closes and the next
        // assertion counts as a new launch.
        self.has_fired_this_arm_cycle = false;
        self.state = PadState::ArmMonitor;
        self.compressor_on = command.compressor_requested;
        panel.set_output(OutputChannel::Compressor, self.compressor_on);
        self.apply_run_indicators(phase_on, panel);
        TickOutcome::Monitoring
    }

    fn apply_run_indicators<P: ActuatorPanel>(&self, phase_on: bool, panel: &mut P) {
        panel.set_output(OutputChannel::SafetyLed, phase_on);
        panel.set_output(OutputChannel::ErrorLed, false);
    }
}

impl Default for LaunchSequencer {
    fn default() -> Self {
        Self::new()
    }
}

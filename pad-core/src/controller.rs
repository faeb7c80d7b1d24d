//! Tick orchestration: fixed-order composition of the collaborators.
//!
//! One `tick` call performs one full control-loop pass. The order never
//! varies: sample pressures, advance the heartbeat (pushing telemetry on the
//! rising phase), poll the link, evaluate the watchdog, then run the
//! sequencer. The telemetry frame therefore always carries this tick's
//! pressures and the previous tick's compressor level.

use core::time::Duration;

use crate::command::{CommLink, TelemetryFrame};
use crate::heartbeat::{Heartbeat, PhaseEvent};
use crate::panel::{ActuatorPanel, HoldTimer};
use crate::pressure::{PressureReading, PressureSensors};
use crate::sequencer::{LaunchSequencer, PadState, TickOutcome};
use crate::telemetry::{TelemetryEventKind, TelemetryPayload, TelemetryRecorder};
use crate::watchdog::LinkWatchdog;

/// Timing constants for the control loop.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TimingConfig {
    /// Heartbeat half-period; telemetry goes out once per full period.
    pub heartbeat_half_period: Duration,
    /// Silence window after which the link is declared lost.
    pub comm_timeout: Duration,
    /// How long launch valves stay open during a firing.
    pub valve_hold: Duration,
}

impl TimingConfig {
    /// Production defaults: 100 ms half-period, 1 s timeout, 100 ms hold.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            heartbeat_half_period: Duration::from_millis(100),
            comm_timeout: Duration::from_millis(1_000),
            valve_hold: Duration::from_millis(100),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The complete control core wired to its collaborators.
///
/// Generic over the link, panel, sensor, and hold-timer seams so the same
/// loop runs unchanged on the MCU and inside host tests.
pub struct LaunchPadController<L, P, S, H>
where
    L: CommLink,
{
    watchdog: LinkWatchdog<L::Instant>,
    heartbeat: Heartbeat<L::Instant>,
    sequencer: LaunchSequencer,
    telemetry: TelemetryRecorder<L::Instant>,
    timing: TimingConfig,
    pressures: PressureReading,
    comm_lost: bool,
    link: L,
    panel: P,
    sensors: S,
    hold: H,
}

impl<L, P, S, H> LaunchPadController<L, P, S, H>
where
    L: CommLink,
    P: ActuatorPanel,
    S: PressureSensors,
    H: HoldTimer,
{
    /// Creates the controller and forces the panel into the fail-safe
    /// output state before the first tick runs.
    pub fn new(start: L::Instant, timing: TimingConfig, link: L, mut panel: P, sensors: S, hold: H) -> Self {
        panel.fail_safe();

        Self {
            watchdog: LinkWatchdog::new(start, timing.comm_timeout),
            heartbeat: Heartbeat::new(start, timing.heartbeat_half_period),
            sequencer: LaunchSequencer::new(),
            telemetry: TelemetryRecorder::new(),
            timing,
            pressures: PressureReading::default(),
            comm_lost: false,
            link,
            panel,
            sensors,
            hold,
        }
    }

    /// Runs one control-loop pass at the given instant.
    pub fn tick(&mut self, now: L::Instant) -> TickOutcome {
        self.pressures = self.sensors.sample();

        if self.heartbeat.tick(now) == PhaseEvent::FlippedOn {
            let frame = TelemetryFrame {
                pressures: self.pressures,
                pads: self.link.snapshot().pads,
                compressor_on: self.sequencer.compressor_on(),
            };
            self.link.send_telemetry(&frame);
        }

        if self.link.poll_inbound(now) {
            self.watchdog.feed(now);
        }

        let timed_out = self.watchdog.is_timed_out(now);
        if timed_out {
            // Force the master to re-arm from scratch after any outage.
            self.link.clear_arm_state();
            if !self.comm_lost {
                self.comm_lost = true;
                self.telemetry
                    .record(TelemetryEventKind::CommFault, TelemetryPayload::None, now);
            }
        } else if self.comm_lost {
            self.comm_lost = false;
            self.telemetry
                .record(TelemetryEventKind::CommRestored, TelemetryPayload::None, now);
        }

        let compressor_before = self.sequencer.compressor_on();
        let outcome = self.sequencer.evaluate(
            timed_out,
            self.link.snapshot(),
            self.heartbeat.phase_on(),
            self.timing.valve_hold,
            &mut self.panel,
            &mut self.hold,
        );

        if let TickOutcome::Fired(pads) = outcome {
            // Resample so the next frame shows the post-launch pressure drop.
            self.pressures = self.sensors.sample();
            self.telemetry.record_firing(pads, self.pressures, now);
        }

        let compressor_after = self.sequencer.compressor_on();
        if compressor_after != compressor_before {
            let event = if compressor_after {
                TelemetryEventKind::CompressorOn
            } else {
                TelemetryEventKind::CompressorOff
            };
            self.telemetry.record(event, TelemetryPayload::None, now);
        }

        outcome
    }

    /// Returns the sequencer state after the most recent tick.
    #[must_use]
    pub const fn state(&self) -> PadState {
        self.sequencer.state()
    }

    /// Returns the most recent chamber pressures.
    #[must_use]
    pub const fn pressures(&self) -> PressureReading {
        self.pressures
    }

    /// Returns `true` while the link watchdog holds the loop in fail-safe.
    #[must_use]
    pub const fn is_comm_lost(&self) -> bool {
        self.comm_lost
    }

    /// Returns the level last commanded onto the compressor relay.
    #[must_use]
    pub const fn compressor_on(&self) -> bool {
        self.sequencer.compressor_on()
    }

    /// Returns the configured timing constants.
    #[must_use]
    pub const fn timing(&self) -> TimingConfig {
        self.timing
    }

    /// Returns the telemetry history.
    #[must_use]
    pub const fn telemetry(&self) -> &TelemetryRecorder<L::Instant> {
        &self.telemetry
    }

    /// Returns the communication link.
    pub const fn link(&self) -> &L {
        &self.link
    }

    /// Returns the communication link mutably; the emulator uses this to
    /// inject commands between ticks.
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Returns the actuator panel.
    pub const fn panel(&self) -> &P {
        &self.panel
    }
}

//! Heartbeat-driven telemetry cadence through the full controller.

use core::time::Duration;

use heapless::Vec;
use pad_core::command::{CommLink, CommandSnapshot, PadSelection, TelemetryFrame};
use pad_core::controller::{LaunchPadController, TimingConfig};
use pad_core::panel::{ActuatorPanel, NoopHoldTimer, OutputChannel};
use pad_core::pressure::{PressureReading, PressureSensors};
use pad_core::time::PadInstant;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct MillisInstant(u64);

impl PadInstant for MillisInstant {
    fn saturating_duration_since(&self, earlier: Self) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

#[derive(Default)]
struct ScriptedLink {
    command: CommandSnapshot,
    transmitting: bool,
    sent: Vec<TelemetryFrame, 64>,
}

impl ScriptedLink {
    fn transmit(&mut self, command: CommandSnapshot) {
        self.command = command;
        self.transmitting = true;
    }
}

impl CommLink for ScriptedLink {
    type Instant = MillisInstant;

    fn poll_inbound(&mut self, _: Self::Instant) -> bool {
        self.transmitting
    }

    fn snapshot(&self) -> CommandSnapshot {
        self.command
    }

    fn clear_arm_state(&mut self) {
        self.command = CommandSnapshot::default();
    }

    fn send_telemetry(&mut self, frame: &TelemetryFrame) {
        self.sent.push(*frame).unwrap();
    }
}

#[derive(Default)]
struct LevelPanel {
    levels: [bool; 5],
}

impl ActuatorPanel for LevelPanel {
    fn set_output(&mut self, channel: OutputChannel, on: bool) {
        self.levels[channel.as_index()] = on;
    }
}

/// Sensors that return the tick count so each frame is distinguishable.
#[derive(Default)]
struct CountingSensors {
    counter: u16,
}

impl PressureSensors for CountingSensors {
    fn sample(&mut self) -> PressureReading {
        self.counter += 1;
        PressureReading::new(self.counter, self.counter)
    }
}

type TestController = LaunchPadController<ScriptedLink, LevelPanel, CountingSensors, NoopHoldTimer>;

fn controller() -> TestController {
    LaunchPadController::new(
        MillisInstant(0),
        TimingConfig::default(),
        ScriptedLink::default(),
        LevelPanel::default(),
        CountingSensors::default(),
        NoopHoldTimer::new(),
    )
}

fn keepalive() -> CommandSnapshot {
    CommandSnapshot::default()
}

#[test]
fn one_frame_per_full_heartbeat_period() {
    let mut controller = controller();
    controller.link_mut().transmit(keepalive());

    // 1 s of 10 ms ticks, 100 ms half-period: phase rises at 100, 300, 500,
    // 700, 900.
    for t in 1..=100 {
        controller.tick(MillisInstant(t * 10));
    }

    assert_eq!(controller.link().sent.len(), 5);
}

#[test]
fn frame_carries_the_same_tick_pressures() {
    let mut controller = controller();
    controller.link_mut().transmit(keepalive());

    for t in 1..=10 {
        controller.tick(MillisInstant(t * 10));
    }

    // The rising flip happened on the 10th tick, whose sample was the 10th.
    let frame = controller.link().sent[0];
    assert_eq!(frame.pressures, PressureReading::new(10, 10));
}

#[test]
fn delayed_tick_sends_a_single_frame() {
    let mut controller = controller();
    controller.link_mut().transmit(keepalive());

    // Several full periods without a tick still produce exactly one frame.
    controller.tick(MillisInstant(950));
    assert_eq!(controller.link().sent.len(), 1);

    controller.tick(MillisInstant(960));
    assert_eq!(controller.link().sent.len(), 1);
}

#[test]
fn frame_reflects_the_last_commanded_pad_selection() {
    let mut controller = controller();
    controller.link_mut().transmit(CommandSnapshot {
        launch_requested: false,
        compressor_requested: true,
        pads: PadSelection::new(true, false),
    });

    controller.tick(MillisInstant(10));
    assert!(controller.compressor_on());

    // Next rising flip happens with the compressor already on.
    for t in 2..=30 {
        controller.tick(MillisInstant(t * 10));
    }

    let last = *controller.link().sent.last().unwrap();
    assert_eq!(last.pads, PadSelection::new(true, false));
    assert!(last.compressor_on);
}

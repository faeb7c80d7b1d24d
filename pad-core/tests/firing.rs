//! End-to-end launch behavior through the full controller.

use core::time::Duration;

use heapless::Vec;
use pad_core::command::{CommLink, CommandSnapshot, PadSelection, TelemetryFrame};
use pad_core::controller::{LaunchPadController, TimingConfig};
use pad_core::panel::{ActuatorPanel, HoldTimer, OutputChannel};
use pad_core::pressure::{PressureReading, PressureSensors};
use pad_core::sequencer::TickOutcome;
use pad_core::time::PadInstant;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct MillisInstant(u64);

impl PadInstant for MillisInstant {
    fn saturating_duration_since(&self, earlier: Self) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

/// Link whose master repeats the staged command every tick until silenced.
#[derive(Default)]
struct ScriptedLink {
    command: CommandSnapshot,
    transmitting: bool,
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

    fn send_telemetry(&mut self, _: &TelemetryFrame) {}
}

#[derive(Default)]
struct RecordingPanel {
    writes: Vec<(OutputChannel, bool), 256>,
}

impl RecordingPanel {
    fn opens_of(&self, channel: OutputChannel) -> usize {
        self.writes.iter().filter(|w| **w == (channel, true)).count()
    }
}

impl ActuatorPanel for RecordingPanel {
    fn set_output(&mut self, channel: OutputChannel, on: bool) {
        self.writes.push((channel, on)).unwrap();
    }
}

#[derive(Copy, Clone, Default)]
struct FixedSensors(PressureReading);

impl PressureSensors for FixedSensors {
    fn sample(&mut self) -> PressureReading {
        self.0
    }
}

#[derive(Default)]
struct RecordingHold {
    holds: Vec<Duration, 8>,
}

impl HoldTimer for RecordingHold {
    fn hold(&mut self, duration: Duration) {
        self.holds.push(duration).unwrap();
    }
}

type TestController = LaunchPadController<ScriptedLink, RecordingPanel, FixedSensors, RecordingHold>;

fn controller() -> TestController {
    LaunchPadController::new(
        MillisInstant(0),
        TimingConfig::default(),
        ScriptedLink::default(),
        RecordingPanel::default(),
        FixedSensors::default(),
        RecordingHold::default(),
    )
}

fn launch(pads: PadSelection) -> CommandSnapshot {
    CommandSnapshot {
        launch_requested: true,
        compressor_requested: false,
        pads,
    }
}

#[test]
fn repeated_request_fires_exactly_once() {
    let mut controller = controller();
    controller
        .link_mut()
        .transmit(launch(PadSelection::new(true, false)));

    let mut firings = 0;
    for t in 1..=10 {
        if matches!(controller.tick(MillisInstant(t * 10)), TickOutcome::Fired(_)) {
            firings += 1;
        }
    }
    assert_eq!(firings, 1);
    assert_eq!(controller.panel().opens_of(OutputChannel::Pad1Valve), 1);
}

#[test]
fn releasing_and_reasserting_rearms_the_latch() {
    let mut controller = controller();

    controller
        .link_mut()
        .transmit(launch(PadSelection::new(true, false)));
    assert!(matches!(
        controller.tick(MillisInstant(10)),
        TickOutcome::Fired(_)
    ));

    controller.link_mut().transmit(CommandSnapshot::default());
    assert_eq!(controller.tick(MillisInstant(20)), TickOutcome::Monitoring);

    controller
        .link_mut()
        .transmit(launch(PadSelection::new(true, false)));
    assert!(matches!(
        controller.tick(MillisInstant(30)),
        TickOutcome::Fired(_)
    ));
    assert_eq!(controller.panel().opens_of(OutputChannel::Pad1Valve), 2);
}

#[test]
fn dual_launch_opens_both_valves_simultaneously() {
    let mut controller = controller();
    controller
        .link_mut()
        .transmit(launch(PadSelection::new(true, true)));

    let outcome = controller.tick(MillisInstant(10));
    assert_eq!(outcome, TickOutcome::Fired(PadSelection::new(true, true)));
    assert_eq!(controller.panel().opens_of(OutputChannel::Pad1Valve), 1);
    assert_eq!(controller.panel().opens_of(OutputChannel::Pad2Valve), 1);
}

#[test]
fn unselected_valve_never_opens() {
    let mut controller = controller();
    controller
        .link_mut()
        .transmit(launch(PadSelection::new(false, true)));

    controller.tick(MillisInstant(10));
    assert_eq!(controller.panel().opens_of(OutputChannel::Pad1Valve), 0);
    assert_eq!(controller.panel().opens_of(OutputChannel::Pad2Valve), 1);
}

#[test]
fn compressor_is_cut_before_the_valves_open() {
    let mut controller = controller();

    // Energize the compressor first, then request a launch while it runs.
    controller.link_mut().transmit(CommandSnapshot {
        launch_requested: false,
        compressor_requested: true,
        pads: PadSelection::none(),
    });
    controller.tick(MillisInstant(10));
    assert!(controller.compressor_on());

    controller.link_mut().transmit(CommandSnapshot {
        launch_requested: true,
        compressor_requested: true,
        pads: PadSelection::new(true, false),
    });
    controller.tick(MillisInstant(20));

    let writes = &controller.panel().writes;
    let last_compressor_off = writes
        .iter()
        .rposition(|w| *w == (OutputChannel::Compressor, false))
        .expect("compressor never commanded off");
    let valve_open = writes
        .iter()
        .position(|w| *w == (OutputChannel::Pad1Valve, true))
        .expect("valve never opened");
    assert!(last_compressor_off < valve_open);
    assert!(!controller.compressor_on());
}

#[test]
fn firing_holds_the_valves_for_the_configured_duration() {
    use pad_core::sequencer::LaunchSequencer;

    let mut sequencer = LaunchSequencer::new();
    let mut panel = RecordingPanel::default();
    let mut hold = RecordingHold::default();

    sequencer.evaluate(
        false,
        launch(PadSelection::new(true, false)),
        false,
        Duration::from_millis(250),
        &mut panel,
        &mut hold,
    );

    assert_eq!(hold.holds.as_slice(), &[Duration::from_millis(250)]);

    // The hold separates the open from the close on the fired valve.
    let open = panel
        .writes
        .iter()
        .position(|w| *w == (OutputChannel::Pad1Valve, true))
        .expect("valve never opened");
    let close = panel
        .writes
        .iter()
        .position(|w| *w == (OutputChannel::Pad1Valve, false))
        .expect("valve never closed");
    assert!(open < close);
}

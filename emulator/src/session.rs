//! Interactive host session driving the real control core.
//!
//! The session owns a `LaunchPadController` wired to in-memory collaborators:
//! a scripted master link, a level-tracking panel, and settable pressure
//! sensors. Commands mutate the scripted master; `tick` advances simulated
//! time through the same loop the firmware runs.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use crossterm::style::Stylize;
use pad_core::command::{CommLink, CommandSnapshot, PadSelection, TelemetryFrame};
use pad_core::controller::{LaunchPadController, TimingConfig};
use pad_core::panel::{ActuatorPanel, HoldTimer, OutputChannel};
use pad_core::pressure::{PressureReading, PressureSensors};
use pad_core::sequencer::{PadState, TickOutcome};
use pad_core::time::PadInstant;

/// Simulated milliseconds advanced per `tick`.
const TICK_INTERVAL_MS: u64 = 10;

pub const HELP_TOPICS: &[(&str, &str)] = &[
    (
        "launch",
        "launch [pad1|pad2|both]    - assert the launch request for the given pads",
    ),
    (
        "release",
        "release                    - drop the launch request flag",
    ),
    (
        "compressor",
        "compressor <on|off>        - request the compressor relay state",
    ),
    (
        "pressure",
        "pressure <c1> <c2>         - set the raw chamber pressure counts",
    ),
    (
        "drop-link",
        "drop-link                  - silence the master (watchdog will trip)",
    ),
    (
        "restore-link",
        "restore-link               - resume master transmissions",
    ),
    (
        "tick",
        "tick [n]                   - advance n control-loop ticks (default 1)",
    ),
    (
        "status",
        "status                     - display the pad state and outputs",
    ),
    (
        "telemetry",
        "telemetry                  - list recorded telemetry events",
    ),
    (
        "help",
        "help [topic]               - show help for a command",
    ),
];

/// Millisecond counter standing in for the MCU monotonic.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct HostInstant(u64);

impl PadInstant for HostInstant {
    fn saturating_duration_since(&self, earlier: Self) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

/// Scripted master: repeats the staged command each tick until silenced.
#[derive(Default)]
struct HostLink {
    command: CommandSnapshot,
    transmitting: bool,
    sent: Vec<TelemetryFrame>,
}

impl CommLink for HostLink {
    type Instant = HostInstant;

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
        self.sent.push(*frame);
    }
}

#[derive(Default)]
struct HostPanel {
    levels: [bool; 5],
}

impl HostPanel {
    fn level(&self, channel: OutputChannel) -> bool {
        self.levels[channel.as_index()]
    }
}

impl ActuatorPanel for HostPanel {
    fn set_output(&mut self, channel: OutputChannel, on: bool) {
        self.levels[channel.as_index()] = on;
    }
}

/// Sensors reading from a cell the session can set between ticks.
#[derive(Clone, Default)]
struct HostSensors(Rc<Cell<PressureReading>>);

impl PressureSensors for HostSensors {
    fn sample(&mut self) -> PressureReading {
        self.0.get()
    }
}

#[derive(Default)]
struct HostHold;

impl HoldTimer for HostHold {
    fn hold(&mut self, _: Duration) {}
}

pub struct Session {
    controller: LaunchPadController<HostLink, HostPanel, HostSensors, HostHold>,
    pressures: Rc<Cell<PressureReading>>,
    now_ms: u64,
}

impl Session {
    pub fn new() -> Self {
        let pressures = Rc::new(Cell::new(PressureReading::default()));
        let sensors = HostSensors(Rc::clone(&pressures));
        let link = HostLink {
            transmitting: true,
            ..HostLink::default()
        };

        let controller = LaunchPadController::new(
            HostInstant(0),
            TimingConfig::default(),
            link,
            HostPanel::default(),
            sensors,
            HostHold,
        );

        Self {
            controller,
            pressures,
            now_ms: 0,
        }
    }

    pub fn handle_command(&mut self, line: &str) -> Vec<String> {
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            return Vec::new();
        };
        let args: Vec<&str> = parts.collect();

        match keyword.to_ascii_lowercase().as_str() {
            "help" => self.handle_help(args.first().copied()),
            "launch" => self.handle_launch(args.first().copied()),
            "release" => self.handle_release(),
            "compressor" => self.handle_compressor(args.first().copied()),
            "pressure" => self.handle_pressure(&args),
            "drop-link" => self.handle_drop_link(),
            "restore-link" => self.handle_restore_link(),
            "tick" => self.handle_tick(args.first().copied()),
            "status" => self.handle_status(),
            "telemetry" => self.handle_telemetry(),
            other => vec![format!(
                "ERR unknown command `{other}` (try `help`)"
            )],
        }
    }

    fn handle_help(&self, topic: Option<&str>) -> Vec<String> {
        match topic {
            Some(target) if !target.is_empty() => {
                if let Some((_, detail)) = HELP_TOPICS
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(target))
                {
                    vec![(*detail).to_string()]
                } else {
                    vec![
                        format!("No help available for `{target}`."),
                        format!("Available topics: {}", help_topic_list()),
                    ]
                }
            }
            _ => {
                let mut lines = vec!["Available commands:".to_string()];
                for (_, detail) in HELP_TOPICS {
                    lines.push(format!("  {detail}"));
                }
                lines.push("Type `help <topic>` for a specific command.".to_string());
                lines
            }
        }
    }

    fn handle_launch(&mut self, pads: Option<&str>) -> Vec<String> {
        let selection = match pads.unwrap_or("pad1") {
            tag if tag.eq_ignore_ascii_case("pad1") => PadSelection::new(true, false),
            tag if tag.eq_ignore_ascii_case("pad2") => PadSelection::new(false, true),
            tag if tag.eq_ignore_ascii_case("both") => PadSelection::new(true, true),
            other => return vec![format!("ERR unknown pad selection `{other}`")],
        };

        let link = self.controller.link_mut();
        link.command.launch_requested = true;
        link.command.pads = selection;
        vec![format!(
            "OK master asserting launch pad1={} pad2={} (run `tick` to advance)",
            selection.pad1, selection.pad2
        )]
    }

    fn handle_release(&mut self) -> Vec<String> {
        let link = self.controller.link_mut();
        link.command.launch_requested = false;
        link.command.pads = PadSelection::none();
        vec!["OK launch request released".to_string()]
    }

    fn handle_compressor(&mut self, state: Option<&str>) -> Vec<String> {
        let requested = match state {
            Some(tag) if tag.eq_ignore_ascii_case("on") => true,
            Some(tag) if tag.eq_ignore_ascii_case("off") => false,
            _ => return vec!["ERR expected `compressor on` or `compressor off`".to_string()],
        };

        self.controller.link_mut().command.compressor_requested = requested;
        vec![format!("OK master requesting compressor {}", on_off(requested))]
    }

    fn handle_pressure(&mut self, args: &[&str]) -> Vec<String> {
        let (Some(c1), Some(c2)) = (args.first(), args.get(1)) else {
            return vec!["ERR expected `pressure <c1> <c2>`".to_string()];
        };
        let (Ok(chamber1), Ok(chamber2)) = (c1.parse::<u16>(), c2.parse::<u16>()) else {
            return vec!["ERR pressure counts must be 0-65535".to_string()];
        };

        self.pressures.set(PressureReading::new(chamber1, chamber2));
        vec![format!("OK chamber pressures set c1={chamber1} c2={chamber2}")]
    }

    fn handle_drop_link(&mut self) -> Vec<String> {
        self.controller.link_mut().transmitting = false;
        let timeout = self.controller.timing().comm_timeout;
        vec![format!(
            "OK master silenced (watchdog trips after {} ms of ticks)",
            timeout.as_millis()
        )]
    }

    fn handle_restore_link(&mut self) -> Vec<String> {
        self.controller.link_mut().transmitting = true;
        vec!["OK master transmitting again".to_string()]
    }

    fn handle_tick(&mut self, count: Option<&str>) -> Vec<String> {
        let ticks = match count {
            Some(raw) => match raw.parse::<u64>() {
                Ok(value) if value > 0 => value,
                _ => return vec!["ERR tick count must be a positive integer".to_string()],
            },
            None => 1,
        };

        let mut lines = Vec::new();
        let mut last_state = self.controller.state();
        let mut last_outcome = TickOutcome::Monitoring;

        for _ in 0..ticks {
            self.now_ms += TICK_INTERVAL_MS;
            let outcome = self.controller.tick(HostInstant(self.now_ms));

            if let TickOutcome::Fired(pads) = outcome {
                lines.push(format!(
                    "t=+{}ms {} pad1={} pad2={}",
                    self.now_ms,
                    "FIRED".green().bold(),
                    pads.pad1,
                    pads.pad2
                ));
            }
            let state = self.controller.state();
            if state != last_state {
                lines.push(format!(
                    "t=+{}ms state {} -> {}",
                    self.now_ms,
                    state_label(last_state),
                    state_label(state)
                ));
                last_state = state;
            }
            last_outcome = outcome;
        }

        lines.push(format!(
            "t=+{}ms ticks={} outcome={}",
            self.now_ms,
            ticks,
            outcome_label(last_outcome)
        ));
        lines
    }

    fn handle_status(&self) -> Vec<String> {
        let panel = self.controller.panel();
        let pressures = self.controller.pressures();
        let link = if self.controller.is_comm_lost() {
            "LOST".red().bold().to_string()
        } else {
            "OK".green().to_string()
        };

        vec![
            format!(
                "state={} link={} t=+{}ms",
                state_label(self.controller.state()),
                link,
                self.now_ms
            ),
            format!(
                "valves  pad1={} pad2={}",
                open_closed(panel.level(OutputChannel::Pad1Valve)),
                open_closed(panel.level(OutputChannel::Pad2Valve))
            ),
            format!(
                "compressor={} safety-led={} error-led={}",
                on_off(panel.level(OutputChannel::Compressor)),
                on_off(panel.level(OutputChannel::SafetyLed)),
                on_off(panel.level(OutputChannel::ErrorLed))
            ),
            format!(
                "pressures c1={} c2={}",
                pressures.chamber1, pressures.chamber2
            ),
            format!(
                "telemetry frames-sent={} events-recorded={}",
                self.controller.link().sent.len(),
                self.controller.telemetry().len()
            ),
        ]
    }

    fn handle_telemetry(&self) -> Vec<String> {
        if self.controller.telemetry().is_empty() {
            return vec!["telemetry ring is empty".to_string()];
        }

        self.controller
            .telemetry()
            .oldest_first()
            .map(|record| {
                format!(
                    "#{:<4} t=+{}ms {}",
                    record.id,
                    record.timestamp.0,
                    record.event
                )
            })
            .collect()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

const fn state_label(state: PadState) -> &'static str {
    match state {
        PadState::SafeIdle => "safe-idle",
        PadState::FaultCommLost => "fault-comm-lost",
        PadState::ArmMonitor => "arm-monitor",
        PadState::Firing => "firing",
    }
}

const fn outcome_label(outcome: TickOutcome) -> &'static str {
    match outcome {
        TickOutcome::FailSafe => "fail-safe",
        TickOutcome::Debounced => "debounced",
        TickOutcome::Fired(_) => "fired",
        TickOutcome::Monitoring => "monitoring",
    }
}

fn on_off(level: bool) -> String {
    if level {
        "ON".yellow().to_string()
    } else {
        "off".to_string()
    }
}

fn open_closed(level: bool) -> String {
    if level {
        "OPEN".red().bold().to_string()
    } else {
        "closed".green().to_string()
    }
}

fn help_topic_list() -> String {
    let mut buffer = String::new();
    for (index, (name, _)) in HELP_TOPICS.iter().enumerate() {
        if index > 0 {
            buffer.push_str(", ");
        }
        buffer.push_str(name);
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive(session: &mut Session, command: &str) -> Vec<String> {
        session.handle_command(command)
    }

    #[test]
    fn launch_fires_once_and_latches() {
        let mut session = Session::new();

        drive(&mut session, "launch pad1");
        let lines = drive(&mut session, "tick 5");
        assert!(lines.iter().any(|line| line.contains("FIRED")));

        // Still asserted: no second firing.
        let repeat = drive(&mut session, "tick 5");
        assert!(!repeat.iter().any(|line| line.contains("FIRED")));

        drive(&mut session, "release");
        drive(&mut session, "tick 1");
        drive(&mut session, "launch pad1");
        let again = drive(&mut session, "tick 5");
        assert!(again.iter().any(|line| line.contains("FIRED")));
    }

    #[test]
    fn dropped_link_reaches_fail_safe() {
        let mut session = Session::new();

        drive(&mut session, "compressor on");
        drive(&mut session, "tick 1");
        drive(&mut session, "drop-link");

        // 1 s timeout at 10 ms per tick, then one more tick past the window.
        let lines = drive(&mut session, "tick 101");
        assert!(lines.iter().any(|line| line.contains("fault-comm-lost")));

        let status = drive(&mut session, "status");
        assert!(status[0].contains("fault-comm-lost"));

        drive(&mut session, "restore-link");
        let recovered = drive(&mut session, "tick 1");
        assert!(
            recovered
                .iter()
                .any(|line| line.contains("arm-monitor"))
        );
    }

    #[test]
    fn unknown_commands_are_reported() {
        let mut session = Session::new();
        let lines = drive(&mut session, "detonate");
        assert!(lines[0].starts_with("ERR unknown command"));
    }
}

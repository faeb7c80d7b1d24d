use embassy_time::{Duration, Ticker};
use pad_core::controller::LaunchPadController;
use pad_core::sequencer::{PadState, TickOutcome};

use crate::hw::pressure::ChamberAdc;
use crate::link::RadioLink;
use crate::pad::panel::HardwarePanel;
use crate::pad::{EmbassyHoldTimer, FirmwareInstant};
use crate::status;

/// Control-loop cadence. Well under the heartbeat half-period so flip edges
/// land close to their nominal times.
const CONTROL_TICK: Duration = Duration::from_millis(10);

pub type PadController = LaunchPadController<
    RadioLink<'static>,
    HardwarePanel<'static>,
    ChamberAdc<'static>,
    EmbassyHoldTimer,
>;

const fn state_label(state: PadState) -> &'static str {
    match state {
        PadState::SafeIdle => "safe-idle",
        PadState::FaultCommLost => "fault-comm-lost",
        PadState::ArmMonitor => "arm-monitor",
        PadState::Firing => "firing",
    }
}

#[embassy_executor::task]
pub async fn run(mut controller: PadController) -> ! {
    let mut ticker = Ticker::every(CONTROL_TICK);
    let mut last_state = controller.state();

    loop {
        let outcome = controller.tick(FirmwareInstant::now());

        status::set_link_ok(!controller.is_comm_lost());

        let state = controller.state();
        if state != last_state {
            defmt::info!("control: state {=str}", state_label(state));
            last_state = state;
        }

        if let TickOutcome::Fired(pads) = outcome {
            let pressures = controller.pressures();
            defmt::info!(
                "control: fired pad1={=bool} pad2={=bool} post c1={=u16} c2={=u16}",
                pads.pad1,
                pads.pad2,
                pressures.chamber1,
                pressures.chamber2
            );
        }

        ticker.next().await;
    }
}

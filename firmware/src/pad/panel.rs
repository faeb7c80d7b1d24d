//! GPIO-backed actuator panel for the STM32G0 target.

use embassy_stm32::gpio::Output;
use pad_core::panel::{ActuatorPanel, OutputChannel};

use crate::status;

/// Push-pull outputs driving the pad's relays and indicator LEDs.
///
/// All lines are active-high; the relay board inverts where the plumbing
/// needs it.
pub struct HardwarePanel<'d> {
    safety_led: Output<'d>,
    error_led: Output<'d>,
    pad1_valve: Output<'d>,
    pad2_valve: Output<'d>,
    compressor: Output<'d>,
}

impl<'d> HardwarePanel<'d> {
    pub fn new(
        safety_led: Output<'d>,
        error_led: Output<'d>,
        pad1_valve: Output<'d>,
        pad2_valve: Output<'d>,
        compressor: Output<'d>,
    ) -> Self {
        Self {
            safety_led,
            error_led,
            pad1_valve,
            pad2_valve,
            compressor,
        }
    }

    fn output_mut(&mut self, channel: OutputChannel) -> &mut Output<'d> {
        match channel {
            OutputChannel::SafetyLed => &mut self.safety_led,
            OutputChannel::ErrorLed => &mut self.error_led,
            OutputChannel::Pad1Valve => &mut self.pad1_valve,
            OutputChannel::Pad2Valve => &mut self.pad2_valve,
            OutputChannel::Compressor => &mut self.compressor,
        }
    }
}

impl ActuatorPanel for HardwarePanel<'_> {
    fn set_output(&mut self, channel: OutputChannel, on: bool) {
        let output = self.output_mut(channel);
        if on {
            output.set_high();
        } else {
            output.set_low();
        }
        status::record_output(channel, on);
    }
}

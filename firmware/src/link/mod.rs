#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! Radio link plumbing between the UART task and the control loop.
//!
//! The radio task owns the UART and the codec; decoded command snapshots and
//! outbound telemetry frames cross task boundaries through the bounded
//! channels defined here. The control loop sees only the [`RadioLink`]
//! adapter, which satisfies the `pad-core` link seam.

pub mod codec;

#[cfg(not(target_os = "none"))]
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
#[cfg(target_os = "none")]
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use pad_core::command::{CommLink, CommandSnapshot, TelemetryFrame};

use crate::pad::FirmwareInstant;

#[cfg(target_os = "none")]
type LinkMutex = ThreadModeRawMutex;
#[cfg(not(target_os = "none"))]
type LinkMutex = NoopRawMutex;

/// Depth of the decoded-command channel.
pub const INBOUND_QUEUE_DEPTH: usize = 4;

/// Depth of the outbound telemetry channel.
pub const OUTBOUND_QUEUE_DEPTH: usize = 4;

/// Channel carrying decoded command snapshots toward the control loop.
pub type InboundQueue = Channel<LinkMutex, CommandSnapshot, INBOUND_QUEUE_DEPTH>;

/// Sender handle for the inbound channel.
pub type InboundSender<'a> = Sender<'a, LinkMutex, CommandSnapshot, INBOUND_QUEUE_DEPTH>;

/// Receiver handle for the inbound channel.
pub type InboundReceiver<'a> = Receiver<'a, LinkMutex, CommandSnapshot, INBOUND_QUEUE_DEPTH>;

/// Channel carrying telemetry frames toward the radio task.
pub type OutboundQueue = Channel<LinkMutex, TelemetryFrame, OUTBOUND_QUEUE_DEPTH>;

/// Sender handle for the outbound channel.
pub type OutboundSender<'a> = Sender<'a, LinkMutex, TelemetryFrame, OUTBOUND_QUEUE_DEPTH>;

/// Receiver handle for the outbound channel.
pub type OutboundReceiver<'a> = Receiver<'a, LinkMutex, TelemetryFrame, OUTBOUND_QUEUE_DEPTH>;

/// `pad-core` link adapter over the radio channels.
pub struct RadioLink<'a> {
    inbound: InboundReceiver<'a>,
    outbound: OutboundSender<'a>,
    snapshot: CommandSnapshot,
}

impl<'a> RadioLink<'a> {
    /// Creates a link adapter around the shared channel handles.
    #[must_use]
    pub const fn new(inbound: InboundReceiver<'a>, outbound: OutboundSender<'a>) -> Self {
        Self {
            inbound,
            outbound,
            snapshot: CommandSnapshot {
                launch_requested: false,
                compressor_requested: false,
                pads: pad_core::command::PadSelection::none(),
            },
        }
    }
}

impl CommLink for RadioLink<'_> {
    type Instant = FirmwareInstant;

    fn poll_inbound(&mut self, _now: Self::Instant) -> bool {
        let mut received = false;
        // Drain the queue; only the newest snapshot matters.
        while let Ok(snapshot) = self.inbound.try_receive() {
            self.snapshot = snapshot;
            received = true;
        }
        received
    }

    fn snapshot(&self) -> CommandSnapshot {
        self.snapshot
    }

    fn clear_arm_state(&mut self) {
        self.snapshot = CommandSnapshot::default();
    }

    fn send_telemetry(&mut self, frame: &TelemetryFrame) {
        // A full queue means the radio is backlogged; dropping the frame is
        // preferable to stalling the control loop.
        if self.outbound.try_send(*frame).is_err() {
            #[cfg(target_os = "none")]
            defmt::warn!("link: telemetry queue full, frame dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pad_core::command::PadSelection;
    use pad_core::pressure::PressureReading;

    fn now() -> FirmwareInstant {
        FirmwareInstant::from(embassy_time::Instant::from_micros(0))
    }

    #[test]
    fn poll_drains_to_the_newest_snapshot() {
        let test_inbound: InboundQueue = Channel::new();
        let test_outbound: OutboundQueue = Channel::new();
        let mut link = RadioLink::new(test_inbound.receiver(), test_outbound.sender());

        assert!(!link.poll_inbound(now()));

        let older = CommandSnapshot {
            launch_requested: false,
            compressor_requested: true,
            pads: PadSelection::none(),
        };
        let newer = CommandSnapshot {
            launch_requested: true,
            compressor_requested: false,
            pads: PadSelection::new(true, false),
        };
        test_inbound.try_send(older).unwrap();
        test_inbound.try_send(newer).unwrap();

        assert!(link.poll_inbound(now()));
        assert_eq!(link.snapshot(), newer);

        link.clear_arm_state();
        assert_eq!(link.snapshot(), CommandSnapshot::default());
    }

    #[test]
    fn telemetry_overflow_drops_instead_of_blocking() {
        let test_inbound: InboundQueue = Channel::new();
        let test_outbound: OutboundQueue = Channel::new();
        let mut link = RadioLink::new(test_inbound.receiver(), test_outbound.sender());
        let frame = TelemetryFrame {
            pressures: PressureReading::new(1, 2),
            pads: PadSelection::none(),
            compressor_on: false,
        };

        for _ in 0..=OUTBOUND_QUEUE_DEPTH {
            link.send_telemetry(&frame);
        }

        let mut drained = 0;
        while test_outbound.try_receive().is_ok() {
            drained += 1;
        }
        assert_eq!(drained, OUTBOUND_QUEUE_DEPTH);
    }
}

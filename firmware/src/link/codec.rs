//! Wire format for the ground-station radio link.
//!
//! Inbound command frames are three bytes: a sync byte, a flag byte, and an
//! XOR checksum over the preceding bytes. Outbound telemetry frames carry
//! both chamber pressure words big-endian plus a flag byte under the same
//! checksum scheme. The link is lossy; framing recovers by scanning for the
//! next sync byte after any checksum failure.

use heapless::Vec;
use pad_core::command::{CommandSnapshot, PadSelection, TelemetryFrame};
use pad_core::pressure::PressureReading;
use winnow::binary::be_u16;
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{any, one_of};

/// Leading byte of every inbound command frame.
pub const COMMAND_SYNC: u8 = 0xA5;
/// Leading byte of every outbound telemetry frame.
pub const TELEMETRY_SYNC: u8 = 0x5A;

/// Total size of an encoded command frame.
pub const COMMAND_FRAME_LEN: usize = 3;
/// Total size of an encoded telemetry frame.
pub const TELEMETRY_FRAME_LEN: usize = 7;

const CMD_LAUNCH: u8 = 0x01;
const CMD_PAD1: u8 = 0x02;
const CMD_PAD2: u8 = 0x04;
const CMD_COMPRESSOR: u8 = 0x08;

const TLM_COMPRESSOR: u8 = 0x01;
const TLM_PAD1: u8 = 0x02;
const TLM_PAD2: u8 = 0x04;

fn xor_checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, byte| acc ^ byte)
}

fn checksum_error() -> ErrMode<ContextError> {
    ErrMode::Backtrack(ContextError::new())
}

/// Parses one command frame, consuming it from the input.
pub fn command_frame(input: &mut &[u8]) -> ModalResult<CommandSnapshot> {
    let sync = one_of(COMMAND_SYNC).parse_next(input)?;
    let flags = any.parse_next(input)?;
    let checksum = any.parse_next(input)?;
    if checksum != xor_checksum(&[sync, flags]) {
        return Err(checksum_error());
    }

    Ok(CommandSnapshot {
        launch_requested: flags & CMD_LAUNCH != 0,
        compressor_requested: flags & CMD_COMPRESSOR != 0,
        pads: PadSelection::new(flags & CMD_PAD1 != 0, flags & CMD_PAD2 != 0),
    })
}

/// Parses one telemetry frame, consuming it from the input.
///
/// The firmware only transmits these; the parser exists for the ground
/// station and for tests.
pub fn telemetry_frame(input: &mut &[u8]) -> ModalResult<TelemetryFrame> {
    let sync = one_of(TELEMETRY_SYNC).parse_next(input)?;
    let chamber1 = be_u16.parse_next(input)?;
    let chamber2 = be_u16.parse_next(input)?;
    let flags = any.parse_next(input)?;
    let checksum = any.parse_next(input)?;

    let body = [
        sync,
        (chamber1 >> 8) as u8,
        (chamber1 & 0xFF) as u8,
        (chamber2 >> 8) as u8,
        (chamber2 & 0xFF) as u8,
        flags,
    ];
    if checksum != xor_checksum(&body) {
        return Err(checksum_error());
    }

    Ok(TelemetryFrame {
        pressures: PressureReading::new(chamber1, chamber2),
        pads: PadSelection::new(flags & TLM_PAD1 != 0, flags & TLM_PAD2 != 0),
        compressor_on: flags & TLM_COMPRESSOR != 0,
    })
}

/// Encodes a command frame. Used by the emulator's scripted master and by
/// tests; the firmware only decodes these.
#[must_use]
pub fn encode_command(snapshot: &CommandSnapshot) -> [u8; COMMAND_FRAME_LEN] {
    let mut flags = 0;
    if snapshot.launch_requested {
        flags |= CMD_LAUNCH;
    }
    if snapshot.pads.pad1 {
        flags |= CMD_PAD1;
    }
    if snapshot.pads.pad2 {
        flags |= CMD_PAD2;
    }
    if snapshot.compressor_requested {
        flags |= CMD_COMPRESSOR;
    }

    let mut frame = [COMMAND_SYNC, flags, 0];
    frame[COMMAND_FRAME_LEN - 1] = xor_checksum(&frame[..COMMAND_FRAME_LEN - 1]);
    frame
}

/// Encodes a telemetry frame for transmission.
#[must_use]
pub fn encode_telemetry(frame: &TelemetryFrame) -> [u8; TELEMETRY_FRAME_LEN] {
    let mut flags = 0;
    if frame.compressor_on {
        flags |= TLM_COMPRESSOR;
    }
    if frame.pads.pad1 {
        flags |= TLM_PAD1;
    }
    if frame.pads.pad2 {
        flags |= TLM_PAD2;
    }

    let mut encoded = [
        TELEMETRY_SYNC,
        (frame.pressures.chamber1 >> 8) as u8,
        (frame.pressures.chamber1 & 0xFF) as u8,
        (frame.pressures.chamber2 >> 8) as u8,
        (frame.pressures.chamber2 & 0xFF) as u8,
        flags,
        0,
    ];
    encoded[TELEMETRY_FRAME_LEN - 1] = xor_checksum(&encoded[..TELEMETRY_FRAME_LEN - 1]);
    encoded
}

/// Incremental byte-stream deframer for inbound command frames.
///
/// Garbage before the sync byte is discarded; a frame that fails its
/// checksum costs only its sync byte, so a corrupted stream realigns on the
/// next genuine frame boundary.
#[derive(Debug, Default)]
pub struct CommandDeframer {
    buffer: Vec<u8, COMMAND_FRAME_LEN>,
}

impl CommandDeframer {
    /// Creates an empty deframer.
    #[must_use]
    pub const fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Feeds one received byte, returning a snapshot when it completes a
    /// valid frame.
    pub fn push(&mut self, byte: u8) -> Option<CommandSnapshot> {
        if self.buffer.is_empty() && byte != COMMAND_SYNC {
            return None;
        }
        if self.buffer.push(byte).is_err() {
            self.buffer.clear();
            return None;
        }
        if self.buffer.len() < COMMAND_FRAME_LEN {
            return None;
        }

        let mut input = self.buffer.as_slice();
        match command_frame(&mut input) {
            Ok(snapshot) => {
                self.buffer.clear();
                Some(snapshot)
            }
            Err(_) => {
                self.resync();
                None
            }
        }
    }

    fn resync(&mut self) {
        let tail = self.buffer[1..]
            .iter()
            .position(|byte| *byte == COMMAND_SYNC)
            .map(|offset| offset + 1);
        let retained: Vec<u8, COMMAND_FRAME_LEN> = match tail {
            Some(start) => Vec::from_slice(&self.buffer[start..]).unwrap_or_default(),
            None => Vec::new(),
        };
        self.buffer = retained;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launch_snapshot() -> CommandSnapshot {
        CommandSnapshot {
            launch_requested: true,
            compressor_requested: false,
            pads: PadSelection::new(true, false),
        }
    }

    #[test]
    fn command_frames_survive_the_wire() {
        let encoded = encode_command(&launch_snapshot());
        let mut input = encoded.as_slice();
        assert_eq!(command_frame(&mut input).unwrap(), launch_snapshot());
        assert!(input.is_empty());
    }

    #[test]
    fn telemetry_frames_survive_the_wire() {
        let frame = TelemetryFrame {
            pressures: PressureReading::new(0x0123, 0x0FFF),
            pads: PadSelection::new(false, true),
            compressor_on: true,
        };
        let encoded = encode_telemetry(&frame);
        let mut input = encoded.as_slice();
        assert_eq!(telemetry_frame(&mut input).unwrap(), frame);
    }

    #[test]
    fn corrupted_checksum_is_rejected() {
        let mut encoded = encode_command(&launch_snapshot());
        encoded[2] ^= 0xFF;
        let mut input = encoded.as_slice();
        assert!(command_frame(&mut input).is_err());
    }

    #[test]
    fn deframer_skips_leading_noise() {
        let mut deframer = CommandDeframer::new();
        let encoded = encode_command(&launch_snapshot());

        for byte in [0x00, 0x42, 0xFF] {
            assert_eq!(deframer.push(byte), None);
        }
        let mut decoded = None;
        for byte in encoded {
            decoded = deframer.push(byte);
        }
        assert_eq!(decoded, Some(launch_snapshot()));
    }

    #[test]
    fn deframer_recovers_after_a_corrupt_frame() {
        let mut deframer = CommandDeframer::new();
        let good = encode_command(&launch_snapshot());

        // Sync byte followed by garbage that fails the checksum.
        for byte in [COMMAND_SYNC, 0x7E, 0x00] {
            assert_eq!(deframer.push(byte), None);
        }

        let mut decoded = None;
        for byte in good {
            decoded = deframer.push(byte);
        }
        assert_eq!(decoded, Some(launch_snapshot()));
    }
}

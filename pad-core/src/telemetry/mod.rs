//! Telemetry event catalog and bounded history shared by firmware and host
//! targets.
//!
//! The recorder is observability only: the safety behavior of the control
//! loop never depends on what is (or is not) in the ring. Event kinds encode
//! to compact numeric codes so diagnostics channels can ship them without
//! carrying the enum.

use core::fmt;

use heapless::{HistoryBuf, OldestOrdered};

use crate::command::PadSelection;
use crate::panel::PadId;
use crate::pressure::PressureReading;
use crate::time::PadInstant;

/// Identifier used when tracking recorded telemetry events.
pub type EventId = u32;

/// Total number of telemetry entries retained in memory.
pub const TELEMETRY_RING_CAPACITY: usize = 64;

/// Discriminated telemetry events shared across pad targets.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TelemetryEventKind {
    ValveOpened(PadId),
    ValveClosed(PadId),
    CompressorOn,
    CompressorOff,
    CommFault,
    CommRestored,
    Fired,
    Custom(u16),
}

impl fmt::Display for TelemetryEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryEventKind::ValveOpened(pad) => write!(f, "valve-opened {pad:?}"),
            TelemetryEventKind::ValveClosed(pad) => write!(f, "valve-closed {pad:?}"),
            TelemetryEventKind::CompressorOn => f.write_str("compressor-on"),
            TelemetryEventKind::CompressorOff => f.write_str("compressor-off"),
            TelemetryEventKind::CommFault => f.write_str("comm-fault"),
            TelemetryEventKind::CommRestored => f.write_str("comm-restored"),
            TelemetryEventKind::Fired => f.write_str("fired"),
            TelemetryEventKind::Custom(code) => write!(f, "custom({code})"),
        }
    }
}

impl TelemetryEventKind {
    const VALVE_OPEN_BASE: u16 = 0x0000;
    const VALVE_CLOSE_BASE: u16 = 0x0002;
    const COMPRESSOR_ON_CODE: u16 = 0x0004;
    const COMPRESSOR_OFF_CODE: u16 = 0x0005;
    const COMM_FAULT_CODE: u16 = 0x0006;
    const COMM_RESTORED_CODE: u16 = 0x0007;
    const FIRED_CODE: u16 = 0x0008;

    /// Encodes the event into a compact transport-friendly discriminant.
    #[must_use]
    pub const fn to_raw(self) -> u16 {
        match self {
            TelemetryEventKind::ValveOpened(pad) => Self::VALVE_OPEN_BASE + pad.as_index() as u16,
            TelemetryEventKind::ValveClosed(pad) => Self::VALVE_CLOSE_BASE + pad.as_index() as u16,
            TelemetryEventKind::CompressorOn => Self::COMPRESSOR_ON_CODE,
            TelemetryEventKind::CompressorOff => Self::COMPRESSOR_OFF_CODE,
            TelemetryEventKind::CommFault => Self::COMM_FAULT_CODE,
            TelemetryEventKind::CommRestored => Self::COMM_RESTORED_CODE,
            TelemetryEventKind::Fired => Self::FIRED_CODE,
            TelemetryEventKind::Custom(code) => code,
        }
    }

    /// Decodes a raw discriminant, falling back to [`Custom`].
    ///
    /// [`Custom`]: TelemetryEventKind::Custom
    #[must_use]
    pub fn from_raw(code: u16) -> Self {
        match code {
            Self::COMPRESSOR_ON_CODE => TelemetryEventKind::CompressorOn,
            Self::COMPRESSOR_OFF_CODE => TelemetryEventKind::CompressorOff,
            Self::COMM_FAULT_CODE => TelemetryEventKind::CommFault,
            Self::COMM_RESTORED_CODE => TelemetryEventKind::CommRestored,
            Self::FIRED_CODE => TelemetryEventKind::Fired,
            value if (Self::VALVE_OPEN_BASE..Self::VALVE_CLOSE_BASE).contains(&value) => {
                let offset = (value - Self::VALVE_OPEN_BASE) as usize;
                PadId::from_index(offset).map_or(TelemetryEventKind::Custom(value), |pad| {
                    TelemetryEventKind::ValveOpened(pad)
                })
            }
            value if (Self::VALVE_CLOSE_BASE..Self::COMPRESSOR_ON_CODE).contains(&value) => {
                let offset = (value - Self::VALVE_CLOSE_BASE) as usize;
                PadId::from_index(offset).map_or(TelemetryEventKind::Custom(value), |pad| {
                    TelemetryEventKind::ValveClosed(pad)
                })
            }
            other => TelemetryEventKind::Custom(other),
        }
    }
}

/// Payloads carried alongside telemetry events.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TelemetryPayload {
    /// No additional metadata accompanies the event.
    None,
    /// Summary of a completed firing.
    Firing(FiringTelemetry),
}

/// Firing summary payload.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FiringTelemetry {
    pub pads: PadSelection,
    pub post_fire: PressureReading,
}

impl FiringTelemetry {
    /// Creates a new firing payload.
    #[must_use]
    pub const fn new(pads: PadSelection, post_fire: PressureReading) -> Self {
        Self { pads, post_fire }
    }
}

/// Telemetry record stored in the ring buffer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TelemetryRecord<I>
where
    I: Copy,
{
    pub id: EventId,
    pub timestamp: I,
    pub event: TelemetryEventKind,
    pub details: TelemetryPayload,
}

/// Records telemetry events into a fixed-size ring buffer.
pub struct TelemetryRecorder<I, const CAPACITY: usize = TELEMETRY_RING_CAPACITY>
where
    I: Copy,
{
    ring: HistoryBuf<TelemetryRecord<I>, CAPACITY>,
    next_event_id: EventId,
}

impl<I, const CAPACITY: usize> TelemetryRecorder<I, CAPACITY>
where
    I: Copy + PadInstant,
{
    /// Creates a recorder with an empty history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: HistoryBuf::new(),
            next_event_id: 0,
        }
    }

    /// Records an arbitrary telemetry event with the supplied payload.
    pub fn record(
        &mut self,
        event: TelemetryEventKind,
        payload: TelemetryPayload,
        timestamp: I,
    ) -> EventId {
        let id = self.next_event_id;
        self.next_event_id = self.next_event_id.wrapping_add(1);

        self.ring.write(TelemetryRecord {
            id,
            timestamp,
            event,
            details: payload,
        });

        id
    }

    /// Records a completed firing: valve transitions for each selected pad
    /// plus the post-fire summary.
    pub fn record_firing(
        &mut self,
        pads: PadSelection,
        post_fire: PressureReading,
        timestamp: I,
    ) -> EventId {
        if pads.pad1 {
            self.record(
                TelemetryEventKind::ValveOpened(PadId::Pad1),
                TelemetryPayload::None,
                timestamp,
            );
            self.record(
                TelemetryEventKind::ValveClosed(PadId::Pad1),
                TelemetryPayload::None,
                timestamp,
            );
        }
        if pads.pad2 {
            self.record(
                TelemetryEventKind::ValveOpened(PadId::Pad2),
                TelemetryPayload::None,
                timestamp,
            );
            self.record(
                TelemetryEventKind::ValveClosed(PadId::Pad2),
                TelemetryPayload::None,
                timestamp,
            );
        }

        self.record(
            TelemetryEventKind::Fired,
            TelemetryPayload::Firing(FiringTelemetry::new(pads, post_fire)),
            timestamp,
        )
    }

    /// Returns an iterator over the recorded telemetry in chronological order.
    pub fn oldest_first(&self) -> OldestOrdered<'_, TelemetryRecord<I>> {
        self.ring.oldest_ordered()
    }

    /// Returns the most recent telemetry record, if available.
    #[must_use]
    pub fn latest(&self) -> Option<&TelemetryRecord<I>> {
        self.ring.recent()
    }

    /// Returns the number of records currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Returns `true` when no telemetry records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
}

impl<I, const CAPACITY: usize> Default for TelemetryRecorder<I, CAPACITY>
where
    I: Copy + PadInstant,
{
    fn default() -> Self {
        Self::new()
    }
}

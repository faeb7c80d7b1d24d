#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! Shared status storage for the firmware target.
//!
//! Lightweight atomics mirror the commanded output levels, the latest
//! chamber samples, and the link state so diagnostics can read a consistent
//! snapshot without touching the control task's state.

use pad_core::panel::{ALL_CHANNELS, OutputChannel};
use pad_core::pressure::PressureReading;
use portable_atomic::{AtomicBool, AtomicU8, AtomicU16, Ordering};

/// Bitmask of the commanded output levels (1 == energized / lit).
static OUTPUT_MASK: AtomicU8 = AtomicU8::new(0);
/// Raw ADC counts for chamber 1.
static CHAMBER1_COUNTS: AtomicU16 = AtomicU16::new(0);
/// Raw ADC counts for chamber 2.
static CHAMBER2_COUNTS: AtomicU16 = AtomicU16::new(0);
/// Tracks whether the ground-station link is inside its watchdog window.
static LINK_OK: AtomicBool = AtomicBool::new(true);

fn bit_for(channel: OutputChannel) -> u8 {
    1 << channel.as_index()
}

/// Records the commanded level for an output channel.
pub fn record_output(channel: OutputChannel, on: bool) {
    let bit = bit_for(channel);
    if on {
        OUTPUT_MASK.fetch_or(bit, Ordering::Relaxed);
    } else {
        OUTPUT_MASK.fetch_and(!bit, Ordering::Relaxed);
    }
}

/// Returns the commanded level of every output channel.
pub fn output_levels() -> [bool; ALL_CHANNELS.len()] {
    let mask = OUTPUT_MASK.load(Ordering::Relaxed);
    let mut levels = [false; ALL_CHANNELS.len()];
    for (level, channel) in levels.iter_mut().zip(ALL_CHANNELS) {
        *level = mask & bit_for(channel) != 0;
    }
    levels
}

/// Stores the latest chamber samples.
pub fn record_pressures(reading: PressureReading) {
    CHAMBER1_COUNTS.store(reading.chamber1, Ordering::Relaxed);
    CHAMBER2_COUNTS.store(reading.chamber2, Ordering::Relaxed);
}

/// Returns the most recent chamber samples.
pub fn pressures() -> PressureReading {
    PressureReading::new(
        CHAMBER1_COUNTS.load(Ordering::Relaxed),
        CHAMBER2_COUNTS.load(Ordering::Relaxed),
    )
}

/// Updates the cached link-health flag.
pub fn set_link_ok(ok: bool) {
    LINK_OK.store(ok, Ordering::Relaxed);
}

/// Returns `true` while the watchdog considers the link alive.
pub fn link_ok() -> bool {
    LINK_OK.load(Ordering::Relaxed)
}

/// Point-in-time view of the shared status storage.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PadStatusSnapshot {
    pub outputs: [bool; ALL_CHANNELS.len()],
    pub pressures: PressureReading,
    pub link_ok: bool,
}

/// Builds a [`PadStatusSnapshot`] from the stored metrics.
pub fn snapshot() -> PadStatusSnapshot {
    PadStatusSnapshot {
        outputs: output_levels(),
        pressures: pressures(),
        link_ok: link_ok(),
    }
}

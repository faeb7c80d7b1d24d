#![no_std]

#[cfg(feature = "alloc")]
extern crate alloc;

// Shared control-loop logic for the launch pad controller.
//
// This crate stays portable across MCU firmware and host tooling by avoiding
// the Rust standard library and exposing abstractions the other crates adopt.

pub mod command;
pub mod controller;
pub mod heartbeat;
pub mod panel;
pub mod pressure;
pub mod sequencer;
pub mod telemetry;
pub mod time;
pub mod watchdog;

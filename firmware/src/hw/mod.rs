//! Hardware sampling helpers for the STM32G0 target.

#[cfg(target_os = "none")]
pub mod pressure;

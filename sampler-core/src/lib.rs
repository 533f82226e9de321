#![no_std]

// Shared acquisition logic for the power-meter analog front end.
//
// This crate stays portable across MCU firmware and host tooling by avoiding
// the Rust standard library; the firmware and emulator crates bind these
// abstractions to real or synthetic conversion hardware.

pub mod inputs;
pub mod sampler;
pub mod slot;
pub mod telemetry;
pub mod trigger;

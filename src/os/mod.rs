// src/os/mod.rs

//! Operating system plumbing: the serial device, port discovery and signals.

pub mod ports;
pub mod serial;
pub mod signal;

#[cfg(test)]
mod serial_tests;

//! Board-agnostic control core for the Diphros bridge firmware
//!
//! This crate contains all bridge logic that does not depend on specific
//! hardware implementations:
//!
//! - Hardware abstraction traits (pins, PWM, drive, encoders, sensing)
//! - Channel mode controller for the generic and built-in IO channels
//! - Low-voltage hysteresis monitor gating actuator output
//! - Heartbeat watchdog forcing safe output on communication loss
//! - The per-cycle controller tying it all together
//!
//! The bus transport stays outside: the firmware captures a register bank
//! snapshot at cycle start, runs [`controller::BridgeController::run_cycle`]
//! against it, and publishes the result. All decisions within a cycle are
//! made from that one snapshot.

#![no_std]
#![deny(unsafe_code)]

pub mod channels;
pub mod config;
pub mod controller;
pub mod traits;
pub mod voltage;
pub mod watchdog;

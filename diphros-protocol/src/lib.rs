//! Shared-register bus protocol for the Diphros bridge
//!
//! This crate defines the data contract between the single-board computer
//! (bus master) and the bridge controller. The master reads and writes a
//! fixed-layout register bank over the serial bus; the bridge services it
//! once per control cycle.
//!
//! # Register bank overview
//!
//! ```text
//! ┌──────────────┬───────┬───────────┬──────────────────────────────┐
//! │ field        │ bytes │ direction │ notes                        │
//! ├──────────────┼───────┼───────────┼──────────────────────────────┤
//! │ ident/status │ 2     │ out       │ identity stamp, config flag  │
//! │ heartbeat    │ 1     │ in  (s-c) │ liveness, cleared by bridge  │
//! │ config regs  │ 3     │ in  (s-c) │ builtin u8 + io u16 commands │
//! │ channel I/O  │ 14    │ bidir     │ 4 builtin DIO + 5 ext values │
//! │ drive        │ 4     │ in        │ left/right motor commands    │
//! │ encoders     │ 10    │ mixed     │ resets (s-c) + tick counts   │
//! │ battery      │ 2     │ out       │ millivolts                   │
//! └──────────────┴───────┴───────────┴──────────────────────────────┘
//! ```
//!
//! "s-c" marks self-clearing fields: the master sets them to issue a
//! command, the bridge clears them exactly once after acting - the
//! request/acknowledge handshake the whole protocol is built on.
//!
//! Byte offsets are a wire contract shared with the bus master and must
//! stay stable across firmware revisions.

#![no_std]
#![deny(unsafe_code)]

pub mod commands;
pub mod registers;

pub use commands::{
    BuiltinConfigCommand, BuiltinMode, ChannelMode, IoConfigCommand, BUILTIN_CHANNEL_COUNT,
    BUILTIN_CONFIG_FLAG, EXT_CHANNEL_COUNT, IO_CONFIG_FLAG,
};
pub use registers::{LayoutError, RegisterBank, FIRMWARE_IDENT, REGISTER_BANK_SIZE};

//! Register bank layout and byte codec
//!
//! The register bank is the shared-memory contract between the bus master
//! and the bridge. It is pure data: no validation happens here beyond the
//! byte-level layout. Inbound numeric ranges are enforced downstream
//! (out-of-range drive commands are clamped by the motor driver, not the
//! codec).
//!
//! Wire format is little-endian with one byte per bool, matching the
//! layout the bus master compiles against. Offsets are part of the
//! protocol and must not change between firmware revisions.

use crate::commands::{BUILTIN_CHANNEL_COUNT, EXT_CHANNEL_COUNT};
use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identity stamp written to `firmware_ident` every cycle
pub const FIRMWARE_IDENT: u8 = 0x44;

/// Total size of the register bank in bytes
pub const REGISTER_BANK_SIZE: usize = 36;

// Byte offsets of each field. The master addresses fields by these
// offsets, so they are spelled out rather than derived.
pub const OFFSET_FIRMWARE_IDENT: usize = 0;
pub const OFFSET_STATUS: usize = 1;
pub const OFFSET_HEARTBEAT: usize = 2;
pub const OFFSET_BUILTIN_CONFIG: usize = 3;
pub const OFFSET_IO_CONFIG: usize = 4;
pub const OFFSET_BUILTIN_DIO: usize = 6;
pub const OFFSET_EXT_IO: usize = 10;
pub const OFFSET_LEFT_MOTOR: usize = 20;
pub const OFFSET_RIGHT_MOTOR: usize = 22;
pub const OFFSET_RESET_LEFT_ENCODER: usize = 24;
pub const OFFSET_RESET_RIGHT_ENCODER: usize = 25;
pub const OFFSET_LEFT_ENCODER: usize = 26;
pub const OFFSET_RIGHT_ENCODER: usize = 30;
pub const OFFSET_BATTERY_MILLIVOLTS: usize = 34;

/// Errors that can occur during register bank encoding or decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayoutError {
    /// Buffer shorter than [`REGISTER_BANK_SIZE`]
    BufferTooSmall,
}

/// The bus-visible register bank
///
/// Direction notes are from the bridge's point of view: "out" fields are
/// published every cycle, "in" fields are commands from the master,
/// "bidir" fields flow either way depending on the channel's mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegisterBank {
    /// Out: constant identity stamp
    pub firmware_ident: u8,
    /// Out: 1 once any channel configuration has been applied
    pub status: u8,
    /// In, self-clearing: master liveness signal
    pub heartbeat: bool,
    /// In, self-clearing: built-in channel config command (flag bit 7)
    pub builtin_config: u8,
    /// In, self-clearing: generic IO channel config command (flag bit 15)
    pub io_config: u16,
    /// Bidir: built-in channel states (buttons in, LEDs out)
    pub builtin_dio: [bool; BUILTIN_CHANNEL_COUNT],
    /// Bidir: generic channel values; digital as 0/1, analog/PWM as signed
    pub ext_io: [i16; EXT_CHANNEL_COUNT],
    /// In: left drive command, -400..400
    pub left_motor: i16,
    /// In: right drive command, -400..400
    pub right_motor: i16,
    /// In, self-clearing: one-shot left encoder reset request
    pub reset_left_encoder: bool,
    /// In, self-clearing: one-shot right encoder reset request
    pub reset_right_encoder: bool,
    /// Out: cumulative left encoder ticks
    pub left_encoder: i32,
    /// Out: cumulative right encoder ticks
    pub right_encoder: i32,
    /// Out: battery voltage reading
    pub battery_millivolts: u16,
}

impl Default for RegisterBank {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterBank {
    /// Create a freshly zeroed bank carrying the identity stamp
    ///
    /// Const so the firmware can keep the bank in a static.
    pub const fn new() -> Self {
        Self {
            firmware_ident: FIRMWARE_IDENT,
            status: 0,
            heartbeat: false,
            builtin_config: 0,
            io_config: 0,
            builtin_dio: [false; BUILTIN_CHANNEL_COUNT],
            ext_io: [0; EXT_CHANNEL_COUNT],
            left_motor: 0,
            right_motor: 0,
            reset_left_encoder: false,
            reset_right_encoder: false,
            left_encoder: 0,
            right_encoder: 0,
            battery_millivolts: 0,
        }
    }

    /// Encode the bank into a byte buffer
    ///
    /// Returns the number of bytes written.
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, LayoutError> {
        if buffer.len() < REGISTER_BANK_SIZE {
            return Err(LayoutError::BufferTooSmall);
        }

        buffer[OFFSET_FIRMWARE_IDENT] = self.firmware_ident;
        buffer[OFFSET_STATUS] = self.status;
        buffer[OFFSET_HEARTBEAT] = self.heartbeat as u8;
        buffer[OFFSET_BUILTIN_CONFIG] = self.builtin_config;
        buffer[OFFSET_IO_CONFIG..OFFSET_IO_CONFIG + 2]
            .copy_from_slice(&self.io_config.to_le_bytes());
        for (i, &level) in self.builtin_dio.iter().enumerate() {
            buffer[OFFSET_BUILTIN_DIO + i] = level as u8;
        }
        for (i, &value) in self.ext_io.iter().enumerate() {
            let at = OFFSET_EXT_IO + i * 2;
            buffer[at..at + 2].copy_from_slice(&value.to_le_bytes());
        }
        buffer[OFFSET_LEFT_MOTOR..OFFSET_LEFT_MOTOR + 2]
            .copy_from_slice(&self.left_motor.to_le_bytes());
        buffer[OFFSET_RIGHT_MOTOR..OFFSET_RIGHT_MOTOR + 2]
            .copy_from_slice(&self.right_motor.to_le_bytes());
        buffer[OFFSET_RESET_LEFT_ENCODER] = self.reset_left_encoder as u8;
        buffer[OFFSET_RESET_RIGHT_ENCODER] = self.reset_right_encoder as u8;
        buffer[OFFSET_LEFT_ENCODER..OFFSET_LEFT_ENCODER + 4]
            .copy_from_slice(&self.left_encoder.to_le_bytes());
        buffer[OFFSET_RIGHT_ENCODER..OFFSET_RIGHT_ENCODER + 4]
            .copy_from_slice(&self.right_encoder.to_le_bytes());
        buffer[OFFSET_BATTERY_MILLIVOLTS..OFFSET_BATTERY_MILLIVOLTS + 2]
            .copy_from_slice(&self.battery_millivolts.to_le_bytes());

        Ok(REGISTER_BANK_SIZE)
    }

    /// Encode the bank into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, REGISTER_BANK_SIZE>, LayoutError> {
        let mut buffer = [0u8; REGISTER_BANK_SIZE];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| LayoutError::BufferTooSmall)?;
        Ok(vec)
    }

    /// Decode a bank from a byte buffer
    pub fn decode(buffer: &[u8]) -> Result<Self, LayoutError> {
        if buffer.len() < REGISTER_BANK_SIZE {
            return Err(LayoutError::BufferTooSmall);
        }

        let mut builtin_dio = [false; BUILTIN_CHANNEL_COUNT];
        for (i, level) in builtin_dio.iter_mut().enumerate() {
            *level = buffer[OFFSET_BUILTIN_DIO + i] != 0;
        }
        let mut ext_io = [0i16; EXT_CHANNEL_COUNT];
        for (i, value) in ext_io.iter_mut().enumerate() {
            let at = OFFSET_EXT_IO + i * 2;
            *value = i16::from_le_bytes([buffer[at], buffer[at + 1]]);
        }

        Ok(Self {
            firmware_ident: buffer[OFFSET_FIRMWARE_IDENT],
            status: buffer[OFFSET_STATUS],
            heartbeat: buffer[OFFSET_HEARTBEAT] != 0,
            builtin_config: buffer[OFFSET_BUILTIN_CONFIG],
            io_config: u16::from_le_bytes([
                buffer[OFFSET_IO_CONFIG],
                buffer[OFFSET_IO_CONFIG + 1],
            ]),
            builtin_dio,
            ext_io,
            left_motor: i16::from_le_bytes([
                buffer[OFFSET_LEFT_MOTOR],
                buffer[OFFSET_LEFT_MOTOR + 1],
            ]),
            right_motor: i16::from_le_bytes([
                buffer[OFFSET_RIGHT_MOTOR],
                buffer[OFFSET_RIGHT_MOTOR + 1],
            ]),
            reset_left_encoder: buffer[OFFSET_RESET_LEFT_ENCODER] != 0,
            reset_right_encoder: buffer[OFFSET_RESET_RIGHT_ENCODER] != 0,
            left_encoder: i32::from_le_bytes([
                buffer[OFFSET_LEFT_ENCODER],
                buffer[OFFSET_LEFT_ENCODER + 1],
                buffer[OFFSET_LEFT_ENCODER + 2],
                buffer[OFFSET_LEFT_ENCODER + 3],
            ]),
            right_encoder: i32::from_le_bytes([
                buffer[OFFSET_RIGHT_ENCODER],
                buffer[OFFSET_RIGHT_ENCODER + 1],
                buffer[OFFSET_RIGHT_ENCODER + 2],
                buffer[OFFSET_RIGHT_ENCODER + 3],
            ]),
            battery_millivolts: u16::from_le_bytes([
                buffer[OFFSET_BATTERY_MILLIVOLTS],
                buffer[OFFSET_BATTERY_MILLIVOLTS + 1],
            ]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bank_carries_ident() {
        let bank = RegisterBank::new();
        assert_eq!(bank.firmware_ident, FIRMWARE_IDENT);
        assert_eq!(bank.status, 0);
        assert!(!bank.heartbeat);
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let bank = RegisterBank {
            status: 1,
            heartbeat: true,
            builtin_config: 0x86,
            io_config: 0x8c00,
            builtin_dio: [true, false, true, false],
            ext_io: [1, 0, -400, 512, 399],
            left_motor: -123,
            right_motor: 400,
            reset_left_encoder: true,
            reset_right_encoder: false,
            left_encoder: -1_000_000,
            right_encoder: 2_000_000,
            battery_millivolts: 7200,
            ..RegisterBank::new()
        };

        let bytes = bank.encode_to_vec().unwrap();
        assert_eq!(bytes.len(), REGISTER_BANK_SIZE);

        let decoded = RegisterBank::decode(&bytes).unwrap();
        assert_eq!(decoded, bank);
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let bank = RegisterBank::new();
        let mut buffer = [0u8; REGISTER_BANK_SIZE - 1];
        assert_eq!(bank.encode(&mut buffer), Err(LayoutError::BufferTooSmall));
    }

    #[test]
    fn test_decode_buffer_too_small() {
        let buffer = [0u8; REGISTER_BANK_SIZE - 1];
        assert_eq!(
            RegisterBank::decode(&buffer),
            Err(LayoutError::BufferTooSmall)
        );
    }

    #[test]
    fn test_wire_offsets_are_stable() {
        // The bus master addresses fields by offset; this pins the map.
        let bank = RegisterBank {
            io_config: 0x8001,
            left_motor: 0x0102,
            battery_millivolts: 0x1a2b,
            ..RegisterBank::new()
        };
        let mut buffer = [0u8; REGISTER_BANK_SIZE];
        bank.encode(&mut buffer).unwrap();

        assert_eq!(buffer[OFFSET_FIRMWARE_IDENT], FIRMWARE_IDENT);
        // Little-endian words at their published offsets
        assert_eq!(buffer[OFFSET_IO_CONFIG], 0x01);
        assert_eq!(buffer[OFFSET_IO_CONFIG + 1], 0x80);
        assert_eq!(buffer[OFFSET_LEFT_MOTOR], 0x02);
        assert_eq!(buffer[OFFSET_LEFT_MOTOR + 1], 0x01);
        assert_eq!(buffer[OFFSET_BATTERY_MILLIVOLTS], 0x2b);
        assert_eq!(buffer[OFFSET_BATTERY_MILLIVOLTS + 1], 0x1a);
    }

    #[test]
    fn test_negative_ext_io_roundtrip() {
        let bank = RegisterBank {
            ext_io: [-400, -1, 0, 1, 400],
            ..RegisterBank::new()
        };
        let mut buffer = [0u8; REGISTER_BANK_SIZE];
        bank.encode(&mut buffer).unwrap();
        let decoded = RegisterBank::decode(&buffer).unwrap();
        assert_eq!(decoded.ext_io, [-400, -1, 0, 1, 400]);
    }
}

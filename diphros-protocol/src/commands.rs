//! Self-clearing command register codecs
//!
//! Two registers in the bank are one-shot command registers: the master
//! writes a value with the top "new command" flag bit set, the bridge
//! decodes it, applies it, and writes the register back to 0 as the
//! acknowledgement. Decoding here is pure - clearing the register is the
//! caller's obligation, exactly once per accepted command.
//!
//! Bit layout (fixed wire contract):
//!
//! ```text
//! io_config (u16):       [F][c0 c0][c1 c1][c2 c2][c3 c3][c4 c4][- -]
//!                         15 14-13  12-11  10-9    8-7    6-5   1-0
//! builtin_config (u8):   [F][-][-][-][b3][b2][b1][b0]
//!                         7              3   2   1   0
//! ```
//!
//! Generic channels carry a 2-bit mode each, packed most-significant-
//! channel-first; built-in channels carry a single in/out bit each.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of generic IO channels
pub const EXT_CHANNEL_COUNT: usize = 5;

/// Number of built-in DIO channels
pub const BUILTIN_CHANNEL_COUNT: usize = 4;

/// New-command flag bit of the `io_config` register
pub const IO_CONFIG_FLAG: u16 = 1 << 15;

/// New-command flag bit of the `builtin_config` register
pub const BUILTIN_CONFIG_FLAG: u8 = 1 << 7;

/// Mode of a generic IO channel (2-bit wire encoding)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ChannelMode {
    /// Pin driven as a digital output
    #[default]
    DigitalOut,
    /// Pin sampled as a digital input
    DigitalIn,
    /// Pin sampled through the analog converter
    AnalogIn,
    /// Pin driven by the PWM actuator
    Pwm,
}

impl ChannelMode {
    /// Decode a 2-bit field value
    ///
    /// Every 2-bit pattern maps to a defined mode; whether a channel can
    /// actually honor the mode (e.g. has an analog source) is decided by
    /// the channel controller, not the codec.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0 => ChannelMode::DigitalOut,
            1 => ChannelMode::DigitalIn,
            2 => ChannelMode::AnalogIn,
            _ => ChannelMode::Pwm,
        }
    }

    /// Wire encoding of this mode
    pub fn bits(self) -> u8 {
        match self {
            ChannelMode::DigitalOut => 0,
            ChannelMode::DigitalIn => 1,
            ChannelMode::AnalogIn => 2,
            ChannelMode::Pwm => 3,
        }
    }
}

/// Direction submode of a configurable built-in channel (1-bit encoding)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BuiltinMode {
    /// Drive the channel's indicator LED from the bank value
    #[default]
    Out,
    /// Surface the channel's button state into the bank value
    In,
}

impl BuiltinMode {
    fn from_bit(bit: bool) -> Self {
        if bit {
            BuiltinMode::In
        } else {
            BuiltinMode::Out
        }
    }

    fn bit(self) -> u8 {
        match self {
            BuiltinMode::Out => 0,
            BuiltinMode::In => 1,
        }
    }
}

/// A decoded generic-channel configuration command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IoConfigCommand {
    /// Requested mode per generic channel
    pub modes: [ChannelMode; EXT_CHANNEL_COUNT],
}

/// A decoded built-in-channel configuration command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BuiltinConfigCommand {
    /// Requested submode per built-in channel
    ///
    /// All four bits are surfaced; only channels 1 and 2 are actually
    /// configurable and the channel controller ignores the rest.
    pub modes: [BuiltinMode; BUILTIN_CHANNEL_COUNT],
}

/// Bit shift of generic channel `channel`'s 2-bit mode field
fn io_mode_shift(channel: usize) -> u16 {
    13 - 2 * channel as u16
}

/// Decode the `io_config` command register
///
/// Returns `None` without side effect unless the new-command flag is set.
pub fn decode_io(reg: u16) -> Option<IoConfigCommand> {
    if reg & IO_CONFIG_FLAG == 0 {
        return None;
    }

    let mut modes = [ChannelMode::DigitalOut; EXT_CHANNEL_COUNT];
    for (channel, mode) in modes.iter_mut().enumerate() {
        *mode = ChannelMode::from_bits((reg >> io_mode_shift(channel)) as u8);
    }
    Some(IoConfigCommand { modes })
}

/// Encode an `io_config` command register value (bus-master side)
pub fn encode_io(cmd: &IoConfigCommand) -> u16 {
    let mut reg = IO_CONFIG_FLAG;
    for (channel, mode) in cmd.modes.iter().enumerate() {
        reg |= (mode.bits() as u16) << io_mode_shift(channel);
    }
    reg
}

/// Decode the `builtin_config` command register
///
/// Returns `None` without side effect unless the new-command flag is set.
pub fn decode_builtin(reg: u8) -> Option<BuiltinConfigCommand> {
    if reg & BUILTIN_CONFIG_FLAG == 0 {
        return None;
    }

    let mut modes = [BuiltinMode::Out; BUILTIN_CHANNEL_COUNT];
    for (channel, mode) in modes.iter_mut().enumerate() {
        *mode = BuiltinMode::from_bit(reg & (1 << channel) != 0);
    }
    Some(BuiltinConfigCommand { modes })
}

/// Encode a `builtin_config` command register value (bus-master side)
pub fn encode_builtin(cmd: &BuiltinConfigCommand) -> u8 {
    let mut reg = BUILTIN_CONFIG_FLAG;
    for (channel, mode) in cmd.modes.iter().enumerate() {
        reg |= mode.bit() << channel;
    }
    reg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_io_without_flag_is_none() {
        // A valid-looking payload without the flag bit is not a command.
        assert_eq!(decode_io(0x2c00), None);
        assert_eq!(decode_io(0), None);
    }

    #[test]
    fn test_decode_io_channel_fields() {
        // Channel 2's field sits at bits 10-9.
        let reg = IO_CONFIG_FLAG | (ChannelMode::Pwm.bits() as u16) << 9;
        let cmd = decode_io(reg).unwrap();
        assert_eq!(cmd.modes[2], ChannelMode::Pwm);
        assert_eq!(cmd.modes[0], ChannelMode::DigitalOut);
        assert_eq!(cmd.modes[4], ChannelMode::DigitalOut);
    }

    #[test]
    fn test_decode_io_most_significant_channel_first() {
        // Channel 0 occupies the highest field, just under the flag.
        let reg = IO_CONFIG_FLAG | (ChannelMode::AnalogIn.bits() as u16) << 13;
        let cmd = decode_io(reg).unwrap();
        assert_eq!(cmd.modes[0], ChannelMode::AnalogIn);
        for channel in 1..EXT_CHANNEL_COUNT {
            assert_eq!(cmd.modes[channel], ChannelMode::DigitalOut);
        }
    }

    #[test]
    fn test_io_roundtrip() {
        let cmd = IoConfigCommand {
            modes: [
                ChannelMode::DigitalIn,
                ChannelMode::AnalogIn,
                ChannelMode::Pwm,
                ChannelMode::DigitalOut,
                ChannelMode::Pwm,
            ],
        };
        let reg = encode_io(&cmd);
        assert_ne!(reg & IO_CONFIG_FLAG, 0);
        assert_eq!(decode_io(reg), Some(cmd));
    }

    #[test]
    fn test_decode_cleared_register_is_none() {
        // After the bridge acknowledges by clearing, re-decoding yields
        // nothing - the idempotent-once handshake.
        let reg = encode_io(&IoConfigCommand {
            modes: [ChannelMode::Pwm; EXT_CHANNEL_COUNT],
        });
        assert!(decode_io(reg).is_some());
        assert_eq!(decode_io(0), None);
        assert_eq!(decode_io(0), None);
    }

    #[test]
    fn test_decode_builtin_without_flag_is_none() {
        assert_eq!(decode_builtin(0x06), None);
        assert_eq!(decode_builtin(0), None);
    }

    #[test]
    fn test_decode_builtin_bits() {
        let cmd = decode_builtin(BUILTIN_CONFIG_FLAG | 0b0110).unwrap();
        assert_eq!(cmd.modes[0], BuiltinMode::Out);
        assert_eq!(cmd.modes[1], BuiltinMode::In);
        assert_eq!(cmd.modes[2], BuiltinMode::In);
        assert_eq!(cmd.modes[3], BuiltinMode::Out);
    }

    #[test]
    fn test_builtin_roundtrip() {
        let cmd = BuiltinConfigCommand {
            modes: [
                BuiltinMode::In,
                BuiltinMode::Out,
                BuiltinMode::In,
                BuiltinMode::Out,
            ],
        };
        assert_eq!(decode_builtin(encode_builtin(&cmd)), Some(cmd));
    }

    #[test]
    fn test_every_two_bit_pattern_decodes() {
        for bits in 0..4u8 {
            assert_eq!(ChannelMode::from_bits(bits).bits(), bits);
        }
    }
}

//! Bridge configuration types
//!
//! Compile-time-defaulted deployment parameters: which board pins back
//! each generic channel, the safety thresholds, and the heartbeat
//! timeout. Defaults mirror the reference deployment.

use diphros_protocol::EXT_CHANNEL_COUNT;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Supply voltage below this reads as "low" (mV)
pub const LOW_VOLTAGE_THRESHOLD_MV: u16 = 5550;

/// Consecutive qualifying cycles required to commit a lockout transition
pub const LOW_VOLTAGE_DEBOUNCE_CYCLES: u32 = 500;

/// Drive output is forced safe after this long without a heartbeat (ms)
pub const HEARTBEAT_TIMEOUT_MS: u32 = 1000;

/// Neutral PWM command written while locked out (center of -400..400)
pub const PWM_NEUTRAL_COMMAND: i16 = 0;

/// Board pin assignments per generic channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelPinMap {
    /// Digital pin backing each channel
    pub dio: [u8; EXT_CHANNEL_COUNT],
    /// Analog source behind each channel, if it has one
    ///
    /// Channels without an analog source ignore `AnalogIn` configuration
    /// requests, keeping their prior mode.
    pub analog: [Option<u8>; EXT_CHANNEL_COUNT],
}

impl Default for ChannelPinMap {
    fn default() -> Self {
        Self {
            dio: [11, 4, 20, 21, 22],
            analog: [None, Some(6), Some(2), Some(3), Some(4)],
        }
    }
}

/// Low-voltage monitor parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LowVoltageConfig {
    /// Readings below this count as low (mV)
    pub threshold_mv: u16,
    /// Consecutive samples required to commit a transition
    pub debounce_cycles: u32,
}

impl Default for LowVoltageConfig {
    fn default() -> Self {
        Self {
            threshold_mv: LOW_VOLTAGE_THRESHOLD_MV,
            debounce_cycles: LOW_VOLTAGE_DEBOUNCE_CYCLES,
        }
    }
}

/// Full bridge configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BridgeConfig {
    /// Generic channel pin assignments
    pub pins: ChannelPinMap,
    /// Low-voltage lockout parameters
    pub low_voltage: LowVoltageConfig,
    /// Heartbeat staleness timeout (ms)
    pub heartbeat_timeout_ms: u32,
    /// PWM command substituted while locked out
    pub pwm_neutral: i16,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            pins: ChannelPinMap::default(),
            low_voltage: LowVoltageConfig::default(),
            heartbeat_timeout_ms: HEARTBEAT_TIMEOUT_MS,
            pwm_neutral: PWM_NEUTRAL_COMMAND,
        }
    }
}

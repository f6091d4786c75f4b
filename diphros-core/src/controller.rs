//! Per-cycle bridge controller
//!
//! One `run_cycle` call is one control period. The controller owns no
//! hardware and no clock: the caller hands it the register image, the
//! HAL, and the current time, which keeps every safety behavior testable
//! on the host.
//!
//! Cycle order matters and is fixed:
//!
//! 1. sample the battery and update the lockout monitor
//! 2. consume the heartbeat flag
//! 3. decode and acknowledge pending configuration commands
//! 4. service the channel banks
//! 5. command the drive motors (forced safe when stale or locked out)
//! 6. honor encoder reset requests, then publish encoder counts
//!
//! Voltage is sampled before the channels are serviced so a lockout
//! committed this cycle already suppresses this cycle's PWM output.

use diphros_protocol::commands::{decode_builtin, decode_io};
use diphros_protocol::{RegisterBank, FIRMWARE_IDENT};

use crate::channels::{BuiltinBank, IoChannelBank};
use crate::config::BridgeConfig;
use crate::traits::{AlertPattern, Bridge};
use crate::voltage::{LockoutEdge, LowVoltageMonitor};
use crate::watchdog::HeartbeatWatchdog;

/// Drives the register-bank contract against a board HAL
pub struct BridgeController {
    io: IoChannelBank,
    builtins: BuiltinBank,
    voltage: LowVoltageMonitor,
    watchdog: HeartbeatWatchdog,
    /// Latched once any configuration command has been accepted
    configured: bool,
}

impl Default for BridgeController {
    fn default() -> Self {
        Self::new(BridgeConfig::default())
    }
}

impl BridgeController {
    /// Create a controller for the given deployment configuration
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            io: IoChannelBank::new(config.pins, config.pwm_neutral),
            builtins: BuiltinBank::default(),
            voltage: LowVoltageMonitor::new(config.low_voltage),
            watchdog: HeartbeatWatchdog::new(config.heartbeat_timeout_ms),
            configured: false,
        }
    }

    /// Whether drive output is currently suppressed by the voltage monitor
    pub fn is_locked_out(&self) -> bool {
        self.voltage.is_locked_out()
    }

    /// Run one control cycle at `now_ms`
    pub fn run_cycle<H: Bridge>(&mut self, regs: &mut RegisterBank, hal: &mut H, now_ms: u32) {
        let millivolts = hal.read_millivolts();
        regs.battery_millivolts = millivolts;
        match self.voltage.update(millivolts) {
            Some(LockoutEdge::Engaged) => hal.start(AlertPattern::LowVoltage),
            Some(LockoutEdge::Released) => hal.stop(),
            None => {}
        }
        let locked_out = self.voltage.is_locked_out();

        if self.watchdog.observe(regs.heartbeat, now_ms) {
            regs.heartbeat = false;
        }

        // Command registers acknowledge by clearing, exactly once per
        // accepted command.
        if let Some(cmd) = decode_builtin(regs.builtin_config) {
            self.builtins.apply(&cmd);
            regs.builtin_config = 0;
            self.configured = true;
        }
        if let Some(cmd) = decode_io(regs.io_config) {
            self.io.apply(&cmd, hal);
            regs.io_config = 0;
            self.configured = true;
        }
        regs.status = self.configured as u8;

        self.io.service(&mut regs.ext_io, hal, locked_out);
        self.builtins.service(&mut regs.builtin_dio, hal);

        let stale = self.watchdog.is_stale(now_ms);
        if stale {
            // Zero the commands too, so the master sees what took effect.
            regs.left_motor = 0;
            regs.right_motor = 0;
        }
        if stale || locked_out {
            hal.set_speeds(0, 0);
        } else {
            hal.set_speeds(regs.left_motor, regs.right_motor);
        }

        if regs.reset_left_encoder {
            hal.reset_left();
            regs.reset_left_encoder = false;
        }
        if regs.reset_right_encoder {
            hal.reset_right();
            regs.reset_right_encoder = false;
        }
        regs.left_encoder = hal.read_left();
        regs.right_encoder = hal.read_right();

        regs.firmware_ident = FIRMWARE_IDENT;
    }
}

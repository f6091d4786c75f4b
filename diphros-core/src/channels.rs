//! Generic and built-in channel banks
//!
//! Each bank owns the current mode of its channels and translates
//! accepted configuration commands into pin operations. Reconfiguration
//! happens only in `apply`; `service` just moves data between the
//! register image and the hardware for whatever modes are in force.

use diphros_protocol::{
    BuiltinConfigCommand, BuiltinMode, ChannelMode, IoConfigCommand, BUILTIN_CHANNEL_COUNT,
    EXT_CHANNEL_COUNT,
};

use crate::config::ChannelPinMap;
use crate::traits::{Indicators, PinDirection, PinIo, PwmBank};

/// Built-in channel wired to the user button (mode fixed to input)
pub const BUILTIN_BUTTON_CHANNEL: usize = 0;

/// Built-in channel wired to the status LED (mode fixed to output)
pub const BUILTIN_LED_CHANNEL: usize = 3;

/// The five reconfigurable external channels
#[derive(Debug, Clone)]
pub struct IoChannelBank {
    modes: [ChannelMode; EXT_CHANNEL_COUNT],
    pins: ChannelPinMap,
    pwm_neutral: i16,
}

impl IoChannelBank {
    /// Create a bank with every channel in its power-on mode
    pub fn new(pins: ChannelPinMap, pwm_neutral: i16) -> Self {
        Self {
            modes: [ChannelMode::DigitalOut; EXT_CHANNEL_COUNT],
            pins,
            pwm_neutral,
        }
    }

    /// Current mode of a channel
    pub fn mode(&self, channel: usize) -> ChannelMode {
        self.modes[channel]
    }

    /// Reconfigure channels per an accepted command
    ///
    /// Requests for `AnalogIn` on a channel without an analog source are
    /// ignored; that channel keeps its prior mode. Leaving `Pwm` detaches
    /// the PWM driver before the new mode touches the pin.
    pub fn apply<H>(&mut self, cmd: &IoConfigCommand, hal: &mut H)
    where
        H: PinIo + PwmBank,
    {
        for channel in 0..EXT_CHANNEL_COUNT {
            let requested = cmd.modes[channel];
            if requested == ChannelMode::AnalogIn && self.pins.analog[channel].is_none() {
                continue;
            }
            let previous = self.modes[channel];
            let pin = self.pins.dio[channel];

            if previous == ChannelMode::Pwm
                && requested != ChannelMode::Pwm
                && hal.is_attached(channel)
            {
                hal.detach(channel);
            }

            match requested {
                ChannelMode::DigitalOut => hal.set_direction(pin, PinDirection::Output),
                ChannelMode::DigitalIn => hal.set_direction(pin, PinDirection::Input),
                ChannelMode::AnalogIn => {
                    // Stop driving the pin before handing it to the ADC.
                    if previous == ChannelMode::DigitalOut {
                        hal.set_digital(pin, false);
                    }
                    hal.set_direction(pin, PinDirection::Input);
                }
                ChannelMode::Pwm => {
                    if !hal.is_attached(channel) {
                        hal.attach(channel);
                    }
                }
            }

            self.modes[channel] = requested;
        }
    }

    /// Run one data cycle: drive outputs from the register image and
    /// refresh inputs into it
    ///
    /// While `locked_out`, PWM channels receive the neutral command in
    /// place of the register value; all other modes are unaffected.
    pub fn service<H>(&self, ext_io: &mut [i16; EXT_CHANNEL_COUNT], hal: &mut H, locked_out: bool)
    where
        H: PinIo + PwmBank,
    {
        for channel in 0..EXT_CHANNEL_COUNT {
            let pin = self.pins.dio[channel];
            match self.modes[channel] {
                ChannelMode::DigitalOut => hal.set_digital(pin, ext_io[channel] != 0),
                ChannelMode::DigitalIn => ext_io[channel] = hal.read_digital(pin) as i16,
                ChannelMode::AnalogIn => {
                    // apply() guarantees a source exists for this mode.
                    if let Some(source) = self.pins.analog[channel] {
                        ext_io[channel] = hal.read_analog(source) as i16;
                    }
                }
                ChannelMode::Pwm => {
                    let command = if locked_out {
                        self.pwm_neutral
                    } else {
                        ext_io[channel]
                    };
                    hal.write(channel, command);
                }
            }
        }
    }
}

/// The four built-in channels (button, two spare LEDs, status LED)
#[derive(Debug, Clone)]
pub struct BuiltinBank {
    modes: [BuiltinMode; BUILTIN_CHANNEL_COUNT],
}

impl Default for BuiltinBank {
    fn default() -> Self {
        Self {
            modes: [
                BuiltinMode::In,
                BuiltinMode::Out,
                BuiltinMode::Out,
                BuiltinMode::Out,
            ],
        }
    }
}

impl BuiltinBank {
    /// Current mode of a built-in channel
    pub fn mode(&self, channel: usize) -> BuiltinMode {
        self.modes[channel]
    }

    /// Reconfigure the two channels with selectable direction
    ///
    /// The button channel stays an input and the status LED channel
    /// stays an output regardless of what the command asks for.
    pub fn apply(&mut self, cmd: &BuiltinConfigCommand) {
        for channel in 0..BUILTIN_CHANNEL_COUNT {
            if channel == BUILTIN_BUTTON_CHANNEL || channel == BUILTIN_LED_CHANNEL {
                continue;
            }
            self.modes[channel] = cmd.modes[channel];
        }
    }

    /// Run one data cycle over the built-in channels
    pub fn service<H>(&self, dio: &mut [bool; BUILTIN_CHANNEL_COUNT], hal: &mut H)
    where
        H: Indicators,
    {
        for channel in 0..BUILTIN_CHANNEL_COUNT {
            match self.modes[channel] {
                BuiltinMode::In => dio[channel] = hal.read_button(channel),
                BuiltinMode::Out => hal.set_led(channel, dio[channel]),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum IoOp {
        Direction(u8, PinDirection),
        Digital(u8, bool),
        Attach(usize),
        Detach(usize),
        PwmWrite(usize, i16),
        Led(usize, bool),
    }

    #[derive(Default)]
    struct MockIo {
        ops: Vec<IoOp, 64>,
        attached: [bool; EXT_CHANNEL_COUNT],
        digital_in: bool,
        analog_in: u16,
        button: bool,
    }

    impl MockIo {
        fn log(&mut self, op: IoOp) {
            self.ops.push(op).ok();
        }
    }

    impl PinIo for MockIo {
        fn set_direction(&mut self, pin: u8, direction: PinDirection) {
            self.log(IoOp::Direction(pin, direction));
        }
        fn set_digital(&mut self, pin: u8, level: bool) {
            self.log(IoOp::Digital(pin, level));
        }
        fn read_digital(&mut self, _pin: u8) -> bool {
            self.digital_in
        }
        fn read_analog(&mut self, _source: u8) -> u16 {
            self.analog_in
        }
    }

    impl PwmBank for MockIo {
        fn attach(&mut self, channel: usize) {
            self.attached[channel] = true;
            self.log(IoOp::Attach(channel));
        }
        fn detach(&mut self, channel: usize) {
            self.attached[channel] = false;
            self.log(IoOp::Detach(channel));
        }
        fn is_attached(&self, channel: usize) -> bool {
            self.attached[channel]
        }
        fn write(&mut self, channel: usize, command: i16) {
            self.log(IoOp::PwmWrite(channel, command));
        }
    }

    impl Indicators for MockIo {
        fn set_led(&mut self, channel: usize, on: bool) {
            self.log(IoOp::Led(channel, on));
        }
        fn read_button(&mut self, _channel: usize) -> bool {
            self.button
        }
    }

    fn bank() -> IoChannelBank {
        IoChannelBank::new(ChannelPinMap::default(), 0)
    }

    #[test]
    fn test_channels_power_on_as_digital_out() {
        let bank = bank();
        for channel in 0..EXT_CHANNEL_COUNT {
            assert_eq!(bank.mode(channel), ChannelMode::DigitalOut);
        }
    }

    #[test]
    fn test_apply_configures_directions() {
        let mut bank = bank();
        let mut hal = MockIo::default();
        let cmd = IoConfigCommand {
            modes: [
                ChannelMode::DigitalOut,
                ChannelMode::DigitalIn,
                ChannelMode::DigitalOut,
                ChannelMode::DigitalOut,
                ChannelMode::DigitalOut,
            ],
        };
        bank.apply(&cmd, &mut hal);
        assert_eq!(bank.mode(1), ChannelMode::DigitalIn);
        assert!(hal
            .ops
            .contains(&IoOp::Direction(4, PinDirection::Input)));
    }

    #[test]
    fn test_analog_in_ignored_without_source() {
        let mut bank = bank();
        let mut hal = MockIo::default();
        let mut cmd = IoConfigCommand {
            modes: [ChannelMode::DigitalOut; EXT_CHANNEL_COUNT],
        };
        // Channel 0 has no analog source; channel 2 does.
        cmd.modes[0] = ChannelMode::AnalogIn;
        cmd.modes[2] = ChannelMode::AnalogIn;
        bank.apply(&cmd, &mut hal);
        assert_eq!(bank.mode(0), ChannelMode::DigitalOut);
        assert_eq!(bank.mode(2), ChannelMode::AnalogIn);
    }

    #[test]
    fn test_pwm_attach_is_idempotent() {
        let mut bank = bank();
        let mut hal = MockIo::default();
        let mut cmd = IoConfigCommand {
            modes: [ChannelMode::DigitalOut; EXT_CHANNEL_COUNT],
        };
        cmd.modes[3] = ChannelMode::Pwm;
        bank.apply(&cmd, &mut hal);
        bank.apply(&cmd, &mut hal);
        let attaches = hal
            .ops
            .iter()
            .filter(|op| **op == IoOp::Attach(3))
            .count();
        assert_eq!(attaches, 1);
    }

    #[test]
    fn test_leaving_pwm_detaches_before_reconfiguring() {
        let mut bank = bank();
        let mut hal = MockIo::default();
        let mut cmd = IoConfigCommand {
            modes: [ChannelMode::DigitalOut; EXT_CHANNEL_COUNT],
        };
        cmd.modes[2] = ChannelMode::Pwm;
        bank.apply(&cmd, &mut hal);

        hal.ops.clear();
        cmd.modes[2] = ChannelMode::DigitalIn;
        bank.apply(&cmd, &mut hal);
        let detach_pos = hal.ops.iter().position(|op| *op == IoOp::Detach(2));
        let dir_pos = hal
            .ops
            .iter()
            .position(|op| *op == IoOp::Direction(20, PinDirection::Input));
        assert!(detach_pos.is_some());
        assert!(detach_pos < dir_pos);
    }

    #[test]
    fn test_analog_in_releases_driven_pin_first() {
        let mut bank = bank();
        let mut hal = MockIo::default();
        let mut cmd = IoConfigCommand {
            modes: [ChannelMode::DigitalOut; EXT_CHANNEL_COUNT],
        };
        cmd.modes[1] = ChannelMode::AnalogIn;
        bank.apply(&cmd, &mut hal);
        let low_pos = hal.ops.iter().position(|op| *op == IoOp::Digital(4, false));
        let dir_pos = hal
            .ops
            .iter()
            .position(|op| *op == IoOp::Direction(4, PinDirection::Input));
        assert!(low_pos.is_some());
        assert!(low_pos < dir_pos);
    }

    #[test]
    fn test_service_moves_data_per_mode() {
        let mut bank = bank();
        let mut hal = MockIo::default();
        hal.digital_in = true;
        hal.analog_in = 321;
        let cmd = IoConfigCommand {
            modes: [
                ChannelMode::DigitalOut,
                ChannelMode::DigitalIn,
                ChannelMode::AnalogIn,
                ChannelMode::Pwm,
                ChannelMode::DigitalOut,
            ],
        };
        bank.apply(&cmd, &mut hal);

        hal.ops.clear();
        let mut ext_io = [1, 0, 0, 250, 0];
        bank.service(&mut ext_io, &mut hal, false);
        assert!(hal.ops.contains(&IoOp::Digital(11, true)));
        assert!(hal.ops.contains(&IoOp::Digital(22, false)));
        assert_eq!(ext_io[1], 1);
        assert_eq!(ext_io[2], 321);
        assert!(hal.ops.contains(&IoOp::PwmWrite(3, 250)));
    }

    #[test]
    fn test_service_substitutes_neutral_while_locked_out() {
        let mut bank = IoChannelBank::new(ChannelPinMap::default(), 0);
        let mut hal = MockIo::default();
        let mut cmd = IoConfigCommand {
            modes: [ChannelMode::DigitalOut; EXT_CHANNEL_COUNT],
        };
        cmd.modes[0] = ChannelMode::Pwm;
        bank.apply(&cmd, &mut hal);

        hal.ops.clear();
        let mut ext_io = [350, 0, 0, 0, 0];
        bank.service(&mut ext_io, &mut hal, true);
        assert!(hal.ops.contains(&IoOp::PwmWrite(0, 0)));
        // The register image keeps the host's command for after release.
        assert_eq!(ext_io[0], 350);
    }

    #[test]
    fn test_builtin_fixed_channels_ignore_requests() {
        let mut bank = BuiltinBank::default();
        let cmd = BuiltinConfigCommand {
            modes: [
                BuiltinMode::Out,
                BuiltinMode::In,
                BuiltinMode::In,
                BuiltinMode::In,
            ],
        };
        bank.apply(&cmd);
        assert_eq!(bank.mode(BUILTIN_BUTTON_CHANNEL), BuiltinMode::In);
        assert_eq!(bank.mode(1), BuiltinMode::In);
        assert_eq!(bank.mode(2), BuiltinMode::In);
        assert_eq!(bank.mode(BUILTIN_LED_CHANNEL), BuiltinMode::Out);
    }

    #[test]
    fn test_builtin_service_reads_button_and_drives_leds() {
        let bank = BuiltinBank::default();
        let mut hal = MockIo::default();
        hal.button = true;
        let mut dio = [false, true, false, true];
        bank.service(&mut dio, &mut hal);
        assert!(dio[0]);
        assert!(hal.ops.contains(&IoOp::Led(1, true)));
        assert!(hal.ops.contains(&IoOp::Led(2, false)));
        assert!(hal.ops.contains(&IoOp::Led(3, true)));
    }
}

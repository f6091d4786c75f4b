//! Board HAL for RP2040-based bridge boards
//!
//! Implements the hardware traits from `diphros_core` over embassy-rp
//! peripherals. Pin and source tokens in the channel pin map are plain
//! indexes into the arrays held here; `main` builds the map and this
//! module to agree.

use embassy_rp::adc::{Adc, Blocking, Channel as AdcChannel};
use embassy_rp::gpio::{Flex, Input, Output};
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use portable_atomic::{AtomicI32, Ordering};

use diphros_core::traits::{
    AlertPattern, AlertSink, DriveMotors, Encoders, Indicators, PinDirection, PinIo, PwmBank,
    VoltageSense,
};
use diphros_protocol::{BUILTIN_CHANNEL_COUNT, EXT_CHANNEL_COUNT};

use crate::channels::{AlertCommand, ALERT_CMD};

/// ADC reference voltage (mV)
const ADC_VREF_MV: u32 = 3300;

/// Full-scale ADC reading
const ADC_MAX: u32 = 4095;

/// Battery sense divider ratio (battery volts per ADC volts)
const BATTERY_DIVIDER: u32 = 3;

/// Servo PWM tick rate after clock division (1 MHz, so 1 count = 1 us)
const SERVO_PWM_DIVIDER: u8 = 125;

/// Servo PWM period in ticks (20 ms frame)
const SERVO_PWM_TOP: u16 = 19_999;

/// Servo pulse width at neutral (us)
const SERVO_NEUTRAL_US: u16 = 1500;

/// Drive motor PWM period in ticks (20 kHz at full clock)
const DRIVE_PWM_TOP: u16 = 6249;

/// Full-scale drive command magnitude
const DRIVE_COMMAND_MAX: i16 = 400;

/// One generic channel's servo output
///
/// The slice stays configured at the 50 Hz servo frame; attach/detach
/// only gates the pulse, so reattaching is glitch-free.
pub struct ServoSlot {
    pwm: Pwm<'static>,
    config: PwmConfig,
    attached: bool,
}

impl ServoSlot {
    /// Wrap a PWM slice already routed to the channel's servo pin
    pub fn new(mut pwm: Pwm<'static>) -> Self {
        let mut config = PwmConfig::default();
        config.divider = SERVO_PWM_DIVIDER.into();
        config.top = SERVO_PWM_TOP;
        config.compare_a = 0;
        pwm.set_config(&config);
        Self {
            pwm,
            config,
            attached: false,
        }
    }

    fn set_pulse_us(&mut self, pulse: u16) {
        self.config.compare_a = pulse;
        self.pwm.set_config(&self.config);
    }
}

/// Differential drive output: one slice carrying both motor PWMs plus a
/// direction pin per motor
pub struct DriveOutputs {
    pwm: Pwm<'static>,
    config: PwmConfig,
    left_dir: Output<'static>,
    right_dir: Output<'static>,
}

impl DriveOutputs {
    /// Wrap a dual-output PWM slice (A = left, B = right) and the two
    /// direction pins
    pub fn new(mut pwm: Pwm<'static>, left_dir: Output<'static>, right_dir: Output<'static>) -> Self {
        let mut config = PwmConfig::default();
        config.top = DRIVE_PWM_TOP;
        config.compare_a = 0;
        config.compare_b = 0;
        pwm.set_config(&config);
        Self {
            pwm,
            config,
            left_dir,
            right_dir,
        }
    }

    fn duty(command: i16) -> u16 {
        let magnitude = command.unsigned_abs().min(DRIVE_COMMAND_MAX as u16) as u32;
        (magnitude * DRIVE_PWM_TOP as u32 / DRIVE_COMMAND_MAX as u32) as u16
    }
}

/// All board peripherals behind the core's hardware traits
pub struct BoardHal {
    ext: [Flex<'static>; EXT_CHANNEL_COUNT],
    servos: [Option<ServoSlot>; EXT_CHANNEL_COUNT],
    adc: Adc<'static, Blocking>,
    analog: [Option<AdcChannel<'static>>; EXT_CHANNEL_COUNT],
    battery: AdcChannel<'static>,
    button: Input<'static>,
    leds: [Option<Output<'static>>; BUILTIN_CHANNEL_COUNT],
    drive: DriveOutputs,
    left_ticks: &'static AtomicI32,
    right_ticks: &'static AtomicI32,
    alert_active: bool,
}

impl BoardHal {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ext: [Flex<'static>; EXT_CHANNEL_COUNT],
        servos: [Option<ServoSlot>; EXT_CHANNEL_COUNT],
        adc: Adc<'static, Blocking>,
        analog: [Option<AdcChannel<'static>>; EXT_CHANNEL_COUNT],
        battery: AdcChannel<'static>,
        button: Input<'static>,
        leds: [Option<Output<'static>>; BUILTIN_CHANNEL_COUNT],
        drive: DriveOutputs,
        left_ticks: &'static AtomicI32,
        right_ticks: &'static AtomicI32,
    ) -> Self {
        Self {
            ext,
            servos,
            adc,
            analog,
            battery,
            button,
            leds,
            drive,
            left_ticks,
            right_ticks,
            alert_active: false,
        }
    }
}

impl PinIo for BoardHal {
    fn set_direction(&mut self, pin: u8, direction: PinDirection) {
        if let Some(flex) = self.ext.get_mut(pin as usize) {
            match direction {
                PinDirection::Input => flex.set_as_input(),
                PinDirection::Output => flex.set_as_output(),
            }
        }
    }

    fn set_digital(&mut self, pin: u8, level: bool) {
        if let Some(flex) = self.ext.get_mut(pin as usize) {
            if level {
                flex.set_high();
            } else {
                flex.set_low();
            }
        }
    }

    fn read_digital(&mut self, pin: u8) -> bool {
        self.ext
            .get_mut(pin as usize)
            .map(|flex| flex.is_high())
            .unwrap_or(false)
    }

    fn read_analog(&mut self, source: u8) -> u16 {
        match self.analog.get_mut(source as usize) {
            Some(Some(channel)) => self.adc.blocking_read(channel).unwrap_or(0),
            _ => 0,
        }
    }
}

impl PwmBank for BoardHal {
    fn attach(&mut self, channel: usize) {
        if let Some(Some(slot)) = self.servos.get_mut(channel) {
            slot.set_pulse_us(SERVO_NEUTRAL_US);
            slot.attached = true;
        }
    }

    fn detach(&mut self, channel: usize) {
        if let Some(Some(slot)) = self.servos.get_mut(channel) {
            // Zero compare suppresses the pulse entirely.
            slot.set_pulse_us(0);
            slot.attached = false;
        }
    }

    fn is_attached(&self, channel: usize) -> bool {
        matches!(self.servos.get(channel), Some(Some(slot)) if slot.attached)
    }

    fn write(&mut self, channel: usize, command: i16) {
        if let Some(Some(slot)) = self.servos.get_mut(channel) {
            if slot.attached {
                let clamped = command.clamp(-DRIVE_COMMAND_MAX, DRIVE_COMMAND_MAX);
                let pulse = (SERVO_NEUTRAL_US as i16 + clamped) as u16;
                slot.set_pulse_us(pulse);
            }
        }
    }
}

impl Indicators for BoardHal {
    fn set_led(&mut self, channel: usize, on: bool) {
        if let Some(Some(led)) = self.leds.get_mut(channel) {
            if on {
                led.set_high();
            } else {
                led.set_low();
            }
        }
    }

    fn read_button(&mut self, _channel: usize) -> bool {
        // Active low with the internal pull-up.
        self.button.is_low()
    }
}

impl DriveMotors for BoardHal {
    fn set_speeds(&mut self, left: i16, right: i16) {
        if left >= 0 {
            self.drive.left_dir.set_low();
        } else {
            self.drive.left_dir.set_high();
        }
        if right >= 0 {
            self.drive.right_dir.set_low();
        } else {
            self.drive.right_dir.set_high();
        }
        self.drive.config.compare_a = DriveOutputs::duty(left);
        self.drive.config.compare_b = DriveOutputs::duty(right);
        let config = self.drive.config.clone();
        self.drive.pwm.set_config(&config);
    }
}

impl Encoders for BoardHal {
    fn read_left(&mut self) -> i32 {
        self.left_ticks.load(Ordering::Relaxed)
    }

    fn read_right(&mut self) -> i32 {
        self.right_ticks.load(Ordering::Relaxed)
    }

    fn reset_left(&mut self) {
        self.left_ticks.store(0, Ordering::Relaxed);
    }

    fn reset_right(&mut self) {
        self.right_ticks.store(0, Ordering::Relaxed);
    }
}

impl VoltageSense for BoardHal {
    fn read_millivolts(&mut self) -> u16 {
        let raw = self.adc.blocking_read(&mut self.battery).unwrap_or(0) as u32;
        (raw * ADC_VREF_MV * BATTERY_DIVIDER / ADC_MAX) as u16
    }
}

impl AlertSink for BoardHal {
    fn start(&mut self, pattern: AlertPattern) {
        ALERT_CMD.signal(AlertCommand::Start(pattern));
        self.alert_active = true;
    }

    fn stop(&mut self) {
        ALERT_CMD.signal(AlertCommand::Stop);
        self.alert_active = false;
    }

    fn is_active(&self) -> bool {
        self.alert_active
    }
}

//! Diphros - robot bridge firmware
//!
//! Main firmware binary for RP2040-based bridge boards sitting between a
//! single-board computer and a small differential-drive robot. The SBC
//! talks to a fixed-layout register bank over I2C; the control loop
//! services the bank at 100 Hz against the board hardware.
//!
//! Named after the Greek "diphros" - the standing platform of a chariot,
//! the part that carries the driver and couples it to the wheels.
//!
//! Board pin budget:
//!
//! - GP0/GP1: I2C0 slave (SDA/SCL) to the SBC
//! - GP2..GP6: generic channels 0..4 (digital)
//! - GP8/GP9, GP10/GP11: left/right quadrature encoders
//! - GP12/GP13: left/right motor direction
//! - GP14/GP15: left/right motor PWM (one slice)
//! - GP16: user button, GP17/GP24/GP25: indicator LEDs
//! - GP18, GP20: servo outputs for generic channels 3 and 4
//! - GP22: buzzer
//! - GP26..GP28: analog sources for channels 1..3, GP29: battery sense

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel as AdcChannel, Config as AdcConfig};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Flex, Input, Level, Output, Pull};
use embassy_rp::i2c_slave::{self, I2cSlave};
use embassy_rp::peripherals::I2C0;
use embassy_rp::pwm::Pwm;
use {defmt_rtt as _, panic_probe as _};

use diphros_core::config::{BridgeConfig, ChannelPinMap};
use diphros_core::traits::AlertPattern;

use crate::channels::{AlertCommand, ALERT_CMD};
use crate::hal::{BoardHal, DriveOutputs, ServoSlot};
use crate::tasks::encoder::{LEFT_TICKS, RIGHT_TICKS};

mod channels;
mod hal;
mod tasks;

bind_interrupts!(struct Irqs {
    I2C0_IRQ => i2c_slave::InterruptHandler<I2C0>;
});

/// I2C slave address the SBC expects
const BUS_ADDRESS: u16 = 0x14;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Diphros firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Register bus to the SBC
    let mut bus_config = i2c_slave::Config::default();
    bus_config.addr = BUS_ADDRESS;
    let bus = I2cSlave::new(p.I2C0, p.PIN_1, p.PIN_0, Irqs, bus_config);

    // Generic channels; pin tokens in the map are indexes into this array
    let ext = [
        Flex::new(p.PIN_2),
        Flex::new(p.PIN_3),
        Flex::new(p.PIN_4),
        Flex::new(p.PIN_5),
        Flex::new(p.PIN_6),
    ];

    // Servo outputs on the two PWM-capable channels
    let servos = [
        None,
        None,
        None,
        Some(ServoSlot::new(Pwm::new_output_a(
            p.PWM_SLICE1,
            p.PIN_18,
            Default::default(),
        ))),
        Some(ServoSlot::new(Pwm::new_output_a(
            p.PWM_SLICE2,
            p.PIN_20,
            Default::default(),
        ))),
    ];

    // Analog sources; source tokens in the map are indexes into this array
    let adc = Adc::new_blocking(p.ADC, AdcConfig::default());
    let analog = [
        None,
        Some(AdcChannel::new_pin(p.PIN_26, Pull::None)),
        Some(AdcChannel::new_pin(p.PIN_27, Pull::None)),
        Some(AdcChannel::new_pin(p.PIN_28, Pull::None)),
        None,
    ];
    let battery = AdcChannel::new_pin(p.PIN_29, Pull::None);

    let button = Input::new(p.PIN_16, Pull::Up);
    let leds = [
        None,
        Some(Output::new(p.PIN_17, Level::Low)),
        Some(Output::new(p.PIN_24, Level::Low)),
        Some(Output::new(p.PIN_25, Level::Low)),
    ];

    let drive = DriveOutputs::new(
        Pwm::new_output_ab(p.PWM_SLICE7, p.PIN_14, p.PIN_15, Default::default()),
        Output::new(p.PIN_12, Level::Low),
        Output::new(p.PIN_13, Level::Low),
    );

    let board = BoardHal::new(
        ext,
        servos,
        adc,
        analog,
        battery,
        button,
        leds,
        drive,
        &LEFT_TICKS,
        &RIGHT_TICKS,
    );

    // The pin map hands out tokens this board resolves as plain indexes.
    let config = BridgeConfig {
        pins: ChannelPinMap {
            dio: [0, 1, 2, 3, 4],
            analog: [None, Some(1), Some(2), Some(3), None],
        },
        ..Default::default()
    };

    let buzzer = Pwm::new_output_a(p.PWM_SLICE3, p.PIN_22, Default::default());

    spawner.must_spawn(tasks::bus::bus_task(bus));
    spawner.must_spawn(tasks::buzzer::buzzer_task(buzzer));
    spawner.must_spawn(tasks::encoder::encoder_task(
        Input::new(p.PIN_8, Pull::Up),
        Input::new(p.PIN_9, Pull::Up),
        &LEFT_TICKS,
    ));
    spawner.must_spawn(tasks::encoder::encoder_task(
        Input::new(p.PIN_10, Pull::Up),
        Input::new(p.PIN_11, Pull::Up),
        &RIGHT_TICKS,
    ));
    spawner.must_spawn(tasks::control::control_task(board, config));

    ALERT_CMD.signal(AlertCommand::Start(AlertPattern::Startup));
    info!("Bridge ready at bus address {:#x}", BUS_ADDRESS);
}

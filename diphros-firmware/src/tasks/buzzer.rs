//! Buzzer task
//!
//! Plays alert patterns on a PWM-driven piezo. Patterns are requested by
//! the control loop through [`ALERT_CMD`]; the repeating low-voltage
//! pattern keeps playing until a new command arrives.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_time::Timer;

use diphros_core::traits::AlertPattern;

use crate::channels::{AlertCommand, ALERT_CMD};

/// PWM tick rate after clock division (1 MHz)
const TONE_PWM_DIVIDER: u8 = 125;

/// PWM period in ticks (2 kHz tone)
const TONE_PWM_TOP: u16 = 499;

/// Startup chirp on-time (ms)
const CHIRP_MS: u64 = 100;

/// Low-voltage beep cadence (ms)
const WARN_ON_MS: u64 = 200;
const WARN_OFF_MS: u64 = 800;

/// Buzzer task - plays alert patterns until told otherwise
#[embassy_executor::task]
pub async fn buzzer_task(mut pwm: Pwm<'static>) {
    info!("Buzzer task started");

    let mut config = PwmConfig::default();
    config.divider = TONE_PWM_DIVIDER.into();
    config.top = TONE_PWM_TOP;
    config.compare_a = 0;
    pwm.set_config(&config);

    let mut pending: Option<AlertCommand> = None;
    loop {
        let command = match pending.take() {
            Some(command) => command,
            None => ALERT_CMD.wait().await,
        };

        match command {
            AlertCommand::Stop => {
                set_tone(&mut pwm, &mut config, false);
            }
            AlertCommand::Start(AlertPattern::Startup) => {
                // Two short chirps, then silence.
                for _ in 0..2 {
                    set_tone(&mut pwm, &mut config, true);
                    Timer::after_millis(CHIRP_MS).await;
                    set_tone(&mut pwm, &mut config, false);
                    Timer::after_millis(CHIRP_MS).await;
                }
            }
            AlertCommand::Start(AlertPattern::LowVoltage) => {
                pending = play_warning(&mut pwm, &mut config).await;
            }
        }
    }
}

/// Repeat the low-voltage beep until a new command interrupts it
async fn play_warning(pwm: &mut Pwm<'static>, config: &mut PwmConfig) -> Option<AlertCommand> {
    loop {
        set_tone(pwm, config, true);
        if let Either::Second(command) =
            select(Timer::after_millis(WARN_ON_MS), ALERT_CMD.wait()).await
        {
            set_tone(pwm, config, false);
            return Some(command);
        }
        set_tone(pwm, config, false);
        if let Either::Second(command) =
            select(Timer::after_millis(WARN_OFF_MS), ALERT_CMD.wait()).await
        {
            return Some(command);
        }
    }
}

fn set_tone(pwm: &mut Pwm<'static>, config: &mut PwmConfig, on: bool) {
    config.compare_a = if on { TONE_PWM_TOP / 2 } else { 0 };
    pwm.set_config(config);
}

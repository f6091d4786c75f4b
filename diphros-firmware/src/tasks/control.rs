//! Control loop task
//!
//! Runs the bridge controller at a fixed rate against the shared
//! register bank. The whole cycle executes under the bank lock so the
//! bus task never observes a half-serviced bank.

use defmt::*;
use embassy_time::{Instant, Ticker};

use diphros_core::config::BridgeConfig;
use diphros_core::controller::BridgeController;

use crate::channels::REGISTERS;
use crate::hal::BoardHal;

/// Control cycle period (100 Hz)
const CONTROL_PERIOD_MS: u64 = 10;

/// Control task - one bridge cycle per tick
#[embassy_executor::task]
pub async fn control_task(mut hal: BoardHal, config: BridgeConfig) {
    info!("Control task started");

    let mut controller = BridgeController::new(config);
    let mut ticker = Ticker::every(embassy_time::Duration::from_millis(CONTROL_PERIOD_MS));

    loop {
        ticker.next().await;
        let now_ms = Instant::now().as_millis() as u32;
        REGISTERS.lock(|regs| {
            controller.run_cycle(&mut regs.borrow_mut(), &mut hal, now_ms);
        });
    }
}

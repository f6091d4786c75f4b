//! Quadrature encoder tasks
//!
//! One task per wheel, decoding A/B edges into a signed tick counter.
//! The counters are atomics so the control loop reads and resets them
//! without any locking.

use embassy_futures::select::select;
use embassy_rp::gpio::Input;
use portable_atomic::{AtomicI32, Ordering};

/// Left wheel tick counter
pub static LEFT_TICKS: AtomicI32 = AtomicI32::new(0);

/// Right wheel tick counter
pub static RIGHT_TICKS: AtomicI32 = AtomicI32::new(0);

/// Tick delta indexed by (previous state << 2) | current state, with a
/// state being (A << 1) | B. Illegal double transitions count as 0.
const QUAD_DELTA: [i8; 16] = [0, 1, -1, 0, -1, 0, 0, 1, 1, 0, 0, -1, 0, -1, 1, 0];

fn read_state(a: &Input<'static>, b: &Input<'static>) -> u8 {
    ((a.is_high() as u8) << 1) | b.is_high() as u8
}

/// Encoder task - counts quadrature transitions on one wheel
#[embassy_executor::task(pool_size = 2)]
pub async fn encoder_task(mut a: Input<'static>, mut b: Input<'static>, ticks: &'static AtomicI32) {
    let mut previous = read_state(&a, &b);
    loop {
        select(a.wait_for_any_edge(), b.wait_for_any_edge()).await;
        let state = read_state(&a, &b);
        let delta = QUAD_DELTA[((previous << 2) | state) as usize];
        if delta != 0 {
            ticks.fetch_add(delta as i32, Ordering::Relaxed);
        }
        previous = state;
    }
}

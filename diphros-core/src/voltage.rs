//! Low-voltage lockout monitor
//!
//! A four-state hysteresis filter over instantaneous battery readings.
//! Momentary sag (a stall spike, a servo transient) must not drop motor
//! output, and a momentary recovery must not restore it; both directions
//! require a full run of consecutive qualifying samples to commit.
//!
//! ```text
//!            low            count >= debounce
//!  Normal ────────► NormalToLow ────────► Low
//!    ▲   ◄──────────┘ normal              │  normal
//!    │                                    ▼
//!    └──────── LowToNormal ◄──────────────┘
//!     count >=      │ low (abort, back to Low)
//!     debounce      ▼
//! ```
//!
//! Lockout holds through the entire recovery count: it releases only on
//! the commit into `Normal`, never while still counting.

use crate::config::LowVoltageConfig;

/// Monitor state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LowVoltageState {
    /// Supply healthy, output enabled
    Normal,
    /// Counting consecutive low samples toward lockout
    NormalToLow,
    /// Locked out
    Low,
    /// Locked out, counting consecutive normal samples toward release
    LowToNormal,
}

/// Emitted when `is_locked_out()` changes, so a caller can start or stop
/// an alert without re-triggering it every cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LockoutEdge {
    /// Lockout just engaged
    Engaged,
    /// Lockout just released
    Released,
}

/// Debounced low-voltage lockout filter
///
/// Feed one sample per control cycle; `debounce_cycles` is therefore a
/// time window in cycle units.
#[derive(Debug, Clone)]
pub struct LowVoltageMonitor {
    state: LowVoltageState,
    /// Consecutive qualifying samples seen, including the one that
    /// entered the pending state
    count: u32,
    config: LowVoltageConfig,
}

impl Default for LowVoltageMonitor {
    fn default() -> Self {
        Self::new(LowVoltageConfig::default())
    }
}

impl LowVoltageMonitor {
    /// Create a monitor in `Normal` with the given parameters
    pub fn new(config: LowVoltageConfig) -> Self {
        Self {
            state: LowVoltageState::Normal,
            count: 0,
            config,
        }
    }

    /// Current filter state
    pub fn state(&self) -> LowVoltageState {
        self.state
    }

    /// Whether actuator output is suppressed
    ///
    /// True in `Low` and `LowToNormal`: engaging requires the full
    /// debounce run, and release is withheld until recovery commits.
    pub fn is_locked_out(&self) -> bool {
        matches!(
            self.state,
            LowVoltageState::Low | LowVoltageState::LowToNormal
        )
    }

    /// Feed one voltage sample
    ///
    /// Returns a [`LockoutEdge`] exactly when the lockout signal flips.
    pub fn update(&mut self, sample_mv: u16) -> Option<LockoutEdge> {
        let was_locked_out = self.is_locked_out();
        let low = sample_mv < self.config.threshold_mv;

        self.state = match (self.state, low) {
            (LowVoltageState::Normal, true) => {
                self.count = 1;
                self.pending_or(LowVoltageState::NormalToLow, LowVoltageState::Low)
            }
            (LowVoltageState::Normal, false) => LowVoltageState::Normal,

            (LowVoltageState::NormalToLow, true) => {
                self.count += 1;
                self.pending_or(LowVoltageState::NormalToLow, LowVoltageState::Low)
            }
            // A single reversal cancels the pending lockout.
            (LowVoltageState::NormalToLow, false) => {
                self.count = 0;
                LowVoltageState::Normal
            }

            (LowVoltageState::Low, false) => {
                self.count = 1;
                self.pending_or(LowVoltageState::LowToNormal, LowVoltageState::Normal)
            }
            (LowVoltageState::Low, true) => LowVoltageState::Low,

            (LowVoltageState::LowToNormal, false) => {
                self.count += 1;
                self.pending_or(LowVoltageState::LowToNormal, LowVoltageState::Normal)
            }
            // A single low sample aborts the recovery.
            (LowVoltageState::LowToNormal, true) => {
                self.count = 0;
                LowVoltageState::Low
            }
        };

        match (was_locked_out, self.is_locked_out()) {
            (false, true) => Some(LockoutEdge::Engaged),
            (true, false) => Some(LockoutEdge::Released),
            _ => None,
        }
    }

    /// Stay in `pending` until the count commits, then move to `committed`
    fn pending_or(
        &mut self,
        pending: LowVoltageState,
        committed: LowVoltageState,
    ) -> LowVoltageState {
        if self.count >= self.config.debounce_cycles {
            self.count = 0;
            committed
        } else {
            pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOW: u16 = 5000;
    const OK: u16 = 6000;

    fn monitor(debounce_cycles: u32) -> LowVoltageMonitor {
        LowVoltageMonitor::new(LowVoltageConfig {
            threshold_mv: 5550,
            debounce_cycles,
        })
    }

    #[test]
    fn test_stays_normal_on_healthy_supply() {
        let mut mon = monitor(3);
        for _ in 0..100 {
            assert_eq!(mon.update(OK), None);
        }
        assert_eq!(mon.state(), LowVoltageState::Normal);
        assert!(!mon.is_locked_out());
    }

    #[test]
    fn test_lockout_engages_on_nth_low_sample() {
        let mut mon = monitor(3);
        assert_eq!(mon.update(LOW), None);
        assert_eq!(mon.state(), LowVoltageState::NormalToLow);
        assert_eq!(mon.update(LOW), None);
        assert!(!mon.is_locked_out());

        // Third consecutive low sample commits.
        assert_eq!(mon.update(LOW), Some(LockoutEdge::Engaged));
        assert_eq!(mon.state(), LowVoltageState::Low);
        assert!(mon.is_locked_out());
    }

    #[test]
    fn test_single_reversal_cancels_pending_lockout() {
        let mut mon = monitor(3);
        mon.update(LOW);
        mon.update(LOW);
        assert_eq!(mon.update(OK), None);
        assert_eq!(mon.state(), LowVoltageState::Normal);

        // The count restarts from scratch afterwards.
        mon.update(LOW);
        mon.update(LOW);
        assert!(!mon.is_locked_out());
        assert_eq!(mon.update(LOW), Some(LockoutEdge::Engaged));
    }

    #[test]
    fn test_release_requires_full_recovery_run() {
        let mut mon = monitor(3);
        for _ in 0..3 {
            mon.update(LOW);
        }
        assert!(mon.is_locked_out());

        // Still locked out while counting recovery.
        assert_eq!(mon.update(OK), None);
        assert_eq!(mon.state(), LowVoltageState::LowToNormal);
        assert!(mon.is_locked_out());
        assert_eq!(mon.update(OK), None);
        assert!(mon.is_locked_out());

        assert_eq!(mon.update(OK), Some(LockoutEdge::Released));
        assert_eq!(mon.state(), LowVoltageState::Normal);
        assert!(!mon.is_locked_out());
    }

    #[test]
    fn test_single_low_sample_aborts_recovery() {
        let mut mon = monitor(3);
        for _ in 0..3 {
            mon.update(LOW);
        }
        mon.update(OK);
        mon.update(OK);

        // One low reading during recovery falls back to Low, no edge.
        assert_eq!(mon.update(LOW), None);
        assert_eq!(mon.state(), LowVoltageState::Low);
        assert!(mon.is_locked_out());
    }

    #[test]
    fn test_reference_scenario_499_samples_never_engage() {
        let mut mon = LowVoltageMonitor::default();
        for _ in 0..499 {
            assert_eq!(mon.update(5000), None);
            assert!(!mon.is_locked_out());
        }
        assert_eq!(mon.update(6000), None);
        assert_eq!(mon.state(), LowVoltageState::Normal);
    }

    #[test]
    fn test_reference_scenario_500th_sample_engages() {
        let mut mon = LowVoltageMonitor::default();
        for _ in 0..499 {
            mon.update(5000);
        }
        assert_eq!(mon.update(5000), Some(LockoutEdge::Engaged));
        assert!(mon.is_locked_out());
    }

    #[test]
    fn test_edge_fires_once_per_transition() {
        let mut mon = monitor(2);
        mon.update(LOW);
        assert_eq!(mon.update(LOW), Some(LockoutEdge::Engaged));

        // Further low samples while locked out produce no edges.
        for _ in 0..50 {
            assert_eq!(mon.update(LOW), None);
        }

        mon.update(OK);
        assert_eq!(mon.update(OK), Some(LockoutEdge::Released));
        assert_eq!(mon.update(OK), None);
    }

    #[test]
    fn test_threshold_is_strictly_below() {
        let mut mon = monitor(1);
        // A reading exactly at the threshold is not low.
        assert_eq!(mon.update(5550), None);
        assert_eq!(mon.state(), LowVoltageState::Normal);
        assert_eq!(mon.update(5549), Some(LockoutEdge::Engaged));
    }
}

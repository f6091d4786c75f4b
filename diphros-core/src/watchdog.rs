//! Heartbeat staleness watchdog
//!
//! The host proves liveness by setting the heartbeat register; the
//! watchdog timestamps each observation and reports staleness once the
//! timeout has elapsed without one. Before the first heartbeat ever
//! arrives the link counts as stale, so drive output stays safe from
//! power-on until a host actually connects.

use crate::config::HEARTBEAT_TIMEOUT_MS;

/// Tracks time since the last host heartbeat
#[derive(Debug, Clone)]
pub struct HeartbeatWatchdog {
    timeout_ms: u32,
    /// Millisecond timestamp of the last heartbeat, once one has arrived
    last_seen_ms: Option<u32>,
}

impl Default for HeartbeatWatchdog {
    fn default() -> Self {
        Self::new(HEARTBEAT_TIMEOUT_MS)
    }
}

impl HeartbeatWatchdog {
    /// Create a watchdog that trips after `timeout_ms` without a heartbeat
    pub fn new(timeout_ms: u32) -> Self {
        Self {
            timeout_ms,
            last_seen_ms: None,
        }
    }

    /// Process the heartbeat flag for one cycle
    ///
    /// Returns true when the flag was set, telling the caller to clear
    /// the register back to zero.
    pub fn observe(&mut self, flag: bool, now_ms: u32) -> bool {
        if flag {
            self.last_seen_ms = Some(now_ms);
        }
        flag
    }

    /// Whether the link is stale at `now_ms`
    ///
    /// Timestamps use wrapping millisecond arithmetic, so the check stays
    /// correct across u32 rollover (~49.7 days).
    pub fn is_stale(&self, now_ms: u32) -> bool {
        match self.last_seen_ms {
            Some(last) => now_ms.wrapping_sub(last) > self.timeout_ms,
            None => true,
        }
    }
}

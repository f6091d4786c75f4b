//! Audible/visual alert indicator trait

/// Alert patterns the indicator can play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertPattern {
    /// Short power-on chirp
    Startup,
    /// Repeating low-voltage warning
    LowVoltage,
}

/// Trait for the alert indicator (buzzer or lamp)
///
/// The controller drives this only on lockout edges, so a pattern keeps
/// playing without being re-triggered every cycle.
pub trait AlertSink {
    /// Start playing a pattern, replacing any active one
    fn start(&mut self, pattern: AlertPattern);

    /// Stop the active pattern, if any
    fn stop(&mut self);

    /// Check whether a pattern is currently playing
    fn is_active(&self) -> bool;
}

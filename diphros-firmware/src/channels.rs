//! Inter-task communication and shared state
//!
//! The register bank is the single piece of state shared between the bus
//! task and the control loop. It sits behind a blocking critical-section
//! mutex: both sides take the lock only for short byte-copy or one-cycle
//! windows, never across an await point.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;

use diphros_core::traits::AlertPattern;
use diphros_protocol::RegisterBank;

/// The bus-visible register bank, shared by the bus and control tasks
pub static REGISTERS: Mutex<CriticalSectionRawMutex, RefCell<RegisterBank>> =
    Mutex::new(RefCell::new(RegisterBank::new()));

/// Command for the buzzer task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertCommand {
    /// Start playing a pattern, replacing any active one
    Start(AlertPattern),
    /// Stop the active pattern
    Stop,
}

/// Buzzer pattern requests from the control loop
pub static ALERT_CMD: Signal<CriticalSectionRawMutex, AlertCommand> = Signal::new();

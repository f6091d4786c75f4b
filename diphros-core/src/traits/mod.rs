//! Hardware abstraction traits
//!
//! These traits define the interface between the control core and
//! hardware-specific implementations. Each collaborator gets a small
//! trait of its own; [`Bridge`] bundles them so the controller can take a
//! single HAL parameter.

pub mod alert;
pub mod drive;
pub mod io;
pub mod sensor;

pub use alert::{AlertPattern, AlertSink};
pub use drive::{DriveMotors, Encoders};
pub use io::{Indicators, PinDirection, PinIo, PwmBank};
pub use sensor::VoltageSense;

/// The full set of collaborators the per-cycle controller drives
///
/// Blanket-implemented for anything providing all of the component
/// traits; board HALs implement the components, never this directly.
pub trait Bridge:
    PinIo + PwmBank + Indicators + DriveMotors + Encoders + VoltageSense + AlertSink
{
}

impl<T> Bridge for T where
    T: PinIo + PwmBank + Indicators + DriveMotors + Encoders + VoltageSense + AlertSink
{
}

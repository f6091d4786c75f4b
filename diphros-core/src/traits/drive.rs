//! Drive motor and encoder traits

/// Trait for the differential drive actuator
pub trait DriveMotors {
    /// Command both drive motors
    ///
    /// Commands are in drive units (-400..400); out-of-range values are
    /// clamped by the implementation, not by callers.
    fn set_speeds(&mut self, left: i16, right: i16);
}

/// Trait for the quadrature encoder pair
pub trait Encoders {
    /// Cumulative left tick count since power-on or last reset
    fn read_left(&mut self) -> i32;

    /// Cumulative right tick count since power-on or last reset
    fn read_right(&mut self) -> i32;

    /// Zero the left tick count
    fn reset_left(&mut self);

    /// Zero the right tick count
    fn reset_right(&mut self);
}

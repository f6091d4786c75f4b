//! Supply voltage sensing trait

/// Trait for the battery voltage sensor
pub trait VoltageSense {
    /// Read the instantaneous supply voltage in millivolts
    ///
    /// The reading is raw and noisy; debouncing is the low-voltage
    /// monitor's job.
    fn read_millivolts(&mut self) -> u16;
}

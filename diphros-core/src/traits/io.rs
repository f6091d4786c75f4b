//! Pin, PWM and built-in indicator traits

/// Direction of a digital pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinDirection {
    /// High-impedance input; pull policy is the board HAL's choice and
    /// must be consistent per deployment
    Input,
    /// Push-pull output
    Output,
}

/// Trait for raw digital/analog pin access
///
/// Pin numbers are board tokens from the channel pin map; the core never
/// interprets them.
pub trait PinIo {
    /// Configure a pin's direction
    fn set_direction(&mut self, pin: u8, direction: PinDirection);

    /// Drive an output pin high or low
    fn set_digital(&mut self, pin: u8, level: bool);

    /// Sample a digital input pin
    ///
    /// Takes `&mut self` because sampling typically touches peripheral
    /// registers.
    fn read_digital(&mut self, pin: u8) -> bool;

    /// Sample an analog source
    fn read_analog(&mut self, source: u8) -> u16;
}

/// Trait for the PWM actuator bank behind the generic channels
///
/// Commands are in drive units (-400..400); the implementation maps them
/// to whatever duty/pulse range the actuator expects.
pub trait PwmBank {
    /// Attach the PWM driver to a channel
    ///
    /// Attaching an already-attached channel is a no-op.
    fn attach(&mut self, channel: usize);

    /// Detach the PWM driver from a channel, releasing the pin
    fn detach(&mut self, channel: usize);

    /// Check whether the driver is attached to a channel
    fn is_attached(&self, channel: usize) -> bool;

    /// Write a command to an attached channel
    fn write(&mut self, channel: usize, command: i16);
}

/// Trait for the built-in indicator LEDs and buttons
///
/// Built-in channels are not raw pins: each maps to a dedicated LED, a
/// dedicated button, or both, indexed by built-in channel number.
pub trait Indicators {
    /// Drive a built-in channel's indicator LED
    fn set_led(&mut self, channel: usize, on: bool);

    /// Read a built-in channel's button (true = pressed)
    fn read_button(&mut self, channel: usize) -> bool;
}

//! Embassy tasks

pub mod bus;
pub mod buzzer;
pub mod control;
pub mod encoder;

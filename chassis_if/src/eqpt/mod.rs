//! # Equipment Interface
//!
//! This module defines the traits the chassis uses to talk to its equipment. The device drivers
//! themselves (motor controllers, gyros, absolute encoders) live outside the chassis core and only
//! need to implement these traits.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod encoder;
pub mod gyro;
pub mod motor;

// -----------------------------------------------------------------------------------------------
// EXPORTS
// -----------------------------------------------------------------------------------------------

pub use encoder::AbsoluteEncoder;
pub use gyro::Gyro;
pub use motor::MotorController;

// -----------------------------------------------------------------------------------------------
// ENUMS
// -----------------------------------------------------------------------------------------------

/// A fault reported by a sensor read.
///
/// Sensor faults are recoverable: the consumer keeps its last good value, counts the fault and
/// carries on with the next cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SensorError {
    #[error("The sensor has not produced a new sample since the last read")]
    Stale,

    #[error("The sensor is not responding")]
    NotResponding,

    #[error("The sensor returned a value outside of its valid range")]
    OutOfRange,
}

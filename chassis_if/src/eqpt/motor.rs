//! # Motor controller interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use super::SensorError;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A closed-loop motor controller.
///
/// All quantities are expressed at the motor's output shaft, before any gearing between the motor
/// and the mechanism. Conversions through gear ratios and wheel diameters are the responsibility
/// of the mechanism that owns the motor.
pub trait MotorController {
    /// Demand a velocity from the motor.
    ///
    /// Units: rotations/second
    fn set_velocity_target(&mut self, rps: f64);

    /// Demand a position from the motor.
    ///
    /// Units: rotations
    fn set_position_target(&mut self, rotations: f64);

    /// Number of rotations the motor has turned since its sensor was last set.
    ///
    /// Units: rotations
    fn rotations(&self) -> Result<f64, SensorError>;

    /// Current velocity of the motor.
    ///
    /// Units: rotations/second
    fn rps(&self) -> Result<f64, SensorError>;

    /// Overwrite the motor's integrated sensor position.
    ///
    /// Units: rotations
    fn set_rotations(&mut self, rotations: f64);
}

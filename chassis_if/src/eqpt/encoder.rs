//! # Absolute encoder interface

use super::SensorError;

/// An absolute angle sensor, such as the magnetic encoder on a swerve module's steering axis.
pub trait AbsoluteEncoder {
    /// Absolute angle of the sensor, in the range [0, 360).
    ///
    /// Units: degrees
    fn abs_angle_deg(&self) -> Result<f64, SensorError>;
}

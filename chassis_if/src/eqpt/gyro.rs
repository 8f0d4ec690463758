//! # Gyroscope interface

use super::SensorError;

/// A yaw gyroscope mounted at the centre of the robot.
pub trait Gyro {
    /// Current yaw of the robot, anticlockwise positive.
    ///
    /// Units: degrees
    fn yaw_deg(&self) -> Result<f64, SensorError>;

    /// Re-zero the gyro so that the current physical orientation reads as `offset_deg`.
    fn re_zero(&mut self, offset_deg: f64);
}

//! Chassis geometry

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use super::{ChassisError, NUM_MODULES};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Physical dimensions and capabilities of the chassis.
///
/// Shared by the kinematics, the pose estimator and the chassis so that all three use exactly
/// the same wheel positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChassisGeometry {
    /// Units: meters
    pub wheel_diameter_m: f64,

    /// Distance between the front and back wheel axes.
    ///
    /// Units: meters
    pub wheel_base_m: f64,

    /// Distance between the left and right wheel axes.
    ///
    /// Units: meters
    pub track_m: f64,

    /// Maximum speed of any wheel.
    ///
    /// Units: meters/second
    pub max_speed_ms: f64,

    /// Units: radians/second
    pub max_angular_speed_rads: f64,

    /// Units: meters/second^2
    pub max_accel_mss: f64,

    /// Units: radians/second^2
    pub max_angular_accel_radss: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ChassisGeometry {
    /// Check that every dimension and limit is finite and strictly positive.
    pub fn validate(&self) -> Result<(), ChassisError> {
        let fields = [
            ("wheel_diameter_m", self.wheel_diameter_m),
            ("wheel_base_m", self.wheel_base_m),
            ("track_m", self.track_m),
            ("max_speed_ms", self.max_speed_ms),
            ("max_angular_speed_rads", self.max_angular_speed_rads),
            ("max_accel_mss", self.max_accel_mss),
            ("max_angular_accel_radss", self.max_angular_accel_radss),
        ];

        for (name, value) in fields.iter() {
            if !value.is_finite() || *value <= 0.0 {
                return Err(ChassisError::InvalidGeometry(*name, *value));
            }
        }

        Ok(())
    }

    /// Position of each wheel's contact point relative to the chassis centre, in the body frame.
    ///
    /// Units: meters
    pub fn module_offsets_m(&self) -> [Vector2<f64>; NUM_MODULES] {
        let half_base = self.wheel_base_m / 2.0;
        let half_track = self.track_m / 2.0;

        [
            Vector2::new(half_base, half_track),
            Vector2::new(half_base, -half_track),
            Vector2::new(-half_base, half_track),
            Vector2::new(-half_base, -half_track),
        ]
    }

    /// Circumference of the wheels.
    ///
    /// Units: meters
    pub fn wheel_circumference_m(&self) -> f64 {
        std::f64::consts::PI * self.wheel_diameter_m
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    /// A 0.5 m square chassis used throughout the tests.
    pub(crate) fn test_geometry() -> ChassisGeometry {
        ChassisGeometry {
            wheel_diameter_m: 0.1,
            wheel_base_m: 0.5,
            track_m: 0.5,
            max_speed_ms: 4.0,
            max_angular_speed_rads: 6.0,
            max_accel_mss: 3.0,
            max_angular_accel_radss: 10.0,
        }
    }

    #[test]
    fn test_validate() {
        assert!(test_geometry().validate().is_ok());

        let mut g = test_geometry();
        g.track_m = 0.0;
        assert!(matches!(
            g.validate(),
            Err(ChassisError::InvalidGeometry("track_m", _))
        ));

        let mut g = test_geometry();
        g.max_speed_ms = std::f64::NAN;
        assert!(matches!(
            g.validate(),
            Err(ChassisError::InvalidGeometry("max_speed_ms", _))
        ));
    }

    #[test]
    fn test_offsets() {
        let o = test_geometry().module_offsets_m();
        assert_eq!(o[0], Vector2::new(0.25, 0.25));
        assert_eq!(o[1], Vector2::new(0.25, -0.25));
        assert_eq!(o[2], Vector2::new(-0.25, 0.25));
        assert_eq!(o[3], Vector2::new(-0.25, -0.25));
    }
}

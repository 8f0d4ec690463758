//! # Localisation module
//!
//! This module provides localisation for the chassis: the [`Pose2D`] type and the
//! [`PoseEstimator`] which fuses wheel odometry with the gyro.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod estimator;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use util::maths::wrap_deg;

pub use estimator::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The pose (position and heading in the field frame) of the chassis.
///
/// The field frame is fixed, X forwards from the driver station, Y to the left and heading
/// anticlockwise from the X axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    /// Units: meters
    pub x_m: f64,

    /// Units: meters
    pub y_m: f64,

    /// Heading, always in [-180, 180).
    ///
    /// Units: degrees
    pub heading_deg: f64,
}

/// A small motion expressed in the body frame of the chassis at the start of the motion.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Twist2D {
    /// Units: meters
    pub dx_m: f64,

    /// Units: meters
    pub dy_m: f64,

    /// Units: radians
    pub dtheta_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose2D {
    /// Create a new pose, normalising the heading.
    pub fn new(x_m: f64, y_m: f64, heading_deg: f64) -> Self {
        Self {
            x_m,
            y_m,
            heading_deg: wrap_deg(heading_deg),
        }
    }

    pub fn position_m(&self) -> Point2<f64> {
        Point2::new(self.x_m, self.y_m)
    }

    pub fn heading_rad(&self) -> f64 {
        self.heading_deg.to_radians()
    }

    /// Unit vector pointing along the chassis' forward axis, in the field frame.
    pub fn forward(&self) -> Vector2<f64> {
        let h = self.heading_rad();
        Vector2::new(h.cos(), h.sin())
    }

    /// Apply a body frame twist to this pose using the exponential map, so that motion along an
    /// arc is integrated exactly.
    pub fn exp(&self, twist: &Twist2D) -> Self {
        let dtheta = twist.dtheta_rad;

        // sin(t)/t and (1 - cos(t))/t, with their series expansions near zero
        let (s, c) = if dtheta.abs() < 1e-9 {
            (1.0 - dtheta * dtheta / 6.0, 0.5 * dtheta)
        } else {
            (dtheta.sin() / dtheta, (1.0 - dtheta.cos()) / dtheta)
        };

        let tx = twist.dx_m * s - twist.dy_m * c;
        let ty = twist.dx_m * c + twist.dy_m * s;

        let (sin_h, cos_h) = self.heading_rad().sin_cos();

        Self::new(
            self.x_m + tx * cos_h - ty * sin_h,
            self.y_m + tx * sin_h + ty * cos_h,
            self.heading_deg + dtheta.to_degrees(),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_pose_exp() {
        // Straight along the body X axis while facing field Y
        let pose = Pose2D::new(1.0, 1.0, 90.0);
        let next = pose.exp(&Twist2D {
            dx_m: 2.0,
            dy_m: 0.0,
            dtheta_rad: 0.0,
        });
        assert_relative_eq!(next.x_m, 1.0, epsilon = 1e-12);
        assert_relative_eq!(next.y_m, 3.0, epsilon = 1e-12);
        assert_relative_eq!(next.heading_deg, 90.0, epsilon = 1e-12);

        // Quarter circle of radius 1 to the left
        let next = Pose2D::default().exp(&Twist2D {
            dx_m: PI / 2.0,
            dy_m: 0.0,
            dtheta_rad: PI / 2.0,
        });
        assert_relative_eq!(next.x_m, 1.0, epsilon = 1e-12);
        assert_relative_eq!(next.y_m, 1.0, epsilon = 1e-12);
        assert_relative_eq!(next.heading_deg, 90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_pose_heading_normalised() {
        assert_eq!(Pose2D::new(0.0, 0.0, 190.0).heading_deg, -170.0);
        assert_eq!(Pose2D::new(0.0, 0.0, -180.0).heading_deg, -180.0);
    }
}

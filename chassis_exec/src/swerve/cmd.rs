//! Motion commands for the swerve chassis

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// Internal
use super::Trajectory;
use chassis_if::tc::{ControllerKind, StopBehaviour};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Velocity of the chassis.
///
/// Depending on where it's used the linear components are either in the body frame or the field
/// frame; the angular component is the same in both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChassisSpeeds {
    /// Units: meters/second
    pub vx_ms: f64,

    /// Units: meters/second
    pub vy_ms: f64,

    /// Anticlockwise positive.
    ///
    /// Units: radians/second
    pub omega_rads: f64,
}

/// Everything a drive mode state needs to know about how the chassis should move.
///
/// Built fresh each cycle by whatever is driving the chassis.
#[derive(Debug, Clone, Default)]
pub struct MotionIntent {
    pub chassis_speeds: ChassisSpeeds,

    /// Trajectory to follow in trajectory following mode.
    pub trajectory: Option<Arc<Trajectory>>,

    /// A point of interest on the field.
    ///
    /// Units: meters
    pub target_point: Option<Point2<f64>>,

    pub stop_behaviour: StopBehaviour,

    pub controller_kind: ControllerKind,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ChassisSpeeds {
    pub fn new(vx_ms: f64, vy_ms: f64, omega_rads: f64) -> Self {
        Self {
            vx_ms,
            vy_ms,
            omega_rads,
        }
    }

    /// Convert field frame speeds into the body frame of a chassis with the given heading.
    pub fn from_field_relative(field: &ChassisSpeeds, heading_deg: f64) -> Self {
        let (sin_h, cos_h) = heading_deg.to_radians().sin_cos();

        Self {
            vx_ms: field.vx_ms * cos_h + field.vy_ms * sin_h,
            vy_ms: -field.vx_ms * sin_h + field.vy_ms * cos_h,
            omega_rads: field.omega_rads,
        }
    }
}

impl MotionIntent {
    /// An intent to move at the given speeds, with default stop behaviour and controller.
    pub fn from_speeds(chassis_speeds: ChassisSpeeds) -> Self {
        Self {
            chassis_speeds,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_field_relative() {
        // Field Y is the body's forwards when facing 90 degrees
        let body = ChassisSpeeds::from_field_relative(&ChassisSpeeds::new(0.0, 1.0, 0.5), 90.0);
        assert_relative_eq!(body.vx_ms, 1.0, epsilon = 1e-12);
        assert_relative_eq!(body.vy_ms, 0.0, epsilon = 1e-12);
        assert_eq!(body.omega_rads, 0.5);

        // Facing backwards inverts both linear components
        let body = ChassisSpeeds::from_field_relative(&ChassisSpeeds::new(1.0, 2.0, 0.0), -180.0);
        assert_relative_eq!(body.vx_ms, -1.0, epsilon = 1e-12);
        assert_relative_eq!(body.vy_ms, -2.0, epsilon = 1e-12);
    }
}

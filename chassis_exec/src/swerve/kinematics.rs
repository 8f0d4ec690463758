//! # Swerve kinematics
//!
//! Inverse kinematics turn a chassis velocity into four wheel states. Forward kinematics go the
//! other way, solving the over-determined system of eight wheel velocity components for the
//! three chassis velocity components in the least squares sense.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use nalgebra::{DMatrix, DVector, Vector2};

// Internal
use super::{
    ChassisError, ChassisGeometry, ChassisSpeeds, WheelPosition, WheelState, WheelTarget,
    NUM_MODULES,
};
use crate::loc::Twist2D;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Kinematic model of a four module swerve chassis.
#[derive(Debug, Clone)]
pub struct SwerveKinematics {
    /// Wheel positions in the body frame.
    ///
    /// Units: meters
    offsets_m: [Vector2<f64>; NUM_MODULES],

    /// Least squares solution of the inverse kinematics matrix, 3 x 8.
    forward_matrix: DMatrix<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SwerveKinematics {
    /// Build the kinematic model for the given geometry.
    pub fn new(geometry: &ChassisGeometry) -> Result<Self, ChassisError> {
        let offsets_m = geometry.module_offsets_m();

        // Each wheel contributes two rows, [1 0 -y] and [0 1 x]
        let mut inverse = DMatrix::<f64>::zeros(2 * NUM_MODULES, 3);
        for (i, o) in offsets_m.iter().enumerate() {
            inverse[(2 * i, 0)] = 1.0;
            inverse[(2 * i, 2)] = -o[1];
            inverse[(2 * i + 1, 1)] = 1.0;
            inverse[(2 * i + 1, 2)] = o[0];
        }

        let inverse_t = inverse.transpose();
        let normal = match (&inverse_t * &inverse).try_inverse() {
            Some(n) => n,
            None => {
                return Err(ChassisError::InvariantViolation(
                    "wheel layout does not constrain the chassis motion".into(),
                ))
            }
        };

        Ok(Self {
            offsets_m,
            forward_matrix: normal * inverse_t,
        })
    }

    pub fn offsets_m(&self) -> &[Vector2<f64>; NUM_MODULES] {
        &self.offsets_m
    }

    /// Compute the wheel states which achieve the given body frame chassis speeds.
    ///
    /// A wheel with zero speed is given an angle of zero; the modules keep their current angle
    /// when at rest so this does not cause any steering.
    pub fn to_wheel_states(&self, speeds: &ChassisSpeeds) -> [WheelState; NUM_MODULES] {
        let mut states = [WheelState::default(); NUM_MODULES];

        for (state, o) in states.iter_mut().zip(self.offsets_m.iter()) {
            let vx = speeds.vx_ms - speeds.omega_rads * o[1];
            let vy = speeds.vy_ms + speeds.omega_rads * o[0];

            state.speed_ms = vx.hypot(vy);
            state.angle_deg = vy.atan2(vx).to_degrees();
        }

        states
    }

    /// Compute the body frame chassis speeds which best explain the given wheel states.
    pub fn to_chassis_speeds(&self, states: &[WheelState; NUM_MODULES]) -> ChassisSpeeds {
        let v = self.solve(states.iter().map(|s| (s.speed_ms, s.angle_deg)));

        ChassisSpeeds::new(v[0], v[1], v[2])
    }

    /// Compute the body frame motion which best explains the given wheel displacements.
    ///
    /// `deltas` holds the distance each wheel travelled since the last update along with its
    /// current angle.
    pub fn to_twist(&self, deltas: &[WheelPosition; NUM_MODULES]) -> Twist2D {
        let v = self.solve(deltas.iter().map(|d| (d.distance_m, d.angle_deg)));

        Twist2D {
            dx_m: v[0],
            dy_m: v[1],
            dtheta_rad: v[2],
        }
    }

    /// Scale all wheel speeds down so that none exceed `max_speed_ms`, preserving their ratios.
    ///
    /// Returns true if any scaling was applied.
    pub fn desaturate(targets: &mut [WheelTarget; NUM_MODULES], max_speed_ms: f64) -> bool {
        if !(max_speed_ms > 0.0) {
            warn!(
                "{}",
                ChassisError::InvariantViolation(format!(
                    "desaturation limit must be positive (got {}), wheel speeds not limited",
                    max_speed_ms
                ))
            );
            return false;
        }

        let max_observed_ms = targets
            .iter()
            .map(|t| t.state.speed_ms.abs())
            .fold(0.0, f64::max);

        if max_observed_ms <= max_speed_ms {
            return false;
        }

        for t in targets.iter_mut() {
            t.state.speed_ms = t.state.speed_ms / max_observed_ms * max_speed_ms;
        }

        true
    }

    /// Solve the least squares forward kinematics for per-wheel (magnitude, angle) pairs.
    fn solve<I>(&self, wheels: I) -> DVector<f64>
    where
        I: Iterator<Item = (f64, f64)>,
    {
        let mut components = DVector::<f64>::zeros(2 * NUM_MODULES);
        for (i, (mag, angle_deg)) in wheels.enumerate().take(NUM_MODULES) {
            let (sin_a, cos_a) = angle_deg.to_radians().sin_cos();
            components[2 * i] = mag * cos_a;
            components[2 * i + 1] = mag * sin_a;
        }

        &self.forward_matrix * components
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::swerve::geometry::test::test_geometry;
    use approx::assert_relative_eq;

    fn kinematics() -> SwerveKinematics {
        SwerveKinematics::new(&test_geometry()).unwrap()
    }

    fn target(speed_ms: f64, angle_deg: f64) -> WheelTarget {
        WheelTarget {
            state: WheelState {
                speed_ms,
                angle_deg,
            },
            hold_angle: false,
        }
    }

    #[test]
    fn test_translation() {
        let states = kinematics().to_wheel_states(&ChassisSpeeds::new(1.0, 1.0, 0.0));

        for s in states.iter() {
            assert_relative_eq!(s.speed_ms, 2f64.sqrt(), epsilon = 1e-12);
            assert_relative_eq!(s.angle_deg, 45.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_rotation_in_place() {
        // Square chassis, each wheel 0.25 * sqrt(2) m from the centre
        let states = kinematics().to_wheel_states(&ChassisSpeeds::new(0.0, 0.0, 2.0));

        let expected_angles = [135.0, 45.0, -135.0, -45.0];
        for (s, a) in states.iter().zip(expected_angles.iter()) {
            assert_relative_eq!(s.speed_ms, 2.0 * 0.25 * 2f64.sqrt(), epsilon = 1e-12);
            assert_relative_eq!(s.angle_deg, *a, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_forward_recovers_speeds() {
        let k = kinematics();
        let speeds = ChassisSpeeds::new(1.5, -0.5, 0.8);

        let recovered = k.to_chassis_speeds(&k.to_wheel_states(&speeds));

        assert_relative_eq!(recovered.vx_ms, speeds.vx_ms, epsilon = 1e-9);
        assert_relative_eq!(recovered.vy_ms, speeds.vy_ms, epsilon = 1e-9);
        assert_relative_eq!(recovered.omega_rads, speeds.omega_rads, epsilon = 1e-9);
    }

    #[test]
    fn test_desaturate() {
        let mut targets = [
            target(8.0, 10.0),
            target(-4.0, 20.0),
            target(2.0, 30.0),
            target(6.0, 40.0),
        ];

        assert!(SwerveKinematics::desaturate(&mut targets, 4.0));

        // Largest speed lands exactly on the limit, ratios and angles are kept
        assert_eq!(targets[0].state.speed_ms, 4.0);
        assert_relative_eq!(targets[1].state.speed_ms, -2.0, epsilon = 1e-12);
        assert_relative_eq!(targets[2].state.speed_ms, 1.0, epsilon = 1e-12);
        assert_relative_eq!(targets[3].state.speed_ms, 3.0, epsilon = 1e-12);
        let angles: Vec<f64> = targets.iter().map(|t| t.state.angle_deg).collect();
        assert_eq!(angles, vec![10.0, 20.0, 30.0, 40.0]);

        // Negative speeds can be the largest too
        let mut targets = [target(1.0, 0.0), target(-5.0, 0.0), target(0.0, 0.0), target(2.5, 0.0)];
        assert!(SwerveKinematics::desaturate(&mut targets, 4.0));
        assert_eq!(targets[1].state.speed_ms, -4.0);
        assert_relative_eq!(targets[3].state.speed_ms, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_desaturate_noop() {
        let original = [target(1.0, 0.0), target(-4.0, 0.0), target(0.0, 0.0), target(2.5, 0.0)];

        let mut targets = original;
        assert!(!SwerveKinematics::desaturate(&mut targets, 4.0));
        assert_eq!(targets, original);

        // An invalid limit is reported and the speeds are left alone
        let mut targets = [target(10.0, 0.0); NUM_MODULES];
        assert!(!SwerveKinematics::desaturate(&mut targets, 0.0));
        assert_eq!(targets[0].state.speed_ms, 10.0);
    }
}

//! Robot oriented driving

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::DriveContext;
use crate::swerve::{ChassisSpeeds, MotionIntent, WheelTarget, NUM_MODULES};
use chassis_if::tc::HeadingOption;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drives with speeds given in the chassis body frame.
///
/// Also used by the field oriented and trajectory states once they have converted their demand
/// into the body frame.
#[derive(Debug, Clone, Default)]
pub struct RobotDrive {
    pub(crate) heading_option: HeadingOption,
    pub(crate) intent: MotionIntent,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RobotDrive {
    pub fn calc_wheel_targets(&self, ctx: &DriveContext) -> [WheelTarget; NUM_MODULES] {
        Self::calc_for_speeds(&self.intent.chassis_speeds, ctx)
    }

    /// Drive body frame speeds worked out by an owning state, keeping them as this state's intent.
    pub(crate) fn calc_for_body(
        &mut self,
        body: ChassisSpeeds,
        ctx: &DriveContext,
    ) -> [WheelTarget; NUM_MODULES] {
        self.intent.chassis_speeds = body;
        self.calc_wheel_targets(ctx)
    }

    /// Compute wheel targets for body frame speeds, applying the context's orientation policy to
    /// the rotation rate.
    pub fn calc_for_speeds(
        speeds: &ChassisSpeeds,
        ctx: &DriveContext,
    ) -> [WheelTarget; NUM_MODULES] {
        let omega_rads = ctx.orientation.resolve_omega(
            &ctx.pose,
            speeds.omega_rads,
            ctx.orientation_params,
            ctx.geometry.max_angular_speed_rads,
        );

        let states = ctx.kinematics.to_wheel_states(&ChassisSpeeds {
            omega_rads,
            ..*speeds
        });

        let mut targets = [WheelTarget::default(); NUM_MODULES];
        for (t, s) in targets.iter_mut().zip(states.iter()) {
            t.state = *s;
        }

        targets
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::loc::Pose2D;
    use crate::swerve::drive_state::test::TestCtx;
    use crate::swerve::OrientationPolicy;
    use approx::assert_relative_eq;

    #[test]
    fn test_robot_drive() {
        let tc = TestCtx::new();
        let drive = RobotDrive {
            heading_option: HeadingOption::Default,
            intent: MotionIntent::from_speeds(ChassisSpeeds::new(1.0, 0.0, 0.0)),
        };

        // Heading doesn't matter in the body frame
        let targets = drive.calc_wheel_targets(&tc.ctx(Pose2D::new(0.0, 0.0, 123.0), 0.0));
        for t in targets.iter() {
            assert_relative_eq!(t.state.speed_ms, 1.0);
            assert_relative_eq!(t.state.angle_deg, 0.0);
            assert!(!t.hold_angle);
        }
    }

    #[test]
    fn test_heading_correction() {
        let tc = TestCtx::new();
        let mut ctx = tc.ctx(Pose2D::new(0.0, 0.0, 0.0), 0.0);
        ctx.orientation = OrientationPolicy::TrackFixedHeading {
            target_heading_deg: 90.0,
        };

        // Asked to stand still but the policy wants to turn left
        let targets = RobotDrive::calc_for_speeds(&ChassisSpeeds::default(), &ctx);
        let expected = tc
            .kinematics
            .to_wheel_states(&ChassisSpeeds::new(0.0, 0.0, 2.0 * 90f64.to_radians()));

        for (t, e) in targets.iter().zip(expected.iter()) {
            assert_relative_eq!(t.state.speed_ms, e.speed_ms, epsilon = 1e-12);
            assert_relative_eq!(t.state.angle_deg, e.angle_deg, epsilon = 1e-9);
        }
    }
}

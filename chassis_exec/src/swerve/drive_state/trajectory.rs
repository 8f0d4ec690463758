//! Trajectory following

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};
use std::sync::Arc;

// Internal
use super::{DriveContext, RobotDrive};
use crate::swerve::{
    ChassisSpeeds, HolonomicController, MotionIntent, RamseteController, Trajectory,
    TrajectoryControllerParams, WheelState, WheelTarget, NUM_MODULES,
};
use chassis_if::tc::{ControllerKind, HeadingOption};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Follows the intent's trajectory from the moment the state was entered, or from the moment a
/// new trajectory was given.
#[derive(Debug, Clone)]
pub struct TrajectoryDrive {
    pub(crate) heading_option: HeadingOption,
    pub(crate) intent: MotionIntent,

    holonomic: HolonomicController,
    ramsete: RamseteController,

    /// Drives the corrected body frame speeds.
    robot: RobotDrive,

    /// Time at which the current trajectory was started, set on the first cycle after `init` or
    /// after a new trajectory.
    ///
    /// Units: seconds
    start_time_s: Option<f64>,

    /// Time elapsed along the trajectory on the last cycle.
    ///
    /// Units: seconds
    elapsed_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajectoryDrive {
    pub fn new(params: &TrajectoryControllerParams) -> Self {
        Self {
            heading_option: HeadingOption::Default,
            intent: MotionIntent::default(),
            holonomic: HolonomicController::new(params),
            ramsete: RamseteController::new(params),
            robot: RobotDrive::default(),
            start_time_s: None,
            elapsed_s: 0.0,
        }
    }

    /// Restart the trajectory timer and clear the controllers.
    pub fn init(&mut self, time_s: f64) {
        self.start_time_s = Some(time_s);
        self.elapsed_s = 0.0;
        self.holonomic.reset();
    }

    pub(crate) fn set_motion_intent(&mut self, intent: MotionIntent) {
        let is_new = match (&self.intent.trajectory, &intent.trajectory) {
            (Some(old), Some(new)) => !Arc::ptr_eq(old, new),
            (None, Some(_)) => true,
            _ => false,
        };

        self.intent = intent;

        if is_new {
            debug!("New trajectory received, timer will restart");
            self.start_time_s = None;
            self.elapsed_s = 0.0;
            self.holonomic.reset();
        }
    }

    pub fn trajectory(&self) -> Option<&Arc<Trajectory>> {
        self.intent.trajectory.as_ref()
    }

    /// True once the whole trajectory has been followed. Always true without a trajectory.
    pub fn is_finished(&self) -> bool {
        match self.intent.trajectory {
            Some(ref t) => self.start_time_s.is_some() && self.elapsed_s >= t.total_time_s(),
            None => true,
        }
    }

    pub fn calc_wheel_targets(&mut self, ctx: &DriveContext) -> [WheelTarget; NUM_MODULES] {
        let trajectory = match self.intent.trajectory {
            Some(ref t) => t.clone(),
            None => {
                warn!("Trajectory following without a trajectory, stopping");
                let mut targets = [WheelTarget::default(); NUM_MODULES];
                for (t, a) in targets.iter_mut().zip(ctx.module_angles_deg.iter()) {
                    t.state = WheelState {
                        speed_ms: 0.0,
                        angle_deg: *a,
                    };
                }
                return targets;
            }
        };

        let start_time_s = *self.start_time_s.get_or_insert(ctx.time_s);
        self.elapsed_s = ctx.time_s - start_time_s;

        let reference = trajectory.sample(self.elapsed_s);

        let body = match self.intent.controller_kind {
            ControllerKind::Holonomic => {
                let field = self.holonomic.calculate(&ctx.pose, &reference, ctx.time_s);
                ChassisSpeeds::from_field_relative(&field, ctx.pose.heading_deg)
            }
            ControllerKind::Ramsete => self.ramsete.calculate(&ctx.pose, &reference),
        };

        self.robot.calc_for_body(body, ctx)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::loc::Pose2D;
    use crate::swerve::controllers::test::test_controller_params;
    use crate::swerve::drive_state::test::TestCtx;
    use crate::swerve::trajectory::test::straight_trajectory;
    use approx::assert_relative_eq;

    #[test]
    fn test_timer_and_finish() {
        let tc = TestCtx::new();
        let traj = Arc::new(straight_trajectory(2.0, 1.0));

        let mut drive = TrajectoryDrive::new(&test_controller_params());
        assert!(drive.is_finished());

        drive.set_motion_intent(MotionIntent {
            trajectory: Some(traj.clone()),
            ..Default::default()
        });
        drive.init(10.0);
        assert!(!drive.is_finished());

        // On the trajectory, only the feedforward drives the wheels
        let targets = drive.calc_wheel_targets(&tc.ctx(Pose2D::new(0.5, 0.0, 0.0), 10.5));
        for t in targets.iter() {
            assert_relative_eq!(t.state.speed_ms, 1.0, epsilon = 1e-9);
            assert_relative_eq!(t.state.angle_deg, 0.0, epsilon = 1e-9);
        }

        drive.calc_wheel_targets(&tc.ctx(Pose2D::new(2.0, 0.0, 0.0), 12.0));
        assert!(drive.is_finished());

        // Giving the same trajectory again doesn't restart it, a new one does
        drive.set_motion_intent(MotionIntent {
            trajectory: Some(traj),
            ..Default::default()
        });
        assert!(drive.is_finished());
        drive.set_motion_intent(MotionIntent {
            trajectory: Some(Arc::new(straight_trajectory(2.0, 1.0))),
            ..Default::default()
        });
        assert!(!drive.is_finished());
    }

    #[test]
    fn test_lagging_chassis_speeds_up() {
        let tc = TestCtx::new();
        let mut drive = TrajectoryDrive::new(&test_controller_params());
        drive.set_motion_intent(MotionIntent {
            trajectory: Some(Arc::new(straight_trajectory(2.0, 1.0))),
            ..Default::default()
        });
        drive.init(0.0);

        // Half a meter behind where it should be
        let targets = drive.calc_wheel_targets(&tc.ctx(Pose2D::new(0.5, 0.0, 0.0), 1.0));
        for t in targets.iter() {
            assert_relative_eq!(t.state.speed_ms, 1.5, epsilon = 1e-9);
        }
        assert_relative_eq!(drive.robot.intent.chassis_speeds.vx_ms, 1.5, epsilon = 1e-9);
    }

    #[test]
    fn test_ramsete_selected() {
        let tc = TestCtx::new();
        let mut drive = TrajectoryDrive::new(&test_controller_params());
        drive.set_motion_intent(MotionIntent {
            trajectory: Some(Arc::new(straight_trajectory(2.0, 1.0))),
            controller_kind: ControllerKind::Ramsete,
            ..Default::default()
        });
        drive.init(0.0);

        let targets = drive.calc_wheel_targets(&tc.ctx(Pose2D::new(1.0, 0.0, 0.0), 1.0));
        for t in targets.iter() {
            assert_relative_eq!(t.state.speed_ms, 1.0, epsilon = 1e-9);
        }
    }
}

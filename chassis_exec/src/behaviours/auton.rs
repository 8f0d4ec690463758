//! Autonomous path following behaviour

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{info, warn};

use super::ChassisCtx;
use crate::state_mgr::MechState;
use crate::swerve::{DriveModeState, MotionIntent};
use chassis_if::tc::{ControllerKind, DriveMode, HeadingOption};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Follows the trajectory in the context, then stops.
#[derive(Debug, Default)]
pub struct AutonPath {
    finished: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AutonPath {
    fn stop(ctx: &mut ChassisCtx) {
        ctx.chassis.set_motion_intent(
            DriveMode::Stationary,
            HeadingOption::Default,
            MotionIntent::default(),
        );
        ctx.chassis.drive_mode(DriveMode::Stationary);
    }
}

impl MechState<ChassisCtx> for AutonPath {
    fn init(&mut self, ctx: &mut ChassisCtx) {
        self.finished = false;

        match ctx.trajectory {
            Some(ref t) => info!(
                "Following a {:.2} s trajectory from {:?}",
                t.total_time_s(),
                ctx.chassis.pose()
            ),
            None => warn!("Autonomous path started without a trajectory"),
        }
    }

    fn run(&mut self, ctx: &mut ChassisCtx) {
        if self.finished {
            Self::stop(ctx);
            return;
        }

        let trajectory = match ctx.trajectory {
            Some(ref t) => t.clone(),
            None => {
                Self::stop(ctx);
                return;
            }
        };

        let intent = MotionIntent {
            trajectory: Some(trajectory),
            controller_kind: ControllerKind::Holonomic,
            ..MotionIntent::default()
        };
        ctx.chassis.set_motion_intent(
            DriveMode::TrajectoryFollowing,
            HeadingOption::Default,
            intent,
        );
        ctx.chassis.drive_mode(DriveMode::TrajectoryFollowing);

        let done = match ctx.chassis.drive_state(DriveMode::TrajectoryFollowing) {
            Some(DriveModeState::TrajectoryFollowing(s)) => s.is_finished(),
            _ => true,
        };

        if done {
            info!("Trajectory complete at {:?}", ctx.chassis.pose());
            self.finished = true;
            Self::stop(ctx);
        }
    }

    fn exit(&mut self, ctx: &mut ChassisCtx) {
        if !self.finished {
            warn!("Autonomous path interrupted at {:?}", ctx.chassis.pose());
        }
    }

    fn at_target(&self) -> bool {
        self.finished
    }
}

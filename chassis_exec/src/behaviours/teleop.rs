//! Teleop drive behaviour

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info};

use super::{ChassisCtx, TeleopParams};
use crate::state_mgr::MechState;
use crate::swerve::{ChassisSpeeds, MotionIntent};
use chassis_if::tc::{ControllerKind, DriveMode, HeadingOption, StopBehaviour};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drives the chassis from the driver's input.
///
/// - Field oriented with the heading maintained, or robot oriented while that button is held.
/// - Faces the goal while find target is held.
/// - Locks the wheels while hold position is held.
/// - Re-zero gyro declares the current heading to be zero.
#[derive(Debug)]
pub struct TeleopDrive {
    params: TeleopParams,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TeleopDrive {
    pub fn new(params: TeleopParams) -> Self {
        Self { params }
    }
}

impl MechState<ChassisCtx> for TeleopDrive {
    fn init(&mut self, _ctx: &mut ChassisCtx) {
        info!("Chassis under driver control");
    }

    fn run(&mut self, ctx: &mut ChassisCtx) {
        let input = ctx.input;

        let heading_option = if input.find_target {
            HeadingOption::TowardGoal
        } else {
            HeadingOption::Maintain
        };

        if input.rezero_gyro {
            ctx.chassis.rezero_heading(0.0);
        }

        let (mode, stop_behaviour) = if input.hold_position {
            (DriveMode::Stationary, StopBehaviour::HoldPosition)
        } else if input.robot_oriented {
            (DriveMode::RobotOriented, StopBehaviour::Stop)
        } else {
            (DriveMode::FieldOriented, StopBehaviour::Stop)
        };

        let geometry = *ctx.chassis.geometry();
        let rotate = if input.rotate.abs() < self.params.rotate_deadband {
            0.0
        } else {
            input.rotate
        };

        let speeds = ChassisSpeeds::new(
            input.drive * self.params.drive_scale * geometry.max_speed_ms,
            input.steer * self.params.steer_scale * geometry.max_speed_ms,
            rotate * self.params.rotate_scale * geometry.max_angular_speed_rads,
        );

        debug!("Teleop {} {:?}", mode, speeds);

        ctx.chassis.set_motion_intent(
            mode,
            heading_option,
            MotionIntent {
                chassis_speeds: speeds,
                trajectory: None,
                target_point: None,
                stop_behaviour,
                controller_kind: ControllerKind::Holonomic,
            },
        );
        ctx.chassis.drive_mode(mode);
    }

    fn exit(&mut self, _ctx: &mut ChassisCtx) {}
}

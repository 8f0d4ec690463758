//! Field oriented driving

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::{DriveContext, RobotDrive};
use crate::swerve::{ChassisSpeeds, MotionIntent, WheelTarget, NUM_MODULES};
use chassis_if::tc::HeadingOption;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drives with speeds given in the field frame, so that "forwards" on the stick is always away
/// from the driver whichever way the chassis is facing.
#[derive(Debug, Clone, Default)]
pub struct FieldDrive {
    pub(crate) heading_option: HeadingOption,
    pub(crate) intent: MotionIntent,

    /// Drives the body frame speeds once they are converted.
    robot: RobotDrive,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FieldDrive {
    pub fn calc_wheel_targets(&mut self, ctx: &DriveContext) -> [WheelTarget; NUM_MODULES] {
        let body =
            ChassisSpeeds::from_field_relative(&self.intent.chassis_speeds, ctx.pose.heading_deg);

        self.robot.calc_for_body(body, ctx)
    }
}

//! Idle behaviour

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::info;

use super::ChassisCtx;
use crate::state_mgr::MechState;
use crate::swerve::MotionIntent;
use chassis_if::tc::{DriveMode, HeadingOption};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Keeps the chassis stopped.
#[derive(Debug, Default)]
pub struct Idle;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MechState<ChassisCtx> for Idle {
    fn init(&mut self, ctx: &mut ChassisCtx) {
        info!("Chassis idle");
        ctx.chassis.set_motion_intent(
            DriveMode::Stationary,
            HeadingOption::Default,
            MotionIntent::default(),
        );
    }

    fn run(&mut self, ctx: &mut ChassisCtx) {
        ctx.chassis.drive_mode(DriveMode::Stationary);
    }

    fn exit(&mut self, _ctx: &mut ChassisCtx) {}

    fn at_target(&self) -> bool {
        true
    }
}

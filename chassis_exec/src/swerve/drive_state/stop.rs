//! Stationary

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::{hold::hold_pattern, DriveContext};
use crate::swerve::{MotionIntent, WheelState, WheelTarget, NUM_MODULES};
use chassis_if::tc::{HeadingOption, StopBehaviour};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Stops the wheels. Depending on the intent's stop behaviour the steering is either left where
/// it is or locked into the hold pattern.
#[derive(Debug, Clone, Default)]
pub struct StopDrive {
    pub(crate) heading_option: HeadingOption,
    pub(crate) intent: MotionIntent,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl StopDrive {
    pub fn calc_wheel_targets(&self, ctx: &DriveContext) -> [WheelTarget; NUM_MODULES] {
        if self.intent.stop_behaviour == StopBehaviour::HoldPosition {
            return hold_pattern();
        }

        let mut targets = [WheelTarget::default(); NUM_MODULES];
        for (t, a) in targets.iter_mut().zip(ctx.module_angles_deg.iter()) {
            t.state = WheelState {
                speed_ms: 0.0,
                angle_deg: *a,
            };
        }

        targets
    }
}

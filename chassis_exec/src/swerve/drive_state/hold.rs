//! Hold in place

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::DriveContext;
use crate::swerve::{MotionIntent, WheelState, WheelTarget, NUM_MODULES};
use chassis_if::tc::HeadingOption;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Wheel angles forming an X, in module order. With every wheel across the direction any other
/// wheel would roll in, the chassis resists being pushed.
///
/// Units: degrees
pub const HOLD_PATTERN_DEG: [f64; NUM_MODULES] = [45.0, -45.0, 135.0, -135.0];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Locks the wheels into an X. The motion intent is ignored.
#[derive(Debug, Clone, Default)]
pub struct HoldDrive {
    pub(crate) heading_option: HeadingOption,
    pub(crate) intent: MotionIntent,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl HoldDrive {
    pub fn calc_wheel_targets(&self, _ctx: &DriveContext) -> [WheelTarget; NUM_MODULES] {
        hold_pattern()
    }
}

/// Zero speed targets in the hold pattern.
pub(crate) fn hold_pattern() -> [WheelTarget; NUM_MODULES] {
    let mut targets = [WheelTarget::default(); NUM_MODULES];

    for (t, a) in targets.iter_mut().zip(HOLD_PATTERN_DEG.iter()) {
        *t = WheelTarget {
            state: WheelState {
                speed_ms: 0.0,
                angle_deg: *a,
            },
            hold_angle: true,
        };
    }

    targets
}

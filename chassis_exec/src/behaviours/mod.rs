//! # Chassis behaviours
//!
//! The behaviours run by the chassis [`StateMgr`]:
//!
//! - `IDLE` - the chassis is stationary. Used while the robot is disabled.
//! - `TELEOP_DRIVE` - the driver's input is turned into a motion intent.
//! - `AUTON_PATH` - the chassis follows the trajectory given by the autonomous routine.
//!
//! The robot operating mode selects the behaviour, see [`robot_mode_transitions`].

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod auton;
mod idle;
mod teleop;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Standard
use std::{collections::HashMap, sync::Arc};

// External
use serde::Deserialize;

// Internal
pub use auton::AutonPath;
pub use idle::Idle;
pub use teleop::TeleopDrive;

use crate::state_mgr::{MechState, StateMgr, StateStruc, TransitionCheck};
use crate::swerve::{ChassisParams, SwerveChassis, Trajectory};
use chassis_if::tc::{DriverInput, RobotMode};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Slot of the idle behaviour.
pub const IDLE: usize = 0;

/// Slot of the teleop behaviour.
pub const TELEOP_DRIVE: usize = 1;

/// Slot of the autonomous path behaviour.
pub const AUTON_PATH: usize = 2;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Everything the chassis behaviours act on.
pub struct ChassisCtx {
    pub chassis: SwerveChassis,

    /// Latest driver input.
    pub input: DriverInput,

    pub robot_mode: RobotMode,

    /// Trajectory to follow in autonomous.
    pub trajectory: Option<Arc<Trajectory>>,
}

/// Scaling of the driver's input.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TeleopParams {
    /// Fraction of the maximum speed given by full forwards input.
    pub drive_scale: f64,

    /// Fraction of the maximum speed given by full sideways input.
    pub steer_scale: f64,

    /// Fraction of the maximum angular speed given by full rotate input.
    pub rotate_scale: f64,

    /// Rotate input below which the driver is considered not to be rotating.
    pub rotate_deadband: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ChassisCtx {
    pub fn new(chassis: SwerveChassis) -> Self {
        Self {
            chassis,
            input: DriverInput::default(),
            robot_mode: RobotMode::Disabled,
            trajectory: None,
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Names of the chassis behaviours as used in the parameters.
pub fn chassis_state_map() -> HashMap<&'static str, StateStruc> {
    let mut map = HashMap::new();

    map.insert(
        "IDLE",
        StateStruc {
            id: IDLE,
            is_default: true,
        },
    );
    map.insert(
        "TELEOP_DRIVE",
        StateStruc {
            id: TELEOP_DRIVE,
            is_default: false,
        },
    );
    map.insert(
        "AUTON_PATH",
        StateStruc {
            id: AUTON_PATH,
            is_default: false,
        },
    );

    map
}

/// Select the behaviour for the robot's operating mode.
pub fn robot_mode_transitions() -> TransitionCheck<ChassisCtx> {
    Box::new(|ctx: &ChassisCtx, _current: Option<usize>| {
        let slot = match ctx.robot_mode {
            RobotMode::Disabled => IDLE,
            RobotMode::Autonomous => AUTON_PATH,
            RobotMode::Teleop => TELEOP_DRIVE,
        };

        Some((slot, true))
    })
}

/// Build the chassis state manager from the parameters.
///
/// A broken state configuration leaves the manager inert, which is logged.
pub fn build_chassis_state_mgr(params: &ChassisParams, ctx: &mut ChassisCtx) -> StateMgr<ChassisCtx> {
    let teleop_params = params.teleop;

    let factory = move |name: &str, id: usize| -> Option<Box<dyn MechState<ChassisCtx>>> {
        match id {
            IDLE => Some(Box::new(Idle::default())),
            TELEOP_DRIVE => Some(Box::new(TeleopDrive::new(teleop_params))),
            AUTON_PATH => Some(Box::new(AutonPath::default())),
            _ => {
                log::warn!("No chassis behaviour for {} in slot {}", name, id);
                None
            }
        }
    };

    let mut mgr = StateMgr::new("chassis");
    mgr.init(
        &params.states,
        &chassis_state_map(),
        &factory,
        Some(robot_mode_transitions()),
        ctx,
    );

    mgr
}

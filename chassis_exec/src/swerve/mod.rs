//! # Swerve chassis module
//!
//! Converts motion intents into individual wheel commands for a four module swerve chassis, and
//! keeps track of where the chassis is.
//!
//! The per-cycle flow is:
//!
//! 1. [`SwerveChassis::update_odometry`] refreshes each [`WheelModule`] and updates the pose.
//! 2. The active [`DriveModeState`] computes four [`WheelTarget`]s from the current
//!    [`MotionIntent`], consulting the [`OrientationPolicy`] bound to it.
//! 3. The targets are desaturated and sent to the modules.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod chassis;
mod cmd;
mod controllers;
mod drive_state;
mod geometry;
mod kinematics;
mod module;
mod orientation;
pub(crate) mod params;
mod trajectory;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use chassis::*;
pub use cmd::*;
pub use controllers::*;
pub use drive_state::*;
pub use geometry::*;
pub use kinematics::*;
pub use module::*;
pub use orientation::*;
pub use params::*;
pub use trajectory::*;

use chassis_if::tc::{DriveMode, HeadingOption};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The number of wheel modules on the chassis.
pub const NUM_MODULES: usize = 4;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Identifies a wheel module. Arrays of per-module data are always in this order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ModuleId {
    FrontLeft,
    FrontRight,
    BackLeft,
    BackRight,
}

/// Possible errors that can occur in the swerve chassis.
#[derive(Debug, thiserror::Error)]
pub enum ChassisError {
    #[error("Invalid chassis geometry, {0} must be finite and greater than zero (got {1})")]
    InvalidGeometry(&'static str, f64),

    #[error("The {1} of the {0:?} module is missing")]
    MissingDevice(ModuleId, &'static str),

    #[error("The chassis gyro is missing")]
    MissingGyro,

    #[error("Could not load the chassis parameters: {0}")]
    ParamLoad(util::params::LoadError),

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Drive mode {0} is not enabled on this chassis")]
    UnsupportedDriveMode(DriveMode),

    #[error("Heading option {0} is not enabled on this chassis")]
    UnsupportedHeadingOption(HeadingOption),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ModuleId {
    /// All modules, in array order.
    pub const ALL: [ModuleId; NUM_MODULES] = [
        ModuleId::FrontLeft,
        ModuleId::FrontRight,
        ModuleId::BackLeft,
        ModuleId::BackRight,
    ];

    /// Index of this module in per-module arrays.
    pub fn index(self) -> usize {
        match self {
            ModuleId::FrontLeft => 0,
            ModuleId::FrontRight => 1,
            ModuleId::BackLeft => 2,
            ModuleId::BackRight => 3,
        }
    }
}

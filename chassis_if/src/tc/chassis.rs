//! # Chassis commands
//!
//! Enumerations used to select how the chassis drives, and the driver input that the teleop
//! behaviour turns into a motion intent.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The state of the driver's controls on one cycle.
///
/// Axis values have already been shaped (deadband, response curve and scale) by the input layer
/// and lie in the range [-1, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverInput {
    /// Forwards/backwards demand, forwards positive.
    pub drive: f64,

    /// Left/right demand, left positive.
    pub steer: f64,

    /// Rotation demand, anticlockwise positive.
    pub rotate: f64,

    /// Held while the chassis should face the goal.
    pub find_target: bool,

    /// Pressed to re-zero the gyro, taking the current heading as zero.
    pub rezero_gyro: bool,

    /// Held while the chassis should resist being pushed.
    pub hold_position: bool,

    /// Held while the driver wants robot oriented rather than field oriented control.
    pub robot_oriented: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The driving semantics the chassis can use.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriveMode {
    /// Speeds are given in the robot's body frame.
    RobotOriented,

    /// Speeds are given in the field frame and rotated into the body frame using the current pose.
    FieldOriented,

    /// Wheels are locked into an X pattern so the chassis resists being pushed.
    HoldInPlace,

    /// Wheels are stopped, steering angles are left where they are.
    Stationary,

    /// A pre-generated trajectory is followed using a feedback controller.
    TrajectoryFollowing,
}

/// The rule that determines which heading the chassis tries to hold while driving.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeadingOption {
    /// No heading control, the requested rotation rate is used as is.
    Default,

    /// Hold the last stored heading while the driver isn't rotating.
    Maintain,

    /// Turn to and hold a configured absolute heading.
    SpecifiedAngle,

    /// Face the goal landmark on the field.
    TowardGoal,
}

/// What the chassis does when it is asked not to move.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopBehaviour {
    /// Stop the drive wheels and leave the steering where it is.
    Stop,

    /// Lock the wheels into the hold pattern.
    HoldPosition,
}

/// The feedback controller used when following a trajectory.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerKind {
    /// Independent X, Y and heading controllers.
    Holonomic,

    /// Nonlinear unicycle tracking controller.
    Ramsete,
}

/// Operating mode of the robot, as set by the lifecycle scheduler.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RobotMode {
    Disabled,
    Autonomous,
    Teleop,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for HeadingOption {
    fn default() -> Self {
        HeadingOption::Default
    }
}

impl Default for StopBehaviour {
    fn default() -> Self {
        StopBehaviour::Stop
    }
}

impl Default for ControllerKind {
    fn default() -> Self {
        ControllerKind::Holonomic
    }
}

impl Default for RobotMode {
    fn default() -> Self {
        RobotMode::Disabled
    }
}

impl fmt::Display for DriveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl fmt::Display for HeadingOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

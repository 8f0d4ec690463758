//! # Drive mode states
//!
//! Each [`DriveMode`] is implemented by one variant of [`DriveModeState`]. A state turns the
//! latest [`MotionIntent`] into four wheel targets; desaturation and dispatch to the modules are
//! left to the chassis.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod field;
mod hold;
mod robot;
mod stop;
mod trajectory;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use field::FieldDrive;
pub use hold::{HoldDrive, HOLD_PATTERN_DEG};
pub use robot::RobotDrive;
pub use stop::StopDrive;
pub use trajectory::TrajectoryDrive;

use super::{
    ChassisGeometry, MotionIntent, OrientationParams, OrientationPolicy, SwerveKinematics,
    TrajectoryControllerParams, WheelTarget, NUM_MODULES,
};
use crate::loc::Pose2D;
use chassis_if::tc::{DriveMode, HeadingOption};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Everything a drive mode state may read while computing wheel targets.
pub struct DriveContext<'a> {
    /// Current pose estimate.
    pub pose: Pose2D,

    /// Current time.
    ///
    /// Units: seconds
    pub time_s: f64,

    /// Latest measured angle of each module.
    ///
    /// Units: degrees
    pub module_angles_deg: [f64; NUM_MODULES],

    pub kinematics: &'a SwerveKinematics,

    pub geometry: &'a ChassisGeometry,

    /// Policy bound to the state's heading option.
    pub orientation: OrientationPolicy,

    pub orientation_params: &'a OrientationParams,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A drive mode and the state it needs between cycles.
#[derive(Debug, Clone)]
pub enum DriveModeState {
    RobotOriented(RobotDrive),
    FieldOriented(FieldDrive),
    HoldInPlace(HoldDrive),
    Stationary(StopDrive),
    TrajectoryFollowing(TrajectoryDrive),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveModeState {
    /// Build the state implementing the given mode.
    pub fn new(mode: DriveMode, traj_params: &TrajectoryControllerParams) -> Self {
        match mode {
            DriveMode::RobotOriented => DriveModeState::RobotOriented(RobotDrive::default()),
            DriveMode::FieldOriented => DriveModeState::FieldOriented(FieldDrive::default()),
            DriveMode::HoldInPlace => DriveModeState::HoldInPlace(HoldDrive::default()),
            DriveMode::Stationary => DriveModeState::Stationary(StopDrive::default()),
            DriveMode::TrajectoryFollowing => {
                DriveModeState::TrajectoryFollowing(TrajectoryDrive::new(traj_params))
            }
        }
    }

    pub fn mode(&self) -> DriveMode {
        match self {
            DriveModeState::RobotOriented(_) => DriveMode::RobotOriented,
            DriveModeState::FieldOriented(_) => DriveMode::FieldOriented,
            DriveModeState::HoldInPlace(_) => DriveMode::HoldInPlace,
            DriveModeState::Stationary(_) => DriveMode::Stationary,
            DriveModeState::TrajectoryFollowing(_) => DriveMode::TrajectoryFollowing,
        }
    }

    /// Heading option this state is bound to.
    pub fn heading_option(&self) -> HeadingOption {
        match self {
            DriveModeState::RobotOriented(s) => s.heading_option,
            DriveModeState::FieldOriented(s) => s.heading_option,
            DriveModeState::HoldInPlace(s) => s.heading_option,
            DriveModeState::Stationary(s) => s.heading_option,
            DriveModeState::TrajectoryFollowing(s) => s.heading_option,
        }
    }

    pub fn set_heading_option(&mut self, option: HeadingOption) {
        match self {
            DriveModeState::RobotOriented(s) => s.heading_option = option,
            DriveModeState::FieldOriented(s) => s.heading_option = option,
            DriveModeState::HoldInPlace(s) => s.heading_option = option,
            DriveModeState::Stationary(s) => s.heading_option = option,
            DriveModeState::TrajectoryFollowing(s) => s.heading_option = option,
        }
    }

    /// Latest motion intent given to this state.
    pub fn motion_intent(&self) -> &MotionIntent {
        match self {
            DriveModeState::RobotOriented(s) => &s.intent,
            DriveModeState::FieldOriented(s) => &s.intent,
            DriveModeState::HoldInPlace(s) => &s.intent,
            DriveModeState::Stationary(s) => &s.intent,
            DriveModeState::TrajectoryFollowing(s) => &s.intent,
        }
    }

    pub fn set_motion_intent(&mut self, intent: MotionIntent) {
        match self {
            DriveModeState::RobotOriented(s) => s.intent = intent,
            DriveModeState::FieldOriented(s) => s.intent = intent,
            DriveModeState::HoldInPlace(s) => s.intent = intent,
            DriveModeState::Stationary(s) => s.intent = intent,
            DriveModeState::TrajectoryFollowing(s) => s.set_motion_intent(intent),
        }
    }

    /// Called when the chassis switches into this state.
    pub fn init(&mut self, time_s: f64) {
        if let DriveModeState::TrajectoryFollowing(s) = self {
            s.init(time_s)
        }
    }

    /// Compute the wheel targets for this cycle.
    pub fn calc_wheel_targets(&mut self, ctx: &DriveContext) -> [WheelTarget; NUM_MODULES] {
        match self {
            DriveModeState::RobotOriented(s) => s.calc_wheel_targets(ctx),
            DriveModeState::FieldOriented(s) => s.calc_wheel_targets(ctx),
            DriveModeState::HoldInPlace(s) => s.calc_wheel_targets(ctx),
            DriveModeState::Stationary(s) => s.calc_wheel_targets(ctx),
            DriveModeState::TrajectoryFollowing(s) => s.calc_wheel_targets(ctx),
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::swerve::{
        controllers::test::test_controller_params, geometry::test::test_geometry,
        orientation::test::test_orientation_params,
    };

    /// Holds the borrowed parts of a `DriveContext` for tests.
    pub(crate) struct TestCtx {
        pub kinematics: SwerveKinematics,
        pub geometry: ChassisGeometry,
        pub orientation_params: OrientationParams,
    }

    impl TestCtx {
        pub(crate) fn new() -> Self {
            let geometry = test_geometry();
            Self {
                kinematics: SwerveKinematics::new(&geometry).unwrap(),
                geometry,
                orientation_params: test_orientation_params(),
            }
        }

        pub(crate) fn ctx(&self, pose: Pose2D, time_s: f64) -> DriveContext {
            DriveContext {
                pose,
                time_s,
                module_angles_deg: [10.0, 20.0, 30.0, 40.0],
                kinematics: &self.kinematics,
                geometry: &self.geometry,
                orientation: OrientationPolicy::None,
                orientation_params: &self.orientation_params,
            }
        }
    }

    #[test]
    fn test_state_registry_round_trip() {
        let modes = [
            DriveMode::RobotOriented,
            DriveMode::FieldOriented,
            DriveMode::HoldInPlace,
            DriveMode::Stationary,
            DriveMode::TrajectoryFollowing,
        ];

        for mode in modes.iter() {
            let mut state = DriveModeState::new(*mode, &test_controller_params());
            assert_eq!(state.mode(), *mode);
            assert_eq!(state.heading_option(), HeadingOption::Default);

            state.set_heading_option(HeadingOption::Maintain);
            assert_eq!(state.heading_option(), HeadingOption::Maintain);
        }
    }
}

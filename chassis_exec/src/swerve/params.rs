//! Parameters structure for the swerve chassis

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::{
    ChassisError, ChassisGeometry, ModuleParams, OrientationParams, TrajectoryControllerParams,
};
use crate::{behaviours::TeleopParams, loc::PoseEstimatorParams, state_mgr::StateConfig};
use chassis_if::tc::{DriveMode, HeadingOption};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the swerve chassis and its behaviours.
#[derive(Debug, Clone, Deserialize)]
pub struct ChassisParams {
    // ---- HARDWARE ----
    pub geometry: ChassisGeometry,

    pub module: ModuleParams,

    // ---- ALGORITHMS ----
    pub estimator: PoseEstimatorParams,

    pub orientation: OrientationParams,

    pub trajectory: TrajectoryControllerParams,

    pub teleop: TeleopParams,

    // ---- CONFIGURATION ----
    /// Drive modes available on this chassis. Stationary is always available.
    pub drive_modes: Vec<DriveMode>,

    /// Heading options available on this chassis. Default is always available.
    pub heading_options: Vec<HeadingOption>,

    /// Behaviours run by the chassis state manager.
    pub states: Vec<StateConfig>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ChassisParams {
    /// Load the parameters from the given file in the parameters directory.
    pub fn load(param_file_path: &str) -> Result<Self, ChassisError> {
        util::params::load(param_file_path).map_err(ChassisError::ParamLoad)
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    /// The parameters shipped with the executable.
    pub(crate) fn shipped_params() -> ChassisParams {
        util::params::from_str(include_str!("../../../params/chassis.toml")).unwrap()
    }

    #[test]
    fn test_shipped_params() {
        let params = shipped_params();

        assert!(params.geometry.validate().is_ok());
        assert!(params.drive_modes.contains(&DriveMode::FieldOriented));
        assert!(params.heading_options.contains(&HeadingOption::Maintain));
        assert_eq!(params.states.len(), 3);
    }
}

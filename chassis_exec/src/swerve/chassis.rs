//! # Swerve chassis
//!
//! Top level of the chassis control. Owns the wheel modules, the gyro and the pose estimator, and
//! holds one [`DriveModeState`] for every enabled drive mode and one [`OrientationPolicy`] for
//! every enabled heading option.
//!
//! A typical cycle:
//!
//! ```ignore
//! chassis.update_odometry();
//! chassis.set_motion_intent(DriveMode::FieldOriented, HeadingOption::Maintain, intent);
//! chassis.drive_mode(DriveMode::FieldOriented);
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Standard
use std::collections::HashMap;

// External
use log::{debug, info, warn};

// Internal
use super::{
    build_modules, ChassisError, ChassisGeometry, ChassisParams, DriveContext, DriveModeState,
    ModuleHardware, MotionIntent, OrientationParams, OrientationPolicy, SwerveKinematics,
    WheelModule, WheelTarget, NUM_MODULES,
};
use crate::loc::{Pose2D, PoseEstimator};
use chassis_if::{
    eqpt::Gyro,
    tc::{DriveMode, HeadingOption},
    tm::ChassisTm,
};
use util::time::Clock;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A four module swerve chassis.
pub struct SwerveChassis {
    geometry: ChassisGeometry,
    kinematics: SwerveKinematics,

    modules: [WheelModule; NUM_MODULES],
    gyro: Box<dyn Gyro>,
    estimator: PoseEstimator,

    drive_states: HashMap<DriveMode, DriveModeState>,
    orientations: HashMap<HeadingOption, OrientationPolicy>,
    orientation_params: OrientationParams,

    current_mode: DriveMode,

    clock: Box<dyn Clock>,

    /// Targets sent to the modules on the last drive, after desaturation.
    last_targets: [WheelTarget; NUM_MODULES],

    /// True if the last drive had to be desaturated.
    desaturated: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SwerveChassis {
    /// Build the chassis from its parameters and hardware.
    ///
    /// The modules are zero aligned and the pose is reset to the origin, re-zeroing the gyro. The
    /// chassis starts out stationary.
    pub fn new(
        params: &ChassisParams,
        hardware: [ModuleHardware; NUM_MODULES],
        gyro: Option<Box<dyn Gyro>>,
        clock: Box<dyn Clock>,
    ) -> Result<Self, ChassisError> {
        params.geometry.validate()?;

        let kinematics = SwerveKinematics::new(&params.geometry)?;
        let modules = build_modules(hardware, &params.module, params.geometry.wheel_diameter_m)?;
        let gyro = gyro.ok_or(ChassisError::MissingGyro)?;

        // Stationary and the default heading are always available, the chassis must be able to
        // stop.
        let mut drive_states = HashMap::new();
        for mode in std::iter::once(&DriveMode::Stationary).chain(params.drive_modes.iter()) {
            drive_states
                .entry(*mode)
                .or_insert_with(|| DriveModeState::new(*mode, &params.trajectory));
        }

        let mut orientations = HashMap::new();
        for option in std::iter::once(&HeadingOption::Default).chain(params.heading_options.iter())
        {
            orientations
                .entry(*option)
                .or_insert_with(|| OrientationPolicy::for_option(*option, &params.orientation));
        }

        let estimator = PoseEstimator::new(kinematics.clone(), &params.estimator);

        let mut chassis = Self {
            geometry: params.geometry,
            kinematics,
            modules,
            gyro,
            estimator,
            drive_states,
            orientations,
            orientation_params: params.orientation,
            current_mode: DriveMode::Stationary,
            clock,
            last_targets: [WheelTarget::default(); NUM_MODULES],
            desaturated: false,
        };

        chassis.zero_align_all_modules();
        chassis.reset_pose(Pose2D::default());

        let time_s = chassis.clock.now_s();
        if let Some(s) = chassis.drive_states.get_mut(&DriveMode::Stationary) {
            s.init(time_s);
        }

        info!(
            "Swerve chassis initialised with drive modes {:?} and heading options {:?}",
            chassis.drive_states.keys().collect::<Vec<_>>(),
            chassis.orientations.keys().collect::<Vec<_>>()
        );

        Ok(chassis)
    }

    /// Run one control cycle of the active drive mode.
    pub fn drive(&mut self) {
        let pose = self.estimator.pose();
        let time_s = self.clock.now_s();

        let mut module_angles_deg = [0f64; NUM_MODULES];
        for (a, m) in module_angles_deg.iter_mut().zip(self.modules.iter()) {
            *a = m.state().angle_deg;
        }

        let state = match self.drive_states.get_mut(&self.current_mode) {
            Some(s) => s,
            None => {
                warn!(
                    "{}",
                    ChassisError::InvariantViolation(format!(
                        "active drive mode {} has no state",
                        self.current_mode
                    ))
                );
                return;
            }
        };

        let heading_option = state.heading_option();
        let orientation = match self.orientations.get_mut(&heading_option) {
            Some(o) => o,
            None => {
                warn!("{}", ChassisError::UnsupportedHeadingOption(heading_option));
                return;
            }
        };

        // While the driver is turning the maintained heading follows the chassis
        let requested_omega_rads = state.motion_intent().chassis_speeds.omega_rads;
        if let OrientationPolicy::MaintainLastHeading { .. } = orientation {
            if requested_omega_rads.abs() >= self.orientation_params.rotation_deadband_rads {
                orientation.set_stored_heading(pose.heading_deg);
            }
        }

        // A point of interest given with the intent overrides the configured landmark
        if let Some(point) = state.motion_intent().target_point {
            if matches!(orientation, OrientationPolicy::TrackLandmark { .. }) {
                orientation.set_landmark(point);
            }
        }

        let ctx = DriveContext {
            pose,
            time_s,
            module_angles_deg,
            kinematics: &self.kinematics,
            geometry: &self.geometry,
            orientation: *orientation,
            orientation_params: &self.orientation_params,
        };

        let mut targets = state.calc_wheel_targets(&ctx);

        self.desaturated = SwerveKinematics::desaturate(&mut targets, self.geometry.max_speed_ms);
        if self.desaturated {
            debug!("Wheel speeds desaturated");
        }

        for (module, target) in self.modules.iter_mut().zip(targets.iter()) {
            module.set_desired_state(target);
        }

        self.last_targets = targets;
    }

    /// Switch to the given drive mode, then drive.
    ///
    /// Switching to a mode that isn't enabled keeps the current mode.
    pub fn drive_mode(&mut self, mode: DriveMode) {
        if mode != self.current_mode {
            let time_s = self.clock.now_s();
            match self.drive_states.get_mut(&mode) {
                Some(s) => {
                    info!("Drive mode {} -> {}", self.current_mode, mode);
                    s.init(time_s);
                    self.current_mode = mode;
                }
                None => warn!("{}", ChassisError::UnsupportedDriveMode(mode)),
            }
        }

        self.drive();
    }

    /// Load a motion intent and heading option into the state for the given mode.
    ///
    /// Does not change the active mode.
    pub fn set_motion_intent(
        &mut self,
        mode: DriveMode,
        heading_option: HeadingOption,
        intent: MotionIntent,
    ) {
        let state = match self.drive_states.get_mut(&mode) {
            Some(s) => s,
            None => {
                warn!("{}", ChassisError::UnsupportedDriveMode(mode));
                return;
            }
        };

        state.set_motion_intent(intent);

        if state.heading_option() != heading_option {
            if self.orientations.contains_key(&heading_option) {
                info!(
                    "{} heading option {} -> {}",
                    mode,
                    state.heading_option(),
                    heading_option
                );
                state.set_heading_option(heading_option);
            } else {
                warn!("{}", ChassisError::UnsupportedHeadingOption(heading_option));
            }
        }
    }

    /// Refresh the modules and update the pose estimate.
    pub fn update_odometry(&mut self) -> Pose2D {
        for module in self.modules.iter_mut() {
            module.refresh();
        }

        self.estimator.update(&self.modules, self.gyro.as_ref())
    }

    pub fn pose(&self) -> Pose2D {
        self.estimator.pose()
    }

    /// Reset the pose, keeping the pose's own heading.
    pub fn reset_pose(&mut self, pose: Pose2D) {
        self.reset_pose_with_heading(pose, pose.heading_deg);
    }

    /// Reset the pose to the given position and heading.
    pub fn reset_pose_with_heading(&mut self, pose: Pose2D, heading_deg: f64) {
        self.estimator
            .reset_pose(pose, heading_deg, &mut self.modules, self.gyro.as_mut());
    }

    /// Zero align every module against its absolute encoder.
    ///
    /// Returns false if any module could not be aligned, that module keeps ignoring demands.
    pub fn zero_align_all_modules(&mut self) -> bool {
        let mut all_aligned = true;

        for module in self.modules.iter_mut() {
            if let Err(e) = module.zero_align() {
                warn!("Could not zero align the {:?} module: {}", module.id(), e);
                all_aligned = false;
            }
        }

        all_aligned
    }

    /// Zero the drive distance of every module.
    pub fn zero_all_encoders(&mut self) {
        for module in self.modules.iter_mut() {
            module.set_encoders_to_zero();
        }
    }

    /// Declare the chassis to be facing `heading_deg`.
    ///
    /// Keeps the estimated position, re-zeroes the gyro, re-aligns the modules and makes the new
    /// heading the one held by the maintain heading option.
    pub fn rezero_heading(&mut self, heading_deg: f64) {
        let pose = self.pose();
        self.reset_pose_with_heading(pose, heading_deg);
        self.zero_align_all_modules();

        if let Some(o) = self.orientation_mut(HeadingOption::Maintain) {
            o.set_stored_heading(heading_deg);
        }

        info!("Heading re-zeroed to {:.2} deg", heading_deg);
    }

    /// Fuse an externally measured pose into the estimate.
    pub fn add_vision_measurement(&mut self, measured: &Pose2D) {
        self.estimator.add_vision_measurement(measured);
    }

    pub fn orientation(&self, option: HeadingOption) -> Option<&OrientationPolicy> {
        self.orientations.get(&option)
    }

    pub fn orientation_mut(&mut self, option: HeadingOption) -> Option<&mut OrientationPolicy> {
        self.orientations.get_mut(&option)
    }

    pub fn drive_state(&self, mode: DriveMode) -> Option<&DriveModeState> {
        self.drive_states.get(&mode)
    }

    pub fn drive_state_mut(&mut self, mode: DriveMode) -> Option<&mut DriveModeState> {
        self.drive_states.get_mut(&mode)
    }

    pub fn current_drive_mode(&self) -> DriveMode {
        self.current_mode
    }

    /// Heading option bound to the active drive mode.
    pub fn current_heading_option(&self) -> HeadingOption {
        self.drive_states
            .get(&self.current_mode)
            .map(|s| s.heading_option())
            .unwrap_or_default()
    }

    pub fn modules(&self) -> &[WheelModule; NUM_MODULES] {
        &self.modules
    }

    pub fn geometry(&self) -> &ChassisGeometry {
        &self.geometry
    }

    pub fn kinematics(&self) -> &SwerveKinematics {
        &self.kinematics
    }

    /// Targets sent to the modules on the last drive.
    pub fn last_targets(&self) -> &[WheelTarget; NUM_MODULES] {
        &self.last_targets
    }

    /// Current time on the chassis clock.
    ///
    /// Units: seconds
    pub fn time_s(&self) -> f64 {
        self.clock.now_s()
    }

    /// Telemetry snapshot of the chassis.
    pub fn tm(&self) -> ChassisTm {
        let pose = self.pose();
        let [fl, fr, bl, br] = &self.modules;
        let [fl_t, fr_t, bl_t, br_t] = &self.last_targets;

        ChassisTm {
            time_s: self.time_s(),
            pose_x_m: pose.x_m,
            pose_y_m: pose.y_m,
            pose_heading_deg: pose.heading_deg,
            drive_mode: self.current_mode,
            heading_option: self.current_heading_option(),
            fl_angle_deg: fl_t.state.angle_deg,
            fr_angle_deg: fr_t.state.angle_deg,
            bl_angle_deg: bl_t.state.angle_deg,
            br_angle_deg: br_t.state.angle_deg,
            fl_speed_ms: fl_t.state.speed_ms,
            fr_speed_ms: fr_t.state.speed_ms,
            bl_speed_ms: bl_t.state.speed_ms,
            br_speed_ms: br_t.state.speed_ms,
            fl_stale: fl.is_stale(),
            fr_stale: fr.is_stale(),
            bl_stale: bl.is_stale(),
            br_stale: br.is_stale(),
            fl_fault_count: fl.fault_count(),
            fr_fault_count: fr.fault_count(),
            bl_fault_count: bl.fault_count(),
            br_fault_count: br.fault_count(),
            gyro_fault_count: self.estimator.gyro_fault_count(),
            desaturated: self.desaturated,
        }
    }
}

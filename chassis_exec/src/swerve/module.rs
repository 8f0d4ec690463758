//! # Wheel module
//!
//! One corner of the chassis: a drive motor turning the wheel, a steer motor rotating the wheel
//! about its vertical axis, and an absolute encoder reporting the steering angle at power-on.
//!
//! The steer motor's integrated sensor is relative, so the module must be zero aligned against the
//! absolute encoder before it will accept any demands.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};

// Internal
use super::{ChassisError, ModuleId, NUM_MODULES};
use chassis_if::eqpt::{AbsoluteEncoder, MotorController, SensorError};
use util::maths::{get_ang_dist_deg, wrap_deg};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Speed and steering angle of a wheel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WheelState {
    /// Forwards positive.
    ///
    /// Units: meters/second
    pub speed_ms: f64,

    /// Steering angle in the body frame, anticlockwise from the body X axis.
    ///
    /// Units: degrees
    pub angle_deg: f64,
}

/// Demand for one wheel module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WheelTarget {
    pub state: WheelState,

    /// Steer to the target angle even if the speed is below the at-rest threshold.
    pub hold_angle: bool,
}

/// Latest sample of a module's sensors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WheelMeasurement {
    /// Distance driven since the encoders were last zeroed.
    ///
    /// Units: meters
    pub distance_m: f64,

    /// Units: degrees
    pub angle_deg: f64,

    /// Units: meters/second
    pub speed_ms: f64,
}

/// Distance and angle of a wheel, as used by odometry.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WheelPosition {
    /// Units: meters
    pub distance_m: f64,

    /// Units: degrees
    pub angle_deg: f64,
}

/// Constants of the module hardware, shared by all four modules.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ModuleParams {
    /// Motor rotations per wheel rotation.
    pub drive_gear_ratio: f64,

    /// Steer motor rotations per full rotation of the wheel about its vertical axis.
    pub steer_gear_ratio: f64,

    /// Reading of each absolute encoder when its wheel points straight forwards, in module order.
    ///
    /// Units: degrees
    pub abs_encoder_offsets_deg: [f64; NUM_MODULES],

    /// Speed below which a wheel is considered at rest and its steering is frozen.
    ///
    /// Units: meters/second
    pub min_speed_ms: f64,
}

/// The devices making up a module. Handles are optional so that a module with missing hardware
/// can be reported as a configuration error rather than a crash.
#[derive(Default)]
pub struct ModuleHardware {
    pub drive: Option<Box<dyn MotorController>>,
    pub steer: Option<Box<dyn MotorController>>,
    pub encoder: Option<Box<dyn AbsoluteEncoder>>,
}

/// A single swerve wheel module.
pub struct WheelModule {
    id: ModuleId,

    drive: Box<dyn MotorController>,
    steer: Box<dyn MotorController>,
    encoder: Box<dyn AbsoluteEncoder>,

    drive_gear_ratio: f64,
    steer_gear_ratio: f64,
    abs_encoder_offset_deg: f64,
    min_speed_ms: f64,
    wheel_circumference_m: f64,

    /// Steer motor position at which the wheel points forwards, `None` until zero aligned.
    ///
    /// Units: rotations
    steer_zero_rot: Option<f64>,

    /// Steering angle without wrapping, used to compute the shortest steer command.
    ///
    /// Units: degrees
    continuous_angle_deg: f64,

    measurement: WheelMeasurement,

    last_target: WheelState,

    stale: bool,
    fault_count: u32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl WheelModule {
    /// Build a module from its hardware.
    pub fn new(
        id: ModuleId,
        hardware: ModuleHardware,
        params: &ModuleParams,
        wheel_diameter_m: f64,
    ) -> Result<Self, ChassisError> {
        let drive = hardware
            .drive
            .ok_or(ChassisError::MissingDevice(id, "drive motor"))?;
        let steer = hardware
            .steer
            .ok_or(ChassisError::MissingDevice(id, "steer motor"))?;
        let encoder = hardware
            .encoder
            .ok_or(ChassisError::MissingDevice(id, "absolute encoder"))?;

        Ok(Self {
            id,
            drive,
            steer,
            encoder,
            drive_gear_ratio: params.drive_gear_ratio,
            steer_gear_ratio: params.steer_gear_ratio,
            abs_encoder_offset_deg: params.abs_encoder_offsets_deg[id.index()],
            min_speed_ms: params.min_speed_ms,
            wheel_circumference_m: std::f64::consts::PI * wheel_diameter_m,
            steer_zero_rot: None,
            continuous_angle_deg: 0.0,
            measurement: WheelMeasurement::default(),
            last_target: WheelState::default(),
            stale: false,
            fault_count: 0,
        })
    }

    pub fn id(&self) -> ModuleId {
        self.id
    }

    /// Align the steer motor's relative sensor with the absolute encoder.
    ///
    /// Must be called before the module will accept demands.
    pub fn zero_align(&mut self) -> Result<(), SensorError> {
        let abs_deg = self.read(|m| m.encoder.abs_angle_deg())?;
        let steer_rot = self.read(|m| m.steer.rotations())?;

        let angle_deg = wrap_deg(abs_deg - self.abs_encoder_offset_deg);

        self.steer_zero_rot = Some(steer_rot - angle_deg / 360.0 * self.steer_gear_ratio);
        self.continuous_angle_deg = angle_deg;
        self.measurement.angle_deg = angle_deg;

        info!("{:?} module aligned at {:.2} deg", self.id, angle_deg);

        Ok(())
    }

    pub fn is_aligned(&self) -> bool {
        self.steer_zero_rot.is_some()
    }

    /// Read all sensors once.
    ///
    /// If any read fails the previous measurement is kept and the module is marked stale until
    /// the next successful refresh.
    pub fn refresh(&mut self) {
        let drive_rot = self.read(|m| m.drive.rotations());
        let drive_rps = self.read(|m| m.drive.rps());
        let steer_rot = self.read(|m| m.steer.rotations());

        match (drive_rot, drive_rps, steer_rot) {
            (Ok(drive_rot), Ok(drive_rps), Ok(steer_rot)) => {
                self.stale = false;

                self.measurement.distance_m = self.motor_to_wheel_m(drive_rot);
                self.measurement.speed_ms = self.motor_to_wheel_m(drive_rps);

                if let Some(zero) = self.steer_zero_rot {
                    self.continuous_angle_deg = (steer_rot - zero) / self.steer_gear_ratio * 360.0;
                    self.measurement.angle_deg = wrap_deg(self.continuous_angle_deg);
                }

                trace!("{:?} module: {:?}", self.id, self.measurement);
            }
            _ => {
                // Failures have already been counted and logged by `read`
                self.stale = true;
            }
        }
    }

    /// Command the module to the given target.
    ///
    /// The wheel is never steered through more than 90 degrees: if the target angle is further
    /// away than that the wheel is steered to the opposite angle and driven backwards.
    pub fn set_desired_state(&mut self, target: &WheelTarget) {
        let zero = match self.steer_zero_rot {
            Some(z) => z,
            None => {
                warn!(
                    "{:?} module is not aligned, ignoring demand {:?}",
                    self.id, target.state
                );
                return;
            }
        };

        let current_deg = self.continuous_angle_deg;
        let mut speed_ms = target.state.speed_ms;
        let mut delta_deg = get_ang_dist_deg(current_deg, target.state.angle_deg);

        if delta_deg.abs() > 90.0 {
            speed_ms = -speed_ms;
            delta_deg = get_ang_dist_deg(current_deg, target.state.angle_deg + 180.0);
        }

        // At rest hold the current angle so the wheels don't flick back to zero between demands
        if speed_ms.abs() < self.min_speed_ms && !target.hold_angle {
            speed_ms = 0.0;
            delta_deg = 0.0;
        }

        let steer_deg = current_deg + delta_deg;

        self.drive
            .set_velocity_target(speed_ms / self.wheel_circumference_m * self.drive_gear_ratio);
        self.steer
            .set_position_target(zero + steer_deg / 360.0 * self.steer_gear_ratio);

        self.last_target = WheelState {
            speed_ms,
            angle_deg: wrap_deg(steer_deg),
        };

        trace!("{:?} module demand: {:?}", self.id, self.last_target);
    }

    /// Latest measured speed and angle.
    pub fn state(&self) -> WheelState {
        WheelState {
            speed_ms: self.measurement.speed_ms,
            angle_deg: self.measurement.angle_deg,
        }
    }

    /// Latest measured distance and angle.
    pub fn position(&self) -> WheelPosition {
        WheelPosition {
            distance_m: self.measurement.distance_m,
            angle_deg: self.measurement.angle_deg,
        }
    }

    pub fn measurement(&self) -> &WheelMeasurement {
        &self.measurement
    }

    /// The demand actually sent on the last call to `set_desired_state`, after optimisation.
    pub fn last_target(&self) -> WheelState {
        self.last_target
    }

    /// Reset the drive distance to zero.
    pub fn set_encoders_to_zero(&mut self) {
        self.drive.set_rotations(0.0);
        self.measurement.distance_m = 0.0;
        debug!("{:?} module drive distance zeroed", self.id);
    }

    /// True if the last sensor refresh failed.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Number of failed sensor reads since the module was built.
    pub fn fault_count(&self) -> u32 {
        self.fault_count
    }

    /// Perform a sensor read, counting and logging any failure.
    fn read<F>(&mut self, f: F) -> Result<f64, SensorError>
    where
        F: Fn(&Self) -> Result<f64, SensorError>,
    {
        let r = f(&*self);
        if let Err(e) = r {
            self.fault_count = self.fault_count.saturating_add(1);
            warn!("{:?} module sensor read failed: {}", self.id, e);
        }
        r
    }

    /// Convert drive motor rotations into wheel travel.
    fn motor_to_wheel_m(&self, motor_rot: f64) -> f64 {
        motor_rot / self.drive_gear_ratio * self.wheel_circumference_m
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Build all four modules from their hardware, given in module order.
pub fn build_modules(
    hardware: [ModuleHardware; NUM_MODULES],
    params: &ModuleParams,
    wheel_diameter_m: f64,
) -> Result<[WheelModule; NUM_MODULES], ChassisError> {
    let [fl, fr, bl, br] = hardware;

    Ok([
        WheelModule::new(ModuleId::FrontLeft, fl, params, wheel_diameter_m)?,
        WheelModule::new(ModuleId::FrontRight, fr, params, wheel_diameter_m)?,
        WheelModule::new(ModuleId::BackLeft, bl, params, wheel_diameter_m)?,
        WheelModule::new(ModuleId::BackRight, br, params, wheel_diameter_m)?,
    ])
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sim::SimModule;
    use approx::assert_relative_eq;

    fn params() -> ModuleParams {
        ModuleParams {
            drive_gear_ratio: 6.75,
            steer_gear_ratio: 12.8,
            abs_encoder_offsets_deg: [10.0, 20.0, 30.0, 40.0],
            min_speed_ms: 0.01,
        }
    }

    /// Build an aligned front left module whose wheel physically points at `angle_deg`.
    fn aligned_module(angle_deg: f64) -> (WheelModule, SimModule) {
        let sim = SimModule::new(angle_deg, 10.0);
        let mut module =
            WheelModule::new(ModuleId::FrontLeft, sim.hardware(), &params(), 0.1).unwrap();
        module.zero_align().unwrap();
        module.refresh();
        (module, sim)
    }

    #[test]
    fn test_missing_device() {
        let sim = SimModule::new(0.0, 0.0);
        let mut hw = sim.hardware();
        hw.encoder = None;

        assert!(matches!(
            WheelModule::new(ModuleId::BackRight, hw, &params(), 0.1),
            Err(ChassisError::MissingDevice(ModuleId::BackRight, "absolute encoder"))
        ));
    }

    #[test]
    fn test_zero_align() {
        let (module, _) = aligned_module(35.0);
        assert!(module.is_aligned());
        assert_relative_eq!(module.state().angle_deg, 35.0, epsilon = 1e-9);
    }

    #[test]
    fn test_unaligned_module_ignores_demands() {
        let sim = SimModule::new(0.0, 10.0);
        let mut module =
            WheelModule::new(ModuleId::FrontLeft, sim.hardware(), &params(), 0.1).unwrap();

        module.set_desired_state(&WheelTarget {
            state: WheelState {
                speed_ms: 1.0,
                angle_deg: 45.0,
            },
            hold_angle: false,
        });

        assert_eq!(sim.drive.velocity_target(), None);
        assert_eq!(sim.steer.position_target(), None);
    }

    #[test]
    fn test_no_flip_within_90() {
        let (mut module, sim) = aligned_module(0.0);
        let steer_zero = sim.steer.rotations_now();

        module.set_desired_state(&WheelTarget {
            state: WheelState {
                speed_ms: 1.0,
                angle_deg: 60.0,
            },
            hold_angle: false,
        });

        assert_relative_eq!(module.last_target().speed_ms, 1.0);
        assert_relative_eq!(module.last_target().angle_deg, 60.0, epsilon = 1e-9);

        // 60 degrees of steering through the steer gearing
        assert_relative_eq!(
            sim.steer.position_target().unwrap() - steer_zero,
            60.0 / 360.0 * 12.8,
            epsilon = 1e-9
        );

        // 1 m/s through a 0.1 m wheel and the drive gearing
        assert_relative_eq!(
            sim.drive.velocity_target().unwrap(),
            1.0 / (std::f64::consts::PI * 0.1) * 6.75,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_flip_beyond_90() {
        let (mut module, sim) = aligned_module(0.0);
        let steer_zero = sim.steer.rotations_now();

        module.set_desired_state(&WheelTarget {
            state: WheelState {
                speed_ms: 2.0,
                angle_deg: 170.0,
            },
            hold_angle: false,
        });

        // Drive backwards at -10 degrees rather than steering through 170
        assert_relative_eq!(module.last_target().speed_ms, -2.0);
        assert_relative_eq!(module.last_target().angle_deg, -10.0, epsilon = 1e-9);
        let travel_deg = (sim.steer.position_target().unwrap() - steer_zero) / 12.8 * 360.0;
        assert!(travel_deg.abs() <= 90.0);
        assert_relative_eq!(travel_deg, -10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_continuous_steer_across_wrap() {
        // Wheel at 170, target -170 is 20 degrees away anticlockwise
        let (mut module, sim) = aligned_module(170.0);
        let start_rot = sim.steer.rotations_now();

        let target = WheelTarget {
            state: WheelState {
                speed_ms: 1.0,
                angle_deg: -170.0,
            },
            hold_angle: false,
        };
        module.set_desired_state(&target);
        let first = sim.steer.position_target().unwrap();

        assert_relative_eq!(module.last_target().speed_ms, 1.0);
        assert_relative_eq!((first - start_rot) / 12.8 * 360.0, 20.0, epsilon = 1e-9);

        // Identical calls give identical commands
        module.set_desired_state(&target);
        assert_eq!(sim.steer.position_target().unwrap(), first);
    }

    #[test]
    fn test_at_rest_freezes_angle() {
        let (mut module, sim) = aligned_module(30.0);
        let start_rot = sim.steer.rotations_now();

        module.set_desired_state(&WheelTarget {
            state: WheelState {
                speed_ms: 0.0,
                angle_deg: 0.0,
            },
            hold_angle: false,
        });

        assert_eq!(sim.drive.velocity_target(), Some(0.0));
        assert_relative_eq!(sim.steer.position_target().unwrap(), start_rot, epsilon = 1e-12);
        assert_relative_eq!(module.last_target().angle_deg, 30.0, epsilon = 1e-9);

        // Unless the angle must be held
        module.set_desired_state(&WheelTarget {
            state: WheelState {
                speed_ms: 0.0,
                angle_deg: -45.0,
            },
            hold_angle: true,
        });
        assert_relative_eq!(module.last_target().angle_deg, -45.0, epsilon = 1e-9);
    }

    #[test]
    fn test_distance_and_zeroing() {
        let (mut module, sim) = aligned_module(0.0);

        // Two wheel rotations
        sim.drive.set_rotations_now(2.0 * 6.75);
        module.refresh();
        assert_relative_eq!(
            module.position().distance_m,
            2.0 * std::f64::consts::PI * 0.1,
            epsilon = 1e-12
        );

        module.set_encoders_to_zero();
        assert_eq!(module.position().distance_m, 0.0);
        module.refresh();
        assert_eq!(module.position().distance_m, 0.0);
    }

    #[test]
    fn test_sensor_fault_keeps_last_value() {
        let (mut module, sim) = aligned_module(0.0);

        sim.drive.set_rotations_now(6.75);
        module.refresh();
        let good = *module.measurement();

        sim.drive.set_fault(Some(SensorError::NotResponding));
        sim.drive.set_rotations_now(100.0);
        module.refresh();

        assert!(module.is_stale());
        assert_eq!(module.fault_count(), 2);
        assert_eq!(*module.measurement(), good);

        sim.drive.set_fault(None);
        module.refresh();
        assert!(!module.is_stale());
        assert_eq!(module.fault_count(), 2);
    }
}

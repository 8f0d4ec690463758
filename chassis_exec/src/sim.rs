//! # Simulated chassis equipment
//!
//! Idealised stand-ins for the motor controllers, absolute encoders and gyro of a swerve chassis,
//! plus a [`SimChassis`] which ties them together and moves a ground truth pose according to the
//! wheel motion. Used by the executable when no real hardware is attached, and by the tests.
//!
//! Each device is a cheap handle onto shared state, so the simulation keeps a handle to every
//! device it hands to the chassis and can both read the demands and inject faults.
//!
//! Motors reach their demands instantly, but only when the world is stepped.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Standard
use std::{cell::RefCell, rc::Rc};

// External
use log::trace;

// Internal
use crate::loc::Pose2D;
use crate::swerve::{
    ChassisError, ChassisParams, ModuleHardware, SwerveKinematics, WheelPosition, NUM_MODULES,
};
use chassis_if::eqpt::{AbsoluteEncoder, Gyro, MotorController, SensorError};
use util::maths::wrap_deg;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct SimMotorState {
    rotations: f64,
    rps: f64,
    velocity_target: Option<f64>,
    position_target: Option<f64>,
    fault: Option<SensorError>,
}

/// A simulated motor controller.
#[derive(Debug, Clone, Default)]
pub struct SimMotor {
    state: Rc<RefCell<SimMotorState>>,
}

#[derive(Debug, Default)]
struct SimEncoderState {
    angle_deg: f64,
    fault: Option<SensorError>,
}

/// A simulated absolute encoder.
#[derive(Debug, Clone, Default)]
pub struct SimEncoder {
    state: Rc<RefCell<SimEncoderState>>,
}

#[derive(Debug, Default)]
struct SimGyroState {
    /// Yaw of the robot relative to its power on orientation.
    raw_yaw_deg: f64,
    offset_deg: f64,
    fault: Option<SensorError>,
}

/// A simulated yaw gyro.
#[derive(Debug, Clone, Default)]
pub struct SimGyro {
    state: Rc<RefCell<SimGyroState>>,
}

/// The devices of one simulated wheel module.
#[derive(Debug, Clone)]
pub struct SimModule {
    pub drive: SimMotor,
    pub steer: SimMotor,
    pub encoder: SimEncoder,

    /// Physical steering angle when the steer motor read zero rotations.
    ///
    /// Units: degrees
    initial_angle_deg: f64,

    /// Encoder reading when the wheel points forwards.
    ///
    /// Units: degrees
    encoder_offset_deg: f64,
}

/// A simulated four module chassis on a flat, grippy floor.
pub struct SimChassis {
    pub modules: [SimModule; NUM_MODULES],

    gyro: SimGyro,

    kinematics: SwerveKinematics,

    drive_gear_ratio: f64,
    steer_gear_ratio: f64,
    wheel_circumference_m: f64,

    truth_pose: Pose2D,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimMotor {
    /// The last velocity demand, if any.
    pub fn velocity_target(&self) -> Option<f64> {
        self.state.borrow().velocity_target
    }

    /// The last position demand, if any.
    pub fn position_target(&self) -> Option<f64> {
        self.state.borrow().position_target
    }

    /// True position of the motor, ignoring any fault.
    pub fn rotations_now(&self) -> f64 {
        self.state.borrow().rotations
    }

    pub fn set_rotations_now(&self, rotations: f64) {
        self.state.borrow_mut().rotations = rotations;
    }

    /// Make every read fail with the given error, or clear the fault with `None`.
    pub fn set_fault(&self, fault: Option<SensorError>) {
        self.state.borrow_mut().fault = fault;
    }

    /// Move the motor to its demand.
    fn step(&self, dt_s: f64) {
        let mut s = self.state.borrow_mut();

        if let Some(target) = s.position_target {
            s.rps = if dt_s > 0.0 {
                (target - s.rotations) / dt_s
            } else {
                0.0
            };
            s.rotations = target;
        } else if let Some(target) = s.velocity_target {
            s.rps = target;
            s.rotations += target * dt_s;
        }
    }

    fn read(&self, value: f64) -> Result<f64, SensorError> {
        match self.state.borrow().fault {
            Some(e) => Err(e),
            None => Ok(value),
        }
    }
}

impl MotorController for SimMotor {
    fn set_velocity_target(&mut self, rps: f64) {
        let mut s = self.state.borrow_mut();
        s.velocity_target = Some(rps);
        s.position_target = None;
    }

    fn set_position_target(&mut self, rotations: f64) {
        let mut s = self.state.borrow_mut();
        s.position_target = Some(rotations);
        s.velocity_target = None;
    }

    fn rotations(&self) -> Result<f64, SensorError> {
        self.read(self.rotations_now())
    }

    fn rps(&self) -> Result<f64, SensorError> {
        let rps = self.state.borrow().rps;
        self.read(rps)
    }

    fn set_rotations(&mut self, rotations: f64) {
        self.set_rotations_now(rotations);
    }
}

impl SimEncoder {
    pub fn set_fault(&self, fault: Option<SensorError>) {
        self.state.borrow_mut().fault = fault;
    }

    fn set_angle_deg(&self, angle_deg: f64) {
        self.state.borrow_mut().angle_deg = angle_deg.rem_euclid(360.0);
    }
}

impl AbsoluteEncoder for SimEncoder {
    fn abs_angle_deg(&self) -> Result<f64, SensorError> {
        let s = self.state.borrow();
        match s.fault {
            Some(e) => Err(e),
            None => Ok(s.angle_deg),
        }
    }
}

impl SimGyro {
    pub fn set_fault(&self, fault: Option<SensorError>) {
        self.state.borrow_mut().fault = fault;
    }

    fn rotate(&self, d_yaw_deg: f64) {
        self.state.borrow_mut().raw_yaw_deg += d_yaw_deg;
    }
}

impl Gyro for SimGyro {
    fn yaw_deg(&self) -> Result<f64, SensorError> {
        let s = self.state.borrow();
        match s.fault {
            Some(e) => Err(e),
            None => Ok(wrap_deg(s.raw_yaw_deg + s.offset_deg)),
        }
    }

    fn re_zero(&mut self, offset_deg: f64) {
        let mut s = self.state.borrow_mut();
        s.offset_deg = offset_deg - s.raw_yaw_deg;
    }
}

impl SimModule {
    /// Create a module whose wheel physically points at `physical_angle_deg`, with an absolute
    /// encoder reading `encoder_offset_deg` when the wheel points forwards.
    pub fn new(physical_angle_deg: f64, encoder_offset_deg: f64) -> Self {
        let module = Self {
            drive: SimMotor::default(),
            steer: SimMotor::default(),
            encoder: SimEncoder::default(),
            initial_angle_deg: physical_angle_deg,
            encoder_offset_deg,
        };
        module
            .encoder
            .set_angle_deg(physical_angle_deg + encoder_offset_deg);
        module
    }

    /// Handles onto this module's devices, to be given to a [`crate::swerve::WheelModule`].
    pub fn hardware(&self) -> ModuleHardware {
        ModuleHardware {
            drive: Some(Box::new(self.drive.clone())),
            steer: Some(Box::new(self.steer.clone())),
            encoder: Some(Box::new(self.encoder.clone())),
        }
    }

    /// True steering angle of the wheel.
    pub fn physical_angle_deg(&self, steer_gear_ratio: f64) -> f64 {
        wrap_deg(self.initial_angle_deg + self.steer.rotations_now() / steer_gear_ratio * 360.0)
    }
}

impl SimChassis {
    /// Create a chassis at the origin with the wheels physically pointing at the given angles.
    pub fn new(
        params: &ChassisParams,
        initial_angles_deg: [f64; NUM_MODULES],
    ) -> Result<Self, ChassisError> {
        let kinematics = SwerveKinematics::new(&params.geometry)?;
        let offsets = params.module.abs_encoder_offsets_deg;

        Ok(Self {
            modules: [
                SimModule::new(initial_angles_deg[0], offsets[0]),
                SimModule::new(initial_angles_deg[1], offsets[1]),
                SimModule::new(initial_angles_deg[2], offsets[2]),
                SimModule::new(initial_angles_deg[3], offsets[3]),
            ],
            gyro: SimGyro::default(),
            kinematics,
            drive_gear_ratio: params.module.drive_gear_ratio,
            steer_gear_ratio: params.module.steer_gear_ratio,
            wheel_circumference_m: params.geometry.wheel_circumference_m(),
            truth_pose: Pose2D::default(),
        })
    }

    /// Handles onto every module's devices, in module order.
    pub fn hardware(&self) -> [ModuleHardware; NUM_MODULES] {
        [
            self.modules[0].hardware(),
            self.modules[1].hardware(),
            self.modules[2].hardware(),
            self.modules[3].hardware(),
        ]
    }

    /// A handle onto the gyro, to be given to the chassis.
    pub fn gyro_handle(&self) -> Box<dyn Gyro> {
        Box::new(self.gyro.clone())
    }

    /// The simulation's own handle onto the gyro, for fault injection.
    pub fn gyro(&self) -> &SimGyro {
        &self.gyro
    }

    pub fn kinematics(&self) -> &SwerveKinematics {
        &self.kinematics
    }

    /// Where the chassis really is.
    pub fn truth_pose(&self) -> Pose2D {
        self.truth_pose
    }

    /// Advance the world by `dt_s` seconds.
    pub fn step(&mut self, dt_s: f64) {
        let mut deltas = [WheelPosition::default(); NUM_MODULES];

        for (module, delta) in self.modules.iter().zip(deltas.iter_mut()) {
            // Steer first so the wheel drives along its new heading
            module.steer.step(dt_s);
            let angle_deg = module.physical_angle_deg(self.steer_gear_ratio);
            module
                .encoder
                .set_angle_deg(angle_deg + module.encoder_offset_deg);

            let start_rot = module.drive.rotations_now();
            module.drive.step(dt_s);
            let travel_rot = module.drive.rotations_now() - start_rot;

            *delta = WheelPosition {
                distance_m: travel_rot / self.drive_gear_ratio * self.wheel_circumference_m,
                angle_deg,
            };
        }

        let twist = self.kinematics.to_twist(&deltas);
        self.truth_pose = self.truth_pose.exp(&twist);
        self.gyro.rotate(twist.dtheta_rad.to_degrees());

        trace!("Sim truth pose: {:?}", self.truth_pose);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gyro_re_zero() {
        let mut gyro = SimGyro::default();
        gyro.rotate(50.0);
        assert_relative_eq!(gyro.yaw_deg().unwrap(), 50.0);

        gyro.re_zero(-90.0);
        assert_relative_eq!(gyro.yaw_deg().unwrap(), -90.0, epsilon = 1e-12);

        gyro.rotate(10.0);
        assert_relative_eq!(gyro.yaw_deg().unwrap(), -80.0, epsilon = 1e-12);

        gyro.set_fault(Some(SensorError::Stale));
        assert_eq!(gyro.yaw_deg(), Err(SensorError::Stale));
    }

    #[test]
    fn test_module_encoder() {
        let sim = SimModule::new(-30.0, 100.0);
        assert_relative_eq!(sim.encoder.abs_angle_deg().unwrap(), 70.0, epsilon = 1e-12);

        // A quarter turn of the wheel
        let mut steer = sim.steer.clone();
        steer.set_position_target(12.8 / 4.0);
        sim.steer.step(0.02);
        assert_relative_eq!(sim.physical_angle_deg(12.8), 60.0, epsilon = 1e-9);
    }

    #[test]
    fn test_motor_velocity() {
        let mut motor = SimMotor::default();
        motor.set_velocity_target(5.0);
        assert_eq!(motor.rotations(), Ok(0.0));

        motor.step(0.1);
        assert_relative_eq!(motor.rotations().unwrap(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(motor.rps().unwrap(), 5.0);
    }
}

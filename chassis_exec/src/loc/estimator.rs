//! # Pose estimator
//!
//! Dead-reckons the chassis pose from the wheel modules and corrects the heading against the
//! gyro. The wheels give good short term translation but drift in heading, particularly when the
//! wheels slip while turning; the gyro gives a good absolute heading.
//!
//! The correction uses a fixed gain rather than a full Kalman filter: with constant process
//! variance `q` and measurement variance `r` the steady state gain is `q / (q + sqrt(q r))`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace, warn};
use serde::Deserialize;

// Internal
use super::Pose2D;
use crate::swerve::{SwerveKinematics, WheelModule, WheelPosition, NUM_MODULES};
use chassis_if::eqpt::Gyro;
use util::maths::get_ang_dist_deg;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Trust weights of the estimator, as standard deviations.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PoseEstimatorParams {
    /// Uncertainty of the odometry prediction in x, y and heading.
    ///
    /// Units: meters, meters, radians
    pub state_std_devs: [f64; 3],

    /// Uncertainty of the gyro heading.
    ///
    /// Units: radians
    pub gyro_std_dev: f64,

    /// Uncertainty of external pose measurements in x, y and heading.
    ///
    /// Units: meters, meters, radians
    pub vision_std_devs: [f64; 3],
}

/// Fuses wheel odometry and the gyro into a pose.
///
/// The estimator doesn't own the modules or the gyro, they're borrowed for each update.
#[derive(Debug, Clone)]
pub struct PoseEstimator {
    kinematics: SwerveKinematics,

    pose: Pose2D,

    /// Wheel distances at the last update.
    ///
    /// Units: meters
    prev_distances_m: [f64; NUM_MODULES],

    heading_gain: f64,

    vision_gains: [f64; 3],

    gyro_fault_count: u32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PoseEstimator {
    pub fn new(kinematics: SwerveKinematics, params: &PoseEstimatorParams) -> Self {
        let mut vision_gains = [0f64; 3];
        for (i, g) in vision_gains.iter_mut().enumerate() {
            *g = fixed_gain(params.state_std_devs[i], params.vision_std_devs[i]);
        }

        Self {
            kinematics,
            pose: Pose2D::default(),
            prev_distances_m: [0f64; NUM_MODULES],
            heading_gain: fixed_gain(params.state_std_devs[2], params.gyro_std_dev),
            vision_gains,
            gyro_fault_count: 0,
        }
    }

    /// Latest pose estimate.
    pub fn pose(&self) -> Pose2D {
        self.pose
    }

    /// Number of failed gyro reads since the estimator was built.
    pub fn gyro_fault_count(&self) -> u32 {
        self.gyro_fault_count
    }

    /// Advance the estimate using the latest module measurements and gyro reading.
    ///
    /// The modules must already have been refreshed this cycle.
    pub fn update(&mut self, modules: &[WheelModule; NUM_MODULES], gyro: &dyn Gyro) -> Pose2D {
        // Distance travelled by each wheel since the last update
        let mut deltas = [WheelPosition::default(); NUM_MODULES];
        for (i, module) in modules.iter().enumerate() {
            let pos = module.position();
            deltas[i] = WheelPosition {
                distance_m: pos.distance_m - self.prev_distances_m[i],
                angle_deg: pos.angle_deg,
            };
            self.prev_distances_m[i] = pos.distance_m;
        }

        let mut twist = self.kinematics.to_twist(&deltas);

        // Correct the predicted heading against the gyro
        let predicted_deg = self.pose.heading_deg + twist.dtheta_rad.to_degrees();
        let fused_deg = match gyro.yaw_deg() {
            Ok(yaw_deg) => {
                predicted_deg + self.heading_gain * get_ang_dist_deg(predicted_deg, yaw_deg)
            }
            Err(e) => {
                self.gyro_fault_count = self.gyro_fault_count.saturating_add(1);
                warn!("Gyro read failed, using wheel odometry only: {}", e);
                predicted_deg
            }
        };
        twist.dtheta_rad = (fused_deg - self.pose.heading_deg).to_radians();

        self.pose = self.pose.exp(&twist);

        trace!("Pose estimate: {:?}", self.pose);

        self.pose
    }

    /// Overwrite the estimate with the given position and heading.
    ///
    /// The wheel distances are zeroed and the gyro is re-zeroed so that its current reading is
    /// `heading_deg`, so the next update continues smoothly from the new pose.
    pub fn reset_pose(
        &mut self,
        pose: Pose2D,
        heading_deg: f64,
        modules: &mut [WheelModule; NUM_MODULES],
        gyro: &mut dyn Gyro,
    ) {
        let pose = Pose2D::new(pose.x_m, pose.y_m, heading_deg);

        for module in modules.iter_mut() {
            module.set_encoders_to_zero();
        }
        self.prev_distances_m = [0f64; NUM_MODULES];

        gyro.re_zero(pose.heading_deg);

        self.pose = pose;

        info!("Pose reset to {:?}", self.pose);
    }

    /// Pull the estimate towards an externally measured pose, such as one from a vision system.
    pub fn add_vision_measurement(&mut self, measured: &Pose2D) {
        let [k_x, k_y, k_h] = self.vision_gains;

        self.pose = Pose2D::new(
            self.pose.x_m + k_x * (measured.x_m - self.pose.x_m),
            self.pose.y_m + k_y * (measured.y_m - self.pose.y_m),
            self.pose.heading_deg
                + k_h * get_ang_dist_deg(self.pose.heading_deg, measured.heading_deg),
        );

        trace!("Pose after vision measurement: {:?}", self.pose);
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Steady state gain for a process with standard deviation `state_std` measured with standard
/// deviation `meas_std`.
fn fixed_gain(state_std: f64, meas_std: f64) -> f64 {
    let q = state_std * state_std;
    let r = meas_std * meas_std;

    if q <= 0.0 {
        return 0.0;
    }

    q / (q + (q * r).sqrt())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sim::SimChassis;
    use crate::swerve::params::test::shipped_params;
    use crate::swerve::{build_modules, ChassisSpeeds, WheelTarget};
    use approx::assert_relative_eq;
    use chassis_if::eqpt::SensorError;

    const DT_S: f64 = 0.02;

    struct Rig {
        sim: SimChassis,
        modules: [WheelModule; NUM_MODULES],
        gyro: Box<dyn Gyro>,
        estimator: PoseEstimator,
    }

    impl Rig {
        fn new() -> Self {
            let params = shipped_params();
            let sim = SimChassis::new(&params, [0.0; NUM_MODULES]).unwrap();
            let mut modules = build_modules(
                sim.hardware(),
                &params.module,
                params.geometry.wheel_diameter_m,
            )
            .unwrap();
            for m in modules.iter_mut() {
                m.zero_align().unwrap();
            }
            let mut gyro = sim.gyro_handle();

            let kinematics = SwerveKinematics::new(&params.geometry).unwrap();
            let mut estimator = PoseEstimator::new(kinematics, &params.estimator);
            estimator.reset_pose(Pose2D::default(), 0.0, &mut modules, gyro.as_mut());

            Self {
                sim,
                modules,
                gyro,
                estimator,
            }
        }

        /// Drive at the given body speeds for a number of cycles.
        fn drive(&mut self, speeds: ChassisSpeeds, cycles: usize) {
            let states = self.sim.kinematics().to_wheel_states(&speeds);
            for _ in 0..cycles {
                for (m, s) in self.modules.iter_mut().zip(states.iter()) {
                    m.set_desired_state(&WheelTarget {
                        state: *s,
                        hold_angle: false,
                    });
                }
                self.sim.step(DT_S);
                for m in self.modules.iter_mut() {
                    m.refresh();
                }
                self.estimator.update(&self.modules, self.gyro.as_ref());
            }
        }
    }

    #[test]
    fn test_fixed_gain() {
        assert_relative_eq!(fixed_gain(0.1, 0.05), 2.0 / 3.0, epsilon = 1e-12);
        assert_eq!(fixed_gain(0.1, 0.0), 1.0);
        assert_eq!(fixed_gain(0.0, 0.1), 0.0);
    }

    #[test]
    fn test_straight_line() {
        let mut rig = Rig::new();

        rig.drive(ChassisSpeeds::new(1.0, 0.0, 0.0), 50);

        let pose = rig.estimator.pose();
        assert_relative_eq!(pose.x_m, 1.0, epsilon = 1e-6);
        assert_relative_eq!(pose.y_m, 0.0, epsilon = 1e-6);
        assert_relative_eq!(pose.heading_deg, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rotation_in_place() {
        let mut rig = Rig::new();

        rig.drive(ChassisSpeeds::new(0.0, 0.0, 1.0), 50);

        let pose = rig.estimator.pose();
        assert_relative_eq!(pose.x_m, 0.0, epsilon = 1e-6);
        assert_relative_eq!(pose.y_m, 0.0, epsilon = 1e-6);
        assert_relative_eq!(pose.heading_deg, 1f64.to_degrees(), epsilon = 1e-6);
        assert_relative_eq!(
            pose.heading_deg,
            rig.sim.truth_pose().heading_deg,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_gyro_fault() {
        let mut rig = Rig::new();
        rig.sim.gyro().set_fault(Some(SensorError::NotResponding));

        rig.drive(ChassisSpeeds::new(0.5, 0.0, 0.0), 10);

        // Wheels alone still track a straight line
        assert_eq!(rig.estimator.gyro_fault_count(), 10);
        assert_relative_eq!(rig.estimator.pose().x_m, 0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_reset_pose() {
        let mut rig = Rig::new();
        rig.drive(ChassisSpeeds::new(1.0, 0.5, 0.2), 20);

        rig.estimator.reset_pose(
            Pose2D::new(5.0, 3.0, 0.0),
            30.0,
            &mut rig.modules,
            rig.gyro.as_mut(),
        );

        assert_eq!(
            rig.estimator.pose(),
            Pose2D {
                x_m: 5.0,
                y_m: 3.0,
                heading_deg: 30.0
            }
        );
        for m in rig.modules.iter() {
            assert_eq!(m.position().distance_m, 0.0);
        }
        assert_relative_eq!(rig.gyro.yaw_deg().unwrap(), 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_vision_measurement() {
        let mut rig = Rig::new();

        // Equal state and vision trust moves the estimate half way
        rig.estimator
            .add_vision_measurement(&Pose2D::new(1.0, -2.0, 20.0));

        let pose = rig.estimator.pose();
        assert_relative_eq!(pose.x_m, 0.5, epsilon = 1e-12);
        assert_relative_eq!(pose.y_m, -1.0, epsilon = 1e-12);
        assert_relative_eq!(pose.heading_deg, 10.0, epsilon = 1e-12);
    }
}

//! # Trajectory controllers module
//!
//! This module provides the feedback controllers used to follow a trajectory: a PID controller,
//! and the holonomic and Ramsete controllers built on it.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::{Deserialize, Serialize};

// Internal
use super::{ChassisSpeeds, TrajectoryState};
use crate::loc::Pose2D;
use util::maths::get_ang_dist_deg;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gains of a PID controller.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PidGains {
    pub k_p: f64,
    pub k_i: f64,
    pub k_d: f64,
}

/// Parameters for the trajectory controllers.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TrajectoryControllerParams {
    /// Field X position controller, meters in, meters/second out.
    pub x_gains: PidGains,

    /// Field Y position controller, meters in, meters/second out.
    pub y_gains: PidGains,

    /// Heading controller, radians in, radians/second out.
    pub heading_gains: PidGains,

    /// Ramsete convergence gain, larger values converge more aggressively.
    ///
    /// Units: radians^2/meters^2
    pub ramsete_b: f64,

    /// Ramsete damping ratio, between 0 and 1.
    pub ramsete_zeta: f64,
}

/// A PID controller
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    /// Time at which the previous error was passed in
    prev_time_s: Option<f64>,

    gains: PidGains,

    /// Previous error
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64,
}

/// Tracks a trajectory by correcting field X, field Y and heading independently. Only usable on
/// holonomic chassis, which swerve is.
#[derive(Debug, Clone)]
pub struct HolonomicController {
    x_ctrl: PidController,
    y_ctrl: PidController,
    heading_ctrl: PidController,
}

/// Nonlinear unicycle tracking controller. Ignores the chassis' ability to strafe.
#[derive(Debug, Clone, Copy)]
pub struct RamseteController {
    b: f64,
    zeta: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {
    /// Create a new controller with the given gains.
    pub fn new(gains: PidGains) -> Self {
        Self {
            gains,
            integral: 0f64,
            prev_time_s: None,
            prev_error: None,
        }
    }

    /// Clear the integral and the derivative history.
    pub fn reset(&mut self) {
        self.integral = 0f64;
        self.prev_time_s = None;
        self.prev_error = None;
    }

    /// Get the value of the controller for the given error at the given time.
    pub fn get(&mut self, error: f64, time_s: f64) -> f64 {
        // Calculate dt, there is none on the first call or if time hasn't moved on
        let dt = match self.prev_time_s {
            Some(t0) if time_s > t0 => Some(time_s - t0),
            _ => None,
        };

        // Accumulate the integral term.
        //
        // If there's no time difference then we don't accumulate the integral, adding the raw
        // error would produce a large spike compared to normal operation.
        self.integral += match dt {
            Some(t) => error * t,
            None => 0f64,
        };

        // Calculate the derivative, zero without a previous error or time difference for the
        // same reasons as for integral.
        let deriv = match (self.prev_error, dt) {
            (Some(e), Some(t)) => (error - e) / t,
            _ => 0f64,
        };

        let out = self.gains.k_p * error + self.gains.k_i * self.integral + self.gains.k_d * deriv;

        // Remember the previous error and time
        self.prev_error = Some(error);
        self.prev_time_s = Some(time_s);

        out
    }
}

impl HolonomicController {
    pub fn new(params: &TrajectoryControllerParams) -> Self {
        Self {
            x_ctrl: PidController::new(params.x_gains),
            y_ctrl: PidController::new(params.y_gains),
            heading_ctrl: PidController::new(params.heading_gains),
        }
    }

    pub fn reset(&mut self) {
        self.x_ctrl.reset();
        self.y_ctrl.reset();
        self.heading_ctrl.reset();
    }

    /// Compute the field frame chassis speeds that track the reference state.
    pub fn calculate(
        &mut self,
        pose: &Pose2D,
        reference: &TrajectoryState,
        time_s: f64,
    ) -> ChassisSpeeds {
        // Feedforward along the direction of travel
        let path_dir = reference.pose.forward();
        let vx_ff = reference.velocity_ms * path_dir[0];
        let vy_ff = reference.velocity_ms * path_dir[1];

        let x_fb = self.x_ctrl.get(reference.pose.x_m - pose.x_m, time_s);
        let y_fb = self.y_ctrl.get(reference.pose.y_m - pose.y_m, time_s);

        let heading_err_rad =
            get_ang_dist_deg(pose.heading_deg, reference.pose.heading_deg).to_radians();
        let omega = self.heading_ctrl.get(heading_err_rad, time_s);

        trace!(
            "Holonomic errors: x {:.3} m, y {:.3} m, heading {:.3} rad",
            reference.pose.x_m - pose.x_m,
            reference.pose.y_m - pose.y_m,
            heading_err_rad
        );

        ChassisSpeeds::new(vx_ff + x_fb, vy_ff + y_fb, omega)
    }
}

impl RamseteController {
    pub fn new(params: &TrajectoryControllerParams) -> Self {
        Self {
            b: params.ramsete_b,
            zeta: params.ramsete_zeta,
        }
    }

    /// Compute the body frame chassis speeds that track the reference state.
    pub fn calculate(&self, pose: &Pose2D, reference: &TrajectoryState) -> ChassisSpeeds {
        // Error in the body frame
        let (sin_h, cos_h) = pose.heading_rad().sin_cos();
        let dx = reference.pose.x_m - pose.x_m;
        let dy = reference.pose.y_m - pose.y_m;
        let e_x = dx * cos_h + dy * sin_h;
        let e_y = -dx * sin_h + dy * cos_h;
        let e_theta = get_ang_dist_deg(pose.heading_deg, reference.pose.heading_deg).to_radians();

        let v_ref = reference.velocity_ms;
        let omega_ref = reference.velocity_ms * reference.curvature_m;

        let k = 2.0 * self.zeta * (omega_ref * omega_ref + self.b * v_ref * v_ref).sqrt();

        let sinc = if e_theta.abs() < 1e-9 {
            1.0 - e_theta * e_theta / 6.0
        } else {
            e_theta.sin() / e_theta
        };

        ChassisSpeeds::new(
            v_ref * e_theta.cos() + k * e_x,
            0.0,
            omega_ref + k * e_theta + self.b * v_ref * sinc * e_y,
        )
    }
}

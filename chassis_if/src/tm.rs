//! # Telemetry
//!
//! The chassis produces one [`ChassisTm`] snapshot per cycle. It is a flat `Copy` struct so it can
//! be handed off the control thread and written straight into a CSV archive.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Serialize;

use crate::tc::{DriveMode, HeadingOption};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Snapshot of the chassis state at the end of a cycle.
///
/// Wheels are ordered front left, front right, back left, back right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChassisTm {
    /// Time at which the snapshot was taken.
    ///
    /// Units: seconds since the session epoch
    pub time_s: f64,

    /// Estimated field position.
    ///
    /// Units: meters
    pub pose_x_m: f64,
    pub pose_y_m: f64,

    /// Estimated heading, anticlockwise from the field X axis.
    ///
    /// Units: degrees
    pub pose_heading_deg: f64,

    pub drive_mode: DriveMode,
    pub heading_option: HeadingOption,

    /// Steering angle targets sent to the modules.
    ///
    /// Units: degrees
    pub fl_angle_deg: f64,
    pub fr_angle_deg: f64,
    pub bl_angle_deg: f64,
    pub br_angle_deg: f64,

    /// Speed targets sent to the modules.
    ///
    /// Units: meters/second
    pub fl_speed_ms: f64,
    pub fr_speed_ms: f64,
    pub bl_speed_ms: f64,
    pub br_speed_ms: f64,

    /// Set if the module's last sensor read failed.
    pub fl_stale: bool,
    pub fr_stale: bool,
    pub bl_stale: bool,
    pub br_stale: bool,

    /// Number of failed sensor reads since the module was created.
    pub fl_fault_count: u32,
    pub fr_fault_count: u32,
    pub bl_fault_count: u32,
    pub br_fault_count: u32,

    /// Number of failed gyro reads since the estimator was created.
    pub gyro_fault_count: u32,

    /// Set if the wheel speeds had to be scaled down this cycle.
    pub desaturated: bool,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Consumer of chassis telemetry, for instance an archive or a dashboard link.
pub trait TelemetrySink {
    /// Publish a telemetry snapshot.
    fn publish(&mut self, tm: &ChassisTm) -> Result<(), Box<dyn std::error::Error>>;
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for ChassisTm {
    fn default() -> Self {
        Self {
            time_s: 0.0,
            pose_x_m: 0.0,
            pose_y_m: 0.0,
            pose_heading_deg: 0.0,
            drive_mode: DriveMode::Stationary,
            heading_option: HeadingOption::Default,
            fl_angle_deg: 0.0,
            fr_angle_deg: 0.0,
            bl_angle_deg: 0.0,
            br_angle_deg: 0.0,
            fl_speed_ms: 0.0,
            fr_speed_ms: 0.0,
            bl_speed_ms: 0.0,
            br_speed_ms: 0.0,
            fl_stale: false,
            fr_stale: false,
            bl_stale: false,
            br_stale: false,
            fl_fault_count: 0,
            fr_fault_count: 0,
            bl_fault_count: 0,
            br_fault_count: 0,
            gyro_fault_count: 0,
            desaturated: false,
        }
    }
}

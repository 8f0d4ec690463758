//! # Orientation policies
//!
//! An orientation policy decides which heading the chassis should be holding, independently of
//! how it is translating. Each [`HeadingOption`] maps onto one policy; the policies are built once
//! with the chassis and keep their state (stored heading, landmark) for its lifetime.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};
use nalgebra::Point2;
use serde::Deserialize;

// Internal
use crate::loc::Pose2D;
use chassis_if::tc::HeadingOption;
use util::maths::{clamp, get_ang_dist_deg, wrap_deg};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the heading controller and the policies.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OrientationParams {
    /// Proportional gain from heading error to rotation rate.
    ///
    /// Units: 1/seconds
    pub heading_k_p: f64,

    /// Requested rotation rates smaller than this are treated as "not rotating" by the maintain
    /// policy, which then holds the stored heading.
    ///
    /// Units: radians/second
    pub rotation_deadband_rads: f64,

    /// Heading held by the specified angle policy.
    ///
    /// Units: degrees
    pub specified_angle_deg: f64,

    /// Field position of the goal tracked by the toward goal policy.
    ///
    /// Units: meters
    pub goal_position_m: [f64; 2],
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A rule producing a target heading for the chassis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrientationPolicy {
    /// No target heading, the requested rotation rate is used unchanged.
    None,

    /// Hold the stored heading while the driver isn't asking for rotation.
    MaintainLastHeading { stored_heading_deg: f64 },

    /// Always turn to a fixed field heading.
    TrackFixedHeading { target_heading_deg: f64 },

    /// Always face a point on the field.
    TrackLandmark { landmark_m: Point2<f64> },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl OrientationPolicy {
    /// Build the policy implementing the given heading option.
    pub fn for_option(option: HeadingOption, params: &OrientationParams) -> Self {
        match option {
            HeadingOption::Default => OrientationPolicy::None,
            HeadingOption::Maintain => OrientationPolicy::MaintainLastHeading {
                stored_heading_deg: 0.0,
            },
            HeadingOption::SpecifiedAngle => OrientationPolicy::TrackFixedHeading {
                target_heading_deg: wrap_deg(params.specified_angle_deg),
            },
            HeadingOption::TowardGoal => OrientationPolicy::TrackLandmark {
                landmark_m: Point2::new(params.goal_position_m[0], params.goal_position_m[1]),
            },
        }
    }

    pub fn heading_option(&self) -> HeadingOption {
        match self {
            OrientationPolicy::None => HeadingOption::Default,
            OrientationPolicy::MaintainLastHeading { .. } => HeadingOption::Maintain,
            OrientationPolicy::TrackFixedHeading { .. } => HeadingOption::SpecifiedAngle,
            OrientationPolicy::TrackLandmark { .. } => HeadingOption::TowardGoal,
        }
    }

    /// Heading the chassis should be facing, or `None` if the policy doesn't control heading.
    ///
    /// Units: degrees
    pub fn target_heading(&self, pose: &Pose2D) -> Option<f64> {
        match self {
            OrientationPolicy::None => None,
            OrientationPolicy::MaintainLastHeading { stored_heading_deg } => {
                Some(*stored_heading_deg)
            }
            OrientationPolicy::TrackFixedHeading { target_heading_deg } => {
                Some(*target_heading_deg)
            }
            OrientationPolicy::TrackLandmark { landmark_m } => {
                let to_landmark = *landmark_m - pose.position_m();
                Some(to_landmark[1].atan2(to_landmark[0]).to_degrees())
            }
        }
    }

    /// Rotation rate to add to the heading correction.
    ///
    /// Units: radians/second
    pub fn angular_rate_feedforward(&self) -> Option<f64> {
        match self {
            OrientationPolicy::None => None,
            _ => Some(0.0),
        }
    }

    /// Set the heading held by the maintain policy. Ignored by all other policies.
    pub fn set_stored_heading(&mut self, heading_deg: f64) {
        match self {
            OrientationPolicy::MaintainLastHeading { stored_heading_deg } => {
                *stored_heading_deg = wrap_deg(heading_deg)
            }
            other => debug!("{:?} has no stored heading to set", other.heading_option()),
        }
    }

    /// Move the landmark tracked by the landmark policy. Ignored by all other policies.
    pub fn set_landmark(&mut self, position_m: Point2<f64>) {
        match self {
            OrientationPolicy::TrackLandmark { landmark_m } => *landmark_m = position_m,
            other => warn!("{:?} has no landmark to set", other.heading_option()),
        }
    }

    /// Resolve the rotation rate to use given the rate that was requested.
    ///
    /// Units: radians/second
    pub fn resolve_omega(
        &self,
        pose: &Pose2D,
        requested_omega_rads: f64,
        params: &OrientationParams,
        max_angular_speed_rads: f64,
    ) -> f64 {
        let target_deg = match self.target_heading(pose) {
            Some(t) => t,
            None => return requested_omega_rads,
        };

        // The maintain policy only acts while the requested rate is negligible
        if let OrientationPolicy::MaintainLastHeading { .. } = self {
            if requested_omega_rads.abs() >= params.rotation_deadband_rads {
                return requested_omega_rads;
            }
        }

        let error_rad = get_ang_dist_deg(pose.heading_deg, target_deg).to_radians();
        let omega = params.heading_k_p * error_rad + self.angular_rate_feedforward().unwrap_or(0.0);

        clamp(&omega, &-max_angular_speed_rads, &max_angular_speed_rads)
    }
}

//! # Trajectories
//!
//! A trajectory is a time-parameterised list of poses and velocities, generated ahead of time by
//! a path planner. The chassis only samples trajectories; it never generates them.
//!
//! Trajectories are stored as JSON:
//!
//! ```json
//! {
//!     "states": [
//!         {"time_s": 0.0, "pose": {"x_m": 0.0, "y_m": 0.0, "heading_deg": 0.0}, "velocity_ms": 0.0},
//!         {"time_s": 2.0, "pose": {"x_m": 2.0, "y_m": 0.0, "heading_deg": 0.0}, "velocity_ms": 1.0}
//!     ]
//! }
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use std::path::Path;

// Internal
use crate::loc::Pose2D;
use util::maths::get_ang_dist_deg;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One point along a trajectory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryState {
    /// Time since the start of the trajectory.
    ///
    /// Units: seconds
    pub time_s: f64,

    /// Desired pose. The heading is the direction of travel.
    pub pose: Pose2D,

    /// Desired speed along the path.
    ///
    /// Units: meters/second
    pub velocity_ms: f64,

    /// Curvature of the path, positive turning left.
    ///
    /// Units: 1/meters
    #[serde(default)]
    pub curvature_m: f64,
}

/// A pre-generated trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    states: Vec<TrajectoryState>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TrajectoryError {
    #[error("The trajectory contains no states")]
    Empty,

    #[error("Trajectory state {0} is earlier than the one before it")]
    NotMonotonic(usize),

    #[error("Could not read the trajectory file: {0}")]
    FileLoadError(std::io::Error),

    #[error("The trajectory contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Trajectory {
    /// Create a trajectory from a list of states, which must be in time order.
    pub fn new(states: Vec<TrajectoryState>) -> Result<Self, TrajectoryError> {
        if states.is_empty() {
            return Err(TrajectoryError::Empty);
        }

        for (i, pair) in states.windows(2).enumerate() {
            if pair[1].time_s < pair[0].time_s {
                return Err(TrajectoryError::NotMonotonic(i + 1));
            }
        }

        Ok(Self { states })
    }

    /// Parse a trajectory from JSON.
    pub fn from_json(json_str: &str) -> Result<Self, TrajectoryError> {
        let raw: Trajectory = serde_json::from_str(json_str).map_err(TrajectoryError::InvalidJson)?;
        Self::new(raw.states)
    }

    /// Load a trajectory from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TrajectoryError> {
        let json_str = std::fs::read_to_string(path).map_err(TrajectoryError::FileLoadError)?;
        Self::from_json(&json_str)
    }

    pub fn states(&self) -> &[TrajectoryState] {
        &self.states
    }

    /// Duration of the trajectory.
    ///
    /// Units: seconds
    pub fn total_time_s(&self) -> f64 {
        match (self.states.first(), self.states.last()) {
            (Some(first), Some(last)) => last.time_s - first.time_s,
            _ => 0.0,
        }
    }

    /// Sample the trajectory at the given time since its start, interpolating linearly between
    /// the surrounding states. Times outside the trajectory are clamped to its ends.
    pub fn sample(&self, time_s: f64) -> TrajectoryState {
        let first = match self.states.first() {
            Some(s) => *s,
            None => return TrajectoryState::default(),
        };
        let t = first.time_s + time_s;

        if t <= first.time_s {
            return first;
        }

        // Index of the first state strictly after t
        let next = self.states.partition_point(|s| s.time_s <= t);
        if next >= self.states.len() {
            return self.states[self.states.len() - 1];
        }

        let a = &self.states[next - 1];
        let b = &self.states[next];
        let span = b.time_s - a.time_s;
        let f = if span > 0.0 { (t - a.time_s) / span } else { 1.0 };

        let lerp = |x: f64, y: f64| x + (y - x) * f;

        TrajectoryState {
            time_s: t,
            pose: Pose2D::new(
                lerp(a.pose.x_m, b.pose.x_m),
                lerp(a.pose.y_m, b.pose.y_m),
                a.pose.heading_deg + get_ang_dist_deg(a.pose.heading_deg, b.pose.heading_deg) * f,
            ),
            velocity_ms: lerp(a.velocity_ms, b.velocity_ms),
            curvature_m: lerp(a.curvature_m, b.curvature_m),
        }
    }
}

//! # Telecommand module
//!
//! A telecommand is an event delivered to the chassis from outside the control loop: new driver
//! input, a change of robot mode, or a trajectory for the autonomous routine to follow. They are
//! exchanged as JSON objects of the form `{"type": "...", "payload": ...}`.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod chassis;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Internal
pub use chassis::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tc {
    /// New state of the driver's controls.
    Input(DriverInput),

    /// The robot's operating mode has changed.
    Mode(RobotMode),

    /// Follow the trajectory stored in the given file, relative to the parameters directory.
    Trajectory(String),
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {
    /// Parse a new TC from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_tcs() {
        let tc = Tc::from_json(r#"{"type": "MODE", "payload": "Teleop"}"#).unwrap();
        assert_eq!(tc, Tc::Mode(RobotMode::Teleop));

        // Missing input fields take their defaults
        let tc = Tc::from_json(r#"{"type": "INPUT", "payload": {"drive": 0.5}}"#).unwrap();
        assert_eq!(
            tc,
            Tc::Input(DriverInput {
                drive: 0.5,
                ..Default::default()
            })
        );

        assert!(Tc::from_json(r#"{"type": "WARP", "payload": 9}"#).is_err());
        assert!(Tc::from_json("not json").is_err());
    }
}

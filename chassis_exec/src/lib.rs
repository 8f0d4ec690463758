//! # Chassis library.
//!
//! The control core of the swerve chassis. This library allows the executable, the integration
//! tests and the benchmarks to access the items defined inside the chassis crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Chassis behaviours run by the mechanism state manager - teleop, autonomous path and idle
pub mod behaviours;

/// Localisation module - fuses wheel odometry and the gyro into a field pose
pub mod loc;

/// Executable parameters
pub mod params;

/// Simulated equipment - in-memory motors, gyro and encoders driven by a simple world model
pub mod sim;

/// Mechanism state manager - configuration driven state machine used by all mechanisms
pub mod state_mgr;

/// Swerve module - converts motion intents into individual wheel commands
pub mod swerve;

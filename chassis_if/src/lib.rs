//! # Chassis interface crate.
//!
//! Provides the interfaces between the chassis control core and the collaborators around it: the
//! equipment drivers, the driver input layer and the telemetry consumers.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Commands and inputs arriving from the driver or an autonomous routine.
pub mod tc;

/// Equipment (motors, gyro, encoders) interface traits.
pub mod eqpt;

/// Telemetry snapshots and the sinks that consume them.
pub mod tm;

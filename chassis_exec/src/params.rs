//! # Chassis Executable Parameters
//!
//! This module provide parameters for the chassis executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;
use std::collections::HashMap;
use util::logger::LevelFilter;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ChassisExecParams {
    /// Target period of one control cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Number of cycles between telemetry archive writes.
    pub tm_every_n_cycles: u64,

    /// Number of consecutive cycle overruns after which an error is raised rather than a warning.
    pub max_consec_cycle_overruns: u64,

    /// Name of the parameter file containing the chassis parameters.
    pub chassis_params_file: String,

    /// Minimum level of log messages, one of "trace", "debug" or "info".
    pub log_level: String,

    /// Per-target log level overrides, for example `"chassis_lib::swerve" = "info"`.
    #[serde(default)]
    pub log_level_overrides: HashMap<String, String>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ChassisExecParams {
    /// Get the minimum log level, defaulting to trace if the parameter can't be understood.
    pub fn min_log_level(&self) -> LevelFilter {
        parse_level(&self.log_level).unwrap_or(LevelFilter::Trace)
    }

    /// Get the per-target log level overrides. Overrides with unrecognised levels are skipped.
    pub fn level_overrides(&self) -> Vec<(String, LevelFilter)> {
        self.log_level_overrides
            .iter()
            .filter_map(|(target, level)| parse_level(level).map(|l| (target.clone(), l)))
            .collect()
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn parse_level(level: &str) -> Option<LevelFilter> {
    level.parse().ok()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_exec_params() {
        let params: ChassisExecParams = util::params::from_str(
            r#"
            cycle_period_s = 0.02
            tm_every_n_cycles = 5
            max_consec_cycle_overruns = 50
            chassis_params_file = "chassis.toml"
            log_level = "debug"

            [log_level_overrides]
            "chassis_lib::swerve" = "info"
            "chassis_lib::sim" = "loud"
            "#,
        )
        .unwrap();

        assert_eq!(params.min_log_level(), LevelFilter::Debug);
        assert_eq!(
            params.level_overrides(),
            vec![("chassis_lib::swerve".to_string(), LevelFilter::Info)]
        );
    }
}

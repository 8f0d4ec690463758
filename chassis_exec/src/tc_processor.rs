//! # Telecommand processor module
//!
//! The telecommand processor applies TCs from the drive script to the chassis context.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use std::sync::Arc;

// Internal
use chassis_if::tc::Tc;
use chassis_lib::{behaviours::ChassisCtx, swerve::Trajectory};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
///
/// Mutates the context so the chassis behaviours pick the command up on their next run.
pub(crate) fn exec(ctx: &mut ChassisCtx, tc: &Tc) {
    match tc {
        Tc::Input(input) => {
            debug!("Driver input: {:?}", input);
            ctx.input = *input;
        }
        Tc::Mode(mode) => {
            info!("Robot mode {:?} -> {:?}", ctx.robot_mode, mode);
            ctx.robot_mode = *mode;
        }
        Tc::Trajectory(path) => match load_trajectory(path) {
            Ok(t) => {
                info!(
                    "Loaded trajectory {} lasting {:.2} s",
                    path,
                    t.total_time_s()
                );
                ctx.trajectory = Some(Arc::new(t));
            }
            Err(e) => warn!("{:?}", e),
        },
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a trajectory file from the parameters directory.
fn load_trajectory(path: &str) -> Result<Trajectory, Report> {
    let full_path = util::params::params_path(path)
        .wrap_err_with(|| format!("Could not locate trajectory {}", path))?;

    Trajectory::load(&full_path)
        .wrap_err_with(|| format!("Could not load trajectory {}", path))
}

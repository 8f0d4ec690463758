//! Main chassis executable entry point.
//!
//! # Architecture
//!
//! The executable runs the chassis control loop against simulated equipment, driven by a drive
//! script standing in for the driver and the robot lifecycle. The general execution methodology
//! consists of:
//!
//!     - Initialise the session, logging and parameters
//!     - Build the simulated equipment, the chassis and the chassis state manager
//!     - Main loop:
//!         - Telecommand processing from the script
//!         - Odometry update
//!         - Chassis state manager processing (behaviour selection and drive)
//!         - Simulation step
//!         - Telemetry archiving
//!
//! # Usage
//!
//! ```text
//! chassis_exec params/scripts/demo.drs
//! ```
//!
//! The `CHASSIS_SW_ROOT` environment variable must point at the root of the repository so that
//! the parameter files can be found.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod tc_processor;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use chassis_if::tm::TelemetrySink;
use chassis_lib::{
    behaviours::{build_chassis_state_mgr, ChassisCtx},
    params::ChassisExecParams,
    sim::SimChassis,
    swerve::{ChassisParams, SwerveChassis, NUM_MODULES},
};
use util::{
    archive::Archiver,
    logger::logger_init,
    script_interpreter::{PendingTcs, ScriptInterpreter},
    session::{self, Session},
    time::{Clock, ManualClock, SessionClock},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Swerve chassis control executable.
#[derive(Debug, StructOpt)]
#[structopt(name = "chassis_exec")]
struct Cli {
    /// Path to the drive script to run.
    #[structopt(parse(from_os_str))]
    script_path: PathBuf,

    /// Executable parameter file, relative to the parameters directory.
    #[structopt(short, long, default_value = "chassis_exec.toml")]
    exec_params: String,

    /// Run the script as fast as possible on simulated time rather than in real time.
    #[structopt(long)]
    fast: bool,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let cli = Cli::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session =
        Session::new("chassis_exec", "sessions").wrap_err("Failed to create the session")?;

    // The logger can only be set up once the parameters are known
    let exec_params: ChassisExecParams = util::params::load(&cli.exec_params)
        .wrap_err("Could not load the executable parameters")?;

    logger_init(
        exec_params.min_log_level(),
        &exec_params.level_overrides(),
        &session,
    )
    .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Swerve Chassis Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI arguments: {:?}", cli);

    // ---- LOAD PARAMETERS ----

    let chassis_params = ChassisParams::load(&exec_params.chassis_params_file)
        .wrap_err("Could not load the chassis parameters")?;

    info!("Parameters loaded");

    // ---- LOAD SCRIPT ----

    info!("Loading script from {:?}", cli.script_path);

    let mut script = ScriptInterpreter::new(&cli.script_path).wrap_err("Failed to load script")?;

    info!(
        "Loaded script lasts {:.02} s and contains {} TCs\n",
        script.get_duration(),
        script.get_num_tcs()
    );

    // ---- INITIALISE CHASSIS ----

    info!("Initialising chassis...");

    let cycle_period_s = exec_params.cycle_period_s;
    if !(cycle_period_s > 0.0) {
        return Err(eyre!(
            "The cycle period must be greater than zero, got {}",
            cycle_period_s
        ));
    }

    // In fast mode time only moves when the loop says so
    let sim_clock = ManualClock::new(session::get_elapsed_seconds());
    let (chassis_clock, loop_clock): (Box<dyn Clock>, Box<dyn Clock>) = if cli.fast {
        (Box::new(sim_clock.clone()), Box::new(sim_clock.clone()))
    } else {
        (Box::new(SessionClock), Box::new(SessionClock))
    };

    let mut sim = SimChassis::new(&chassis_params, [0f64; NUM_MODULES])
        .wrap_err("Failed to initialise the simulated chassis")?;

    let chassis = SwerveChassis::new(
        &chassis_params,
        sim.hardware(),
        Some(sim.gyro_handle()),
        chassis_clock,
    )
    .wrap_err("Failed to initialise the chassis")?;

    let mut ctx = ChassisCtx::new(chassis);
    let mut state_mgr = build_chassis_state_mgr(&chassis_params, &mut ctx);
    if state_mgr.is_inert() {
        warn!("The chassis state manager is inert, the chassis will not move");
    }

    let mut tm_archiver = Archiver::from_path(&session, "chassis_tm.csv")
        .wrap_err("Failed to create the telemetry archive")?;

    info!("Chassis initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Beginning main loop\n");

    let cycles_per_second = ((1.0 / cycle_period_s).round() as u64).max(1);
    let start_time_s = loop_clock.now_s();
    let mut num_cycles: u64 = 0;
    let mut num_consec_cycle_overruns: u64 = 0;

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();
        let is_1_hz_cycle = num_cycles % cycles_per_second == 0;

        // ---- TELECOMMAND PROCESSING ----

        match script.get_pending_tcs(loop_clock.now_s() - start_time_s) {
            PendingTcs::None => (),
            PendingTcs::Some(tcs) => {
                for tc in tcs.iter() {
                    tc_processor::exec(&mut ctx, tc);
                }
            }
            // Exit if end of script reached
            PendingTcs::EndOfScript => {
                info!("End of drive script reached, stopping");
                break;
            }
        }

        // ---- CONTROL PROCESSING ----

        ctx.chassis.update_odometry();

        state_mgr.run_current_state(&mut ctx);

        sim.step(cycle_period_s);

        // ---- TELEMETRY ----

        if exec_params.tm_every_n_cycles > 0 && num_cycles % exec_params.tm_every_n_cycles == 0 {
            if let Err(e) = tm_archiver.publish(&ctx.chassis.tm()) {
                warn!("Could not archive telemetry: {}", e);
            }
        }

        if is_1_hz_cycle {
            info!(
                "{} in {}: {:?}",
                state_mgr.current_state_name().unwrap_or("no state"),
                ctx.chassis.current_drive_mode(),
                ctx.chassis.pose()
            );
        }

        // ---- CYCLE MANAGEMENT ----

        num_cycles += 1;

        if cli.fast {
            sim_clock.advance(cycle_period_s);
            continue;
        }

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(cycle_period_s).checked_sub(cycle_dur) {
            Some(d) => {
                num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period_s
                );
                num_consec_cycle_overruns += 1;

                if num_consec_cycle_overruns > exec_params.max_consec_cycle_overruns {
                    return Err(eyre!(
                        "More than {} consecutive cycle overruns",
                        exec_params.max_consec_cycle_overruns
                    ));
                }
            }
        }
    }

    // ---- SHUTDOWN ----

    info!("Final pose: {:?}", ctx.chassis.pose());
    info!("End of execution after {} cycles", num_cycles);

    Ok(())
}

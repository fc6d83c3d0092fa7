//! Longitudinal control replay executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logger and LongCtrl
//!     - Load the scenario
//!     - Main loop, once per scenario tick:
//!         - Longitudinal control processing
//!         - Archiving
//!         - Cycle management
//!     - Print a summary of the run

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{Report, eyre::WrapErr};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use long_lib::{
    long_ctrl::{LongCtrl, LongCtrlInit, LongCtrlMode, RATE_HZ},
    scenario::Scenario
};
use util::{
    archive::Archived,
    logger::{logger_init, parse_level, LevelFilter},
    module::State,
    session::Session
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 1.0 / RATE_HZ;

/// Number of cycles between progress messages.
const PROGRESS_PERIOD_CYCLES: usize = 1000;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Replay a recorded scenario through the longitudinal controller.
#[derive(Debug, StructOpt)]
#[structopt(name = "long_exec")]
struct Opts {
    /// Path to the scenario file (JSON Lines, one tick per line)
    #[structopt(parse(from_os_str))]
    scenario: PathBuf,

    /// Parameter file, relative to the params directory
    #[structopt(long, default_value = "long_ctrl.toml")]
    params: String,

    /// Ingest live perception and the driver gas pedal rather than replaying deterministically
    #[structopt(long)]
    live: bool,

    /// Pace the replay to the control rate
    #[structopt(long)]
    realtime: bool,

    /// Minimum log level (info, debug or trace)
    #[structopt(long, default_value = "info", parse(try_from_str = parse_level))]
    log_level: LevelFilter
}

/// Statistics gathered over a run.
#[derive(Debug, Default)]
struct Summary {
    num_cycles: usize,
    num_mode_changes: usize,
    num_overruns: usize,
    peak_gas: f64,
    peak_brake: f64
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "long_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(opts.log_level, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Longitudinal Control Replay Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI arguments: {:?}", opts);

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut long_ctrl = LongCtrl::default();
    long_ctrl.init(
        LongCtrlInit {
            params_path: opts.params.clone(),
            replay: !opts.live
        },
        &session
    ).wrap_err("Failed to initialise LongCtrl")?;

    if long_ctrl.params().enable_dynamic_gas {
        warn!("Dynamic gas is enabled but no gas limiter is available, using the gas_max curve");
    }

    info!("LongCtrl init complete");
    info!("Module initialisation complete\n");

    // ---- LOAD SCENARIO ----

    info!("Loading scenario from {:?}", opts.scenario);

    let scenario = Scenario::load(&opts.scenario)
        .wrap_err("Failed to load scenario")?;

    info!(
        "Loaded scenario lasts {:.02} s and contains {} ticks\n",
        scenario.duration_s(RATE_HZ),
        scenario.num_ticks()
    );

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut summary = Summary::default();
    let mut last_mode = LongCtrlMode::Off;

    for input in scenario.inputs() {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- CONTROL PROCESSING ----

        let (output, report) = long_ctrl.proc(&input)
            .wrap_err_with(|| format!("LongCtrl failed on tick {}", summary.num_cycles))?;

        if report.mode != last_mode {
            summary.num_mode_changes += 1;
            last_mode = report.mode;
        }
        summary.peak_gas = summary.peak_gas.max(output.gas);
        summary.peak_brake = summary.peak_brake.max(output.brake);

        // ---- WRITE ARCHIVES ----

        if let Err(e) = long_ctrl.write() {
            warn!("Could not write LongCtrl archives: {}", e);
        }

        // ---- CYCLE MANAGEMENT ----

        summary.num_cycles += 1;

        if summary.num_cycles % PROGRESS_PERIOD_CYCLES == 0 {
            info!("{} of {} ticks processed", summary.num_cycles, scenario.num_ticks());
        }

        if !opts.realtime {
            continue;
        }

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S)
            .checked_sub(cycle_dur)
        {
            Some(d) => thread::sleep(d),
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                );
                summary.num_overruns += 1;
            }
        }
    }

    // ---- SHUTDOWN ----

    info!("End of scenario reached\n");
    info!("Summary:");
    info!("    Ticks processed: {}", summary.num_cycles);
    info!("    Mode changes: {}", summary.num_mode_changes);
    info!("    Final mode: {:?}", last_mode);
    info!("    Peak gas: {:.3}", summary.peak_gas);
    info!("    Peak brake: {:.3}", summary.peak_brake);
    if opts.realtime {
        info!("    Cycle overruns: {}", summary.num_overruns);
    }

    session.exit();

    Ok(())
}

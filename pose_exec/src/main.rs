//! # Pose Executable
//!
//! This executable feeds the axis controllers with the platform's position. Each cycle the
//! transform from the platform frame into the world frame is requested from the transform server,
//! and its x and y translations are published on the `x_pid` and `y_pid` topics.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Parameters for the pose executable.
mod params;

/// Position publisher.
mod pose_pub;

/// Transform lookup and per-axis split.
mod pose_sensor;

/// Transform server client.
mod tf_client;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Result};
use log::{info, warn};
use std::{thread, time::Instant};

// Internal
use comms_if::net::zmq;
use params::PoseExecParams;
use pose_pub::PosePublisher;
use pose_sensor::PoseSensor;
use tf_client::TfClient;
use util::{
    host,
    logger::{level_from_str, logger_init},
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("pose_exec", "sessions").wrap_err("Failed to create the session")?;

    let params: PoseExecParams =
        util::params::load("pose_exec.toml").wrap_err("Could not load exec params")?;

    // Initialise logger
    let log_level = level_from_str(&params.log_level).wrap_err("Invalid log level")?;
    logger_init(log_level, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Pose Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    // ---- NETWORK INITIALISATION ----

    let zmq_ctx = zmq::Context::new();

    let tf_client = TfClient::new(&zmq_ctx, &params.tf_endpoint, params.tf_timeout_ms)
        .wrap_err("Failed to initialise the TfClient")?;
    info!("TfClient initialised");

    let pose_pub = PosePublisher::new(&zmq_ctx, &params.pose_endpoint)
        .wrap_err("Failed to initialise the PosePublisher")?;
    info!("PosePublisher initialised");

    let mut sensor = PoseSensor::new(
        tf_client,
        pose_pub,
        &params.target_frame,
        &params.source_frame,
    );

    // Only waits, the main loop runs even if the transform never became available
    let cycle_period = params.cycle_period();
    sensor.wait_for_transform(params.wait_timeout(), cycle_period);

    // ---- MAIN LOOP ----

    info!("Initialisation complete, entering main loop");

    let mut num_consec_failures: u64 = 0;

    loop {
        let cycle_start_instant = Instant::now();

        match sensor.broadcast() {
            Ok(_) => {
                if num_consec_failures > 0 {
                    info!("Transform recovered after {} failed cycles", num_consec_failures);
                }
                num_consec_failures = 0;
            }
            Err(e) => {
                num_consec_failures += 1;
                warn!("{}", e);
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = cycle_start_instant.elapsed();

        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
            ),
        }
    }
}

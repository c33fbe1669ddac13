//! Position control executable entry point.
//!
//! # Architecture
//!
//! The executable is made of:
//!
//!     - The motion gate, running on its own thread inside a `GateActor`
//!     - One `AxisFeedbackListener` thread per axis, forwarding controller outputs to the gate
//!     - The main thread, which runs the `PosCtrlServer` loop:
//!         - Recieve a request
//!         - Submit it to the gate and wait for it to be applied
//!         - Respond to the client
//!
//! If the gate stops running the exec stops answering requests and exits with an error, so that
//! clients see their request time out and assume position control is disarmed. The exec also
//! exits if a response cannot be sent, since the server cannot recieve another request until it
//! has responded.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, error, info, warn};
use std::time::{Duration, Instant};

// Internal
use comms_if::{eqpt::axis::AXES, net::zmq};
use pos_ctrl_lib::{
    actuator::VelocityPublisher,
    axis_ctrl::{AxisFeedbackListener, AxisSetpointPublisher},
    motion_gate::{GateActor, GateHandle, MotionGate},
    params::PosCtrlExecParams,
    pos_ctrl_server::PosCtrlServer,
};
use util::{
    host,
    logger::{level_from_str, logger_init},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Period at which the gate's status is checked and logged.
const STATUS_PERIOD_S: u64 = 10;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session =
        Session::new("pos_ctrl_exec", "sessions").wrap_err("Failed to create the session")?;

    // Parameters are needed first as they hold the log level
    let params: PosCtrlExecParams =
        util::params::load("pos_ctrl_exec.toml").wrap_err("Could not load exec params")?;

    // Initialise logger
    let log_level = level_from_str(&params.log_level).wrap_err("Invalid log level")?;
    logger_init(log_level, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Position Control Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);
    info!("Exec parameters loaded");

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let zmq_ctx = zmq::Context::new();

    let setpoint_pub = {
        let p = AxisSetpointPublisher::new(&zmq_ctx, &params.setpoint_endpoint)
            .wrap_err("Failed to initialise the AxisSetpointPublisher")?;
        info!("AxisSetpointPublisher initialised");
        p
    };

    let vel_pub = {
        let p = VelocityPublisher::new(
            &zmq_ctx,
            &params.cmd_vel_endpoint,
            params.max_consec_publish_failures,
        )
        .wrap_err("Failed to initialise the VelocityPublisher")?;
        info!("VelocityPublisher initialised");
        p
    };

    // ---- START THE GATE ----

    let (gate_actor, gate) = GateActor::spawn(
        MotionGate::new(setpoint_pub, vel_pub),
        params.relatch_period(),
    )
    .wrap_err("Failed to start the motion gate")?;
    info!("Motion gate started, position control disarmed");

    let mut listeners = Vec::with_capacity(AXES.len());
    for &axis in AXES.iter() {
        let endpoint = params.control_endpoints.get(axis);

        listeners.push(
            AxisFeedbackListener::start(&zmq_ctx, axis, endpoint, gate.clone())
                .wrap_err_with(|| format!("Failed to start the {:?} feedback listener", axis))?,
        );
        info!("{:?} feedback listener connected to {}", axis, endpoint);
    }

    let server = {
        let s = PosCtrlServer::new(&zmq_ctx, &params)
            .wrap_err("Failed to initialise the PosCtrlServer")?;
        info!("PosCtrlServer initialised");
        s
    };

    info!("Network initialisation complete");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let result = serve(&server, &gate, &listeners);

    // ---- SHUTDOWN ----

    info!("Shutting down");

    // Stop the listeners first so that nothing reaches the gate while it disarms
    for listener in listeners.iter_mut() {
        listener.stop();
    }

    gate.shutdown().ok();
    drop(gate);

    match gate_actor.join() {
        Some(g) => info!("Motion gate stopped: {:?}", g.report()),
        None => error!("The motion gate thread panicked"),
    }

    info!("End of execution");

    result
}

/// Answer requests until a fatal error occurs.
fn serve(
    server: &PosCtrlServer,
    gate: &GateHandle,
    listeners: &[AxisFeedbackListener],
) -> Result<(), Report> {
    let status_period = Duration::from_secs(STATUS_PERIOD_S);
    let mut last_status = Instant::now();
    let mut client_connected = false;

    loop {
        match server.get_request() {
            Ok(Some(request)) => {
                debug!("Recieved {:?}", request);

                // If the gate has gone the request is left unanswered, the client will time out
                let response = gate
                    .submit(request)
                    .wrap_err("Could not submit the request to the motion gate")?;

                // The server can't recieve again until a response is sent, so a failure here
                // ends the exec and the gate disarms on shutdown
                server
                    .send_response(&response)
                    .wrap_err_with(|| format!("Could not respond to {:?}", request))?;
            }
            Ok(None) => (),
            Err(e) if e.is_recoverable() => warn!("{}", e),
            Err(e) => {
                return Err(e).wrap_err("An error occured while recieving requests from clients")
            }
        }

        if server.is_connected() != client_connected {
            client_connected = server.is_connected();
            match client_connected {
                true => info!("Client connected"),
                false => info!("Client disconnected"),
            }
        }

        if last_status.elapsed() >= status_period {
            last_status = Instant::now();

            let status = gate
                .status()
                .wrap_err("Could not get the status of the motion gate")?;
            debug!("Gate status: {:?}", status);

            for listener in listeners.iter().filter(|l| !l.is_running()) {
                warn!("The {:?} feedback listener has stopped", listener.axis());
            }
        }
    }
}

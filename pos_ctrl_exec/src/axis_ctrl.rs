//! # Axis Controller Client
//!
//! Network adapters for the external per-axis position controllers. Setpoints for every axis are
//! published on a single socket, each on its axis' setpoint topic. The output of each controller is
//! read by a listener thread which passes it on to the motion gate.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

use comms_if::{
    eqpt::axis::{AxisFeedback, AxisId, AXES},
    net::{
        pack_topic_msg, unpack_topic_msg, zmq, MonitoredSocket, MonitoredSocketError,
        SocketOptions, TopicMsgError,
    },
};
use log::{debug, error, warn};

use crate::motion_gate::{GateHandle, SetpointSink};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Recieve timeout of the listener sockets, bounds how long a listener takes to notice a stop.
const LISTENER_RECV_TIMEOUT_MS: i32 = 100;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Publishes setpoints to the axis controllers.
pub struct AxisSetpointPublisher {
    socket: MonitoredSocket,

    /// Last setpoint sent to each axis, re-sent on relatch
    latched: HashMap<AxisId, f64>,
}

/// Listens to the output of one axis controller and forwards it to the motion gate.
pub struct AxisFeedbackListener {
    axis: AxisId,
    bg_run: Arc<AtomicBool>,
    bg_jh: Option<JoinHandle<()>>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum AxisCtrlError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not subscribe to {0}: {1}")]
    SubscribeError(&'static str, zmq::Error),

    #[error("Could not send the setpoint to the {0:?} controller: {1}")]
    SendError(AxisId, zmq::Error),

    #[error("Could not serialize the setpoint: {0}")]
    SerializationError(serde_json::Error),

    #[error("Invalid output from the {0:?} controller: {1}")]
    InvalidOutput(AxisId, TopicMsgError),

    #[error("Could not spawn the {0:?} listener thread: {1}")]
    SpawnError(AxisId, std::io::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl AxisSetpointPublisher {
    /// Bind the setpoint publisher to the given endpoint.
    pub fn new(ctx: &zmq::Context, endpoint: &str) -> Result<Self, AxisCtrlError> {
        let socket_options = SocketOptions {
            send_timeout: 10,
            ..SocketOptions::server()
        };

        let socket = MonitoredSocket::new(ctx, zmq::PUB, socket_options, endpoint)
            .map_err(AxisCtrlError::SocketError)?;

        Ok(Self {
            socket,
            latched: HashMap::new(),
        })
    }

    /// The setpoint most recently sent to the given axis.
    pub fn latched(&self, axis: AxisId) -> Option<f64> {
        self.latched.get(&axis).copied()
    }

    fn publish(&self, axis: AxisId, setpoint: f64) -> Result<(), AxisCtrlError> {
        let msg = pack_topic_msg(axis.setpoint_topic(), &setpoint)
            .map_err(AxisCtrlError::SerializationError)?;

        self.socket
            .send(&msg, 0)
            .map_err(|e| AxisCtrlError::SendError(axis, e))
    }
}

impl SetpointSink for AxisSetpointPublisher {
    fn send_setpoint(&mut self, axis: AxisId, setpoint: f64) {
        self.latched.insert(axis, setpoint);

        if let Err(e) = self.publish(axis, setpoint) {
            warn!("{}", e);
        }
    }

    fn relatch(&mut self) {
        for &axis in AXES.iter() {
            if let Some(setpoint) = self.latched(axis) {
                if let Err(e) = self.publish(axis, setpoint) {
                    warn!("Relatch failed: {}", e);
                }
            }
        }
    }
}

impl AxisFeedbackListener {
    /// Connect to the output of the given axis' controller and start forwarding to the gate.
    ///
    /// Does not wait for the controller to be running.
    pub fn start(
        ctx: &zmq::Context,
        axis: AxisId,
        endpoint: &str,
        gate: GateHandle,
    ) -> Result<Self, AxisCtrlError> {
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            linger: 1,
            recv_timeout: LISTENER_RECV_TIMEOUT_MS,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(ctx, zmq::SUB, socket_options, endpoint)
            .map_err(AxisCtrlError::SocketError)?;
        socket
            .set_subscribe(axis.control_topic().as_bytes())
            .map_err(|e| AxisCtrlError::SubscribeError(axis.control_topic(), e))?;

        let bg_run = Arc::new(AtomicBool::new(true));
        let bg_run_clone = bg_run.clone();

        let bg_jh = thread::Builder::new()
            .name(format!("{}_listener", axis.control_topic()))
            .spawn(move || listener_thread(axis, socket, bg_run_clone, gate))
            .map_err(|e| AxisCtrlError::SpawnError(axis, e))?;

        Ok(Self {
            axis,
            bg_run,
            bg_jh: Some(bg_jh),
        })
    }

    pub fn axis(&self) -> AxisId {
        self.axis
    }

    /// Returns true while the listener thread is running.
    pub fn is_running(&self) -> bool {
        self.bg_run.load(Ordering::Relaxed)
    }

    /// Stop the listener and wait for its thread to exit.
    pub fn stop(&mut self) {
        self.bg_run.store(false, Ordering::Relaxed);

        if let Some(jh) = self.bg_jh.take() {
            if jh.join().is_err() {
                error!("{:?} listener thread panicked", self.axis);
            }
        }
    }
}

impl Drop for AxisFeedbackListener {
    fn drop(&mut self) {
        self.stop();
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Parse a message recieved from the given axis' controller.
pub fn parse_output(axis: AxisId, msg: &str) -> Result<AxisFeedback, AxisCtrlError> {
    unpack_topic_msg(axis.control_topic(), msg)
        .map(|value| AxisFeedback::new(axis, value))
        .map_err(|e| AxisCtrlError::InvalidOutput(axis, e))
}

/// Background thread, forwards every output of the controller to the gate.
fn listener_thread(axis: AxisId, socket: MonitoredSocket, run: Arc<AtomicBool>, gate: GateHandle) {
    while run.load(Ordering::Relaxed) {
        let msg = match socket.recv_string(0) {
            Ok(Ok(s)) => s,
            Ok(Err(_)) => {
                warn!("Non UTF-8 message from the {:?} controller", axis);
                continue;
            }
            Err(zmq::Error::EAGAIN) => continue,
            Err(e) => {
                error!("Error recieving from the {:?} controller: {}", axis, e);
                break;
            }
        };

        let feedback = match parse_output(axis, &msg) {
            Ok(f) => f,
            Err(e) => {
                warn!("{}", e);
                continue;
            }
        };

        if gate.feedback(feedback).is_err() {
            debug!("Motion gate stopped, {:?} listener exiting", axis);
            break;
        }
    }

    run.store(false, Ordering::Relaxed);
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

//! # Actuator Client
//!
//! Publishes velocity commands to the platform on the `cmd_vel` topic.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::vel::{VelocityCommand, CMD_VEL_TOPIC},
    net::{pack_topic_msg, zmq, MonitoredSocket, MonitoredSocketError, SocketOptions},
};
use log::{error, warn};

use crate::motion_gate::VelocitySink;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Velocity command publisher
pub struct VelocityPublisher {
    socket: MonitoredSocket,

    /// Number of publishes in a row which have failed
    num_consec_failures: u64,

    /// Number of consecutive failures after which the failure is reported as an error
    max_consec_failures: u64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ActuatorError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send the velocity command: {0}")]
    SendError(zmq::Error),

    #[error("Could not serialize the velocity command: {0}")]
    SerializationError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl VelocityPublisher {
    /// Bind the publisher to the given endpoint.
    ///
    /// This function will not block until a subscriber connects.
    pub fn new(
        ctx: &zmq::Context,
        endpoint: &str,
        max_consec_failures: u64,
    ) -> Result<Self, ActuatorError> {
        let socket_options = SocketOptions {
            send_timeout: 10,
            ..SocketOptions::server()
        };

        let socket = MonitoredSocket::new(ctx, zmq::PUB, socket_options, endpoint)
            .map_err(ActuatorError::SocketError)?;

        Ok(Self {
            socket,
            num_consec_failures: 0,
            max_consec_failures,
        })
    }

    /// Publish a single velocity command.
    pub fn publish(&self, cmd: &VelocityCommand) -> Result<(), ActuatorError> {
        let msg = pack_topic_msg(CMD_VEL_TOPIC, cmd).map_err(ActuatorError::SerializationError)?;

        self.socket.send(&msg, 0).map_err(ActuatorError::SendError)
    }
}

impl VelocitySink for VelocityPublisher {
    fn send_velocity(&mut self, cmd: VelocityCommand) {
        match self.publish(&cmd) {
            Ok(()) => self.num_consec_failures = 0,
            Err(e) => {
                self.num_consec_failures += 1;

                if self.num_consec_failures >= self.max_consec_failures {
                    error!(
                        "{} ({} consecutive failures, last command {:?})",
                        e, self.num_consec_failures, cmd
                    );
                } else {
                    warn!("{}", e);
                }
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

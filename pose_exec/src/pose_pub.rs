//! # Pose Publisher
//!
//! Publishes the platform's position on one topic per axis (`x_pid`, `y_pid`).

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::axis::AxisId,
    net::{pack_topic_msg, zmq, MonitoredSocket, MonitoredSocketError, SocketOptions},
};
use log::warn;

use crate::pose_sensor::PoseSink;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct PosePublisher {
    socket: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PosePublisherError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send the {0:?} position: {1}")]
    SendError(AxisId, zmq::Error),

    #[error("Could not serialize the position: {0}")]
    SerializationError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PosePublisher {
    pub fn new(ctx: &zmq::Context, endpoint: &str) -> Result<Self, PosePublisherError> {
        let socket_options = SocketOptions {
            send_timeout: 10,
            ..SocketOptions::server()
        };

        let socket = MonitoredSocket::new(ctx, zmq::PUB, socket_options, endpoint)
            .map_err(PosePublisherError::SocketError)?;

        Ok(Self { socket })
    }

    pub fn publish(&self, axis: AxisId, position: f64) -> Result<(), PosePublisherError> {
        let msg = pack_topic_msg(axis.state_topic(), &position)
            .map_err(PosePublisherError::SerializationError)?;

        self.socket
            .send(&msg, 0)
            .map_err(|e| PosePublisherError::SendError(axis, e))
    }
}

impl PoseSink for PosePublisher {
    fn send_position(&mut self, axis: AxisId, position: f64) {
        if let Err(e) = self.publish(axis, position) {
            warn!("{}", e);
        }
    }
}

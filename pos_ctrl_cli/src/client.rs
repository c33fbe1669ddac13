//! # Position Control Client
//!
//! Sends requests to the position control exec.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    net::{zmq, MonitoredSocket, MonitoredSocketError, SocketOptions},
    tc::{PosCtrlRequest, PosCtrlResponse},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct PosCtrlClient {
    socket: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PosCtrlClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send the request: {0}")]
    SendError(zmq::Error),

    #[error("Could not recieve the response: {0}")]
    RecvError(zmq::Error),

    #[error("The request was not acknowledged in time, position control must be assumed disarmed")]
    NoResponse,

    #[error("Could not serialize the request: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not deserialize the response: {0}")]
    DeserializeError(serde_json::Error),

    #[error("The exec sent a response which was not valid UTF-8")]
    NonUtf8Response,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PosCtrlClient {
    /// Connect to the position control exec.
    ///
    /// This function will not block until the exec is reachable, a missing exec shows up as
    /// [`PosCtrlClientError::NoResponse`] on the first request.
    pub fn new(
        ctx: &zmq::Context,
        endpoint: &str,
        timeout_ms: i32,
    ) -> Result<Self, PosCtrlClientError> {
        let socket = MonitoredSocket::new(
            ctx,
            zmq::REQ,
            SocketOptions::client(timeout_ms),
            endpoint,
        )
        .map_err(PosCtrlClientError::SocketError)?;

        Ok(Self { socket })
    }

    /// Send a request and wait for its response.
    pub fn send(&self, request: &PosCtrlRequest) -> Result<PosCtrlResponse, PosCtrlClientError> {
        let request_str =
            serde_json::to_string(request).map_err(PosCtrlClientError::SerializationError)?;

        match self.socket.send(&request_str, 0) {
            Ok(()) => (),
            Err(zmq::Error::EAGAIN) => return Err(PosCtrlClientError::NoResponse),
            Err(e) => return Err(PosCtrlClientError::SendError(e)),
        }

        let response_str = match self.socket.recv_string(0) {
            Ok(Ok(s)) => s,
            Ok(Err(_)) => return Err(PosCtrlClientError::NonUtf8Response),
            Err(zmq::Error::EAGAIN) => return Err(PosCtrlClientError::NoResponse),
            Err(e) => return Err(PosCtrlClientError::RecvError(e)),
        };

        serde_json::from_str(&response_str).map_err(PosCtrlClientError::DeserializeError)
    }
}

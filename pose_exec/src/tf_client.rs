//! # Transform Client
//!
//! Requests transforms between frames from the transform server.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::tf::{TfError, TfRequest, TfResponse, Transform},
    net::{zmq, MonitoredSocket, MonitoredSocketError, SocketOptions},
};

use crate::pose_sensor::TransformSource;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Transform client
pub struct TfClient {
    socket: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TfClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send the request to the server: {0}")]
    SendError(zmq::Error),

    #[error("Could not recieve a message from the server: {0}")]
    RecvError(zmq::Error),

    #[error("The server did not respond in time")]
    NoResponse,

    #[error("Could not serialize the request: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not deserialize the response from the server: {0}")]
    DeserializeError(serde_json::Error),

    #[error("The server sent a message which was not valid UTF-8")]
    NonUtf8Response,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TfClient {
    /// Create a new instance of the transform client.
    ///
    /// This function will not block until the server connects.
    pub fn new(ctx: &zmq::Context, endpoint: &str, timeout_ms: i32) -> Result<Self, TfClientError> {
        let socket = MonitoredSocket::new(ctx, zmq::REQ, SocketOptions::client(timeout_ms), endpoint)
            .map_err(TfClientError::SocketError)?;

        Ok(Self { socket })
    }

    /// Send a request to the server and wait for its response.
    pub fn request(&self, request: &TfRequest) -> Result<TfResponse, TfClientError> {
        let request_str =
            serde_json::to_string(request).map_err(TfClientError::SerializationError)?;

        self.socket
            .send(&request_str, 0)
            .map_err(TfClientError::SendError)?;

        let response_str = match self.socket.recv_string(0) {
            Ok(Ok(s)) => s,
            Ok(Err(_)) => return Err(TfClientError::NonUtf8Response),
            Err(zmq::Error::EAGAIN) => return Err(TfClientError::NoResponse),
            Err(e) => return Err(TfClientError::RecvError(e)),
        };

        serde_json::from_str(&response_str).map_err(TfClientError::DeserializeError)
    }
}

impl TransformSource for TfClient {
    /// Failures to reach the server are reported as lookup failures.
    fn lookup_transform(&mut self, target: &str, source: &str) -> Result<Transform, TfError> {
        let response = self
            .request(&TfRequest::new(target, source))
            .map_err(|e| TfError::Lookup(e.to_string()))?;

        response.into()
    }
}

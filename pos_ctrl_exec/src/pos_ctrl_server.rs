//! # Position Control Server
//!
//! Recieves position control requests from clients and sends back the gate's response. Every
//! request that is recieved gets a response, invalid ones are answered with
//! [`PosCtrlResponse::Invalid`] by this module directly.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    net::{zmq, MonitoredSocket, MonitoredSocketError, SocketOptions},
    tc::{PosCtrlRequest, PosCtrlResponse},
};

use log::warn;

use crate::params::PosCtrlExecParams;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of times a response is sent before giving up, when the send times out.
const MAX_SEND_ATTEMPTS: usize = 3;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Position control request server
pub struct PosCtrlServer {
    socket: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PosCtrlServerError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send the response: {0}")]
    SendError(zmq::Error),

    #[error("Could not recieve a message from the client: {0}")]
    RecvError(zmq::Error),

    #[error("Could not serialize the response: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not parse the recieved request: {0}")]
    InvalidRequest(serde_json::Error),

    #[error("The client sent a message which was not valid UTF-8")]
    NonUtf8Request,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PosCtrlServer {
    /// Bind the server to the request endpoint.
    pub fn new(ctx: &zmq::Context, params: &PosCtrlExecParams) -> Result<Self, PosCtrlServerError> {
        let socket_options = SocketOptions {
            recv_timeout: params.request_recv_timeout_ms,
            send_timeout: 10,
            ..SocketOptions::server()
        };

        let socket = MonitoredSocket::new(
            ctx,
            zmq::REP,
            socket_options,
            &params.request_endpoint,
        )
        .map_err(PosCtrlServerError::SocketError)?;

        Ok(Self { socket })
    }

    /// Recieve a single request.
    ///
    /// Returns `Ok(None)` if no request arrived within the recieve timeout.
    ///
    /// After recieving a valid request [`PosCtrlServer::send_response`] must be called before
    /// recieving another. Requests which cannot be parsed are answered with
    /// [`PosCtrlResponse::Invalid`] by this function and returned as an error.
    pub fn get_request(&self) -> Result<Option<PosCtrlRequest>, PosCtrlServerError> {
        let request_str = match self.socket.recv_string(0) {
            Ok(Ok(s)) => s,
            Ok(Err(_)) => {
                self.send_response(&PosCtrlResponse::Invalid)?;
                return Err(PosCtrlServerError::NonUtf8Request);
            }
            Err(zmq::Error::EAGAIN) => return Ok(None),
            Err(e) => return Err(PosCtrlServerError::RecvError(e)),
        };

        match parse_request(&request_str) {
            Ok(r) => Ok(Some(r)),
            Err(e) => {
                self.send_response(&PosCtrlResponse::Invalid)?;
                Err(e)
            }
        }
    }

    /// Send the response to the last recieved request.
    ///
    /// A send which times out is retried. If this returns an error the REP socket is still waiting
    /// for a response to be sent, so no further request can be recieved and the error is not
    /// recoverable.
    pub fn send_response(&self, response: &PosCtrlResponse) -> Result<(), PosCtrlServerError> {
        let response_str =
            serde_json::to_string(response).map_err(PosCtrlServerError::SerializationError)?;

        let mut attempt = 1;
        loop {
            match self.socket.send(&response_str, 0) {
                Ok(()) => return Ok(()),
                Err(zmq::Error::EAGAIN) if attempt < MAX_SEND_ATTEMPTS => {
                    warn!(
                        "Sending {:?} timed out (attempt {}/{})",
                        response, attempt, MAX_SEND_ATTEMPTS
                    );
                    attempt += 1;
                }
                Err(e) => return Err(PosCtrlServerError::SendError(e)),
            }
        }
    }

    /// Returns true if a client is connected.
    pub fn is_connected(&self) -> bool {
        self.socket.connected()
    }
}

impl PosCtrlServerError {
    /// Returns true if the server can carry on recieving requests after this error.
    ///
    /// Only bad requests are recoverable, they have already been answered with
    /// [`PosCtrlResponse::Invalid`].
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PosCtrlServerError::InvalidRequest(_) | PosCtrlServerError::NonUtf8Request
        )
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Parse a request as sent by a client.
pub fn parse_request(request_str: &str) -> Result<PosCtrlRequest, PosCtrlServerError> {
    serde_json::from_str(request_str).map_err(PosCtrlServerError::InvalidRequest)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::params::AxisEndpoints;

    fn server(ctx: &zmq::Context, endpoint: &str) -> PosCtrlServer {
        let params = PosCtrlExecParams {
            log_level: "info".into(),
            request_endpoint: endpoint.into(),
            request_recv_timeout_ms: 200,
            setpoint_endpoint: "inproc://unused_setpoint".into(),
            setpoint_relatch_period_s: 0.0,
            control_endpoints: AxisEndpoints {
                x: "inproc://unused_control_x".into(),
                y: "inproc://unused_control_y".into(),
            },
            cmd_vel_endpoint: "inproc://unused_cmd_vel".into(),
            max_consec_publish_failures: 5,
        };

        PosCtrlServer::new(ctx, &params).unwrap()
    }

    fn client(ctx: &zmq::Context, endpoint: &str) -> zmq::Socket {
        let socket = ctx.socket(zmq::REQ).unwrap();
        socket.set_rcvtimeo(1000).unwrap();
        socket.connect(endpoint).unwrap();
        socket
    }

    #[test]
    fn test_request_response() {
        let ctx = zmq::Context::new();
        let server = server(&ctx, "inproc://pos_ctrl_server_request_response");
        let client = client(&ctx, "inproc://pos_ctrl_server_request_response");

        // Nothing sent yet
        assert!(matches!(server.get_request(), Ok(None)));

        client.send(r#"{"x": 2.0, "y": -1.0}"#, 0).unwrap();
        assert_eq!(
            server.get_request().unwrap(),
            Some(PosCtrlRequest::goto(2.0, -1.0))
        );
        server.send_response(&PosCtrlResponse::Ack).unwrap();

        let response: PosCtrlResponse =
            serde_json::from_str(&client.recv_string(0).unwrap().unwrap()).unwrap();
        assert_eq!(response, PosCtrlResponse::Ack);
    }

    #[test]
    fn test_invalid_request_is_answered() {
        let ctx = zmq::Context::new();
        let server = server(&ctx, "inproc://pos_ctrl_server_invalid");
        let client = client(&ctx, "inproc://pos_ctrl_server_invalid");

        client.send("stop", 0).unwrap();
        let err = server.get_request().unwrap_err();
        assert!(matches!(err, PosCtrlServerError::InvalidRequest(_)));
        assert!(err.is_recoverable());

        let response: PosCtrlResponse =
            serde_json::from_str(&client.recv_string(0).unwrap().unwrap()).unwrap();
        assert_eq!(response, PosCtrlResponse::Invalid);

        // The socket is ready for the next request
        client.send(r#"{"x": 0.0, "y": 0.0, "stop": true}"#, 0).unwrap();
        assert!(server.get_request().unwrap().unwrap().stop);
    }

    #[test]
    fn test_failed_send_is_not_recoverable() {
        let ctx = zmq::Context::new();
        let server = server(&ctx, "inproc://pos_ctrl_server_failed_send");

        // A REP socket can't send without a pending request
        let err = server.send_response(&PosCtrlResponse::Ack).unwrap_err();
        assert!(matches!(err, PosCtrlServerError::SendError(_)));
        assert!(!err.is_recoverable());

        // No client has connected
        assert!(!server.is_connected());
    }

    #[test]
    fn test_parse_request() {
        assert_eq!(
            parse_request(r#"{"x": 2.0, "y": -1.0, "stop": false}"#).unwrap(),
            PosCtrlRequest::goto(2.0, -1.0)
        );

        // Stop flag is optional
        assert_eq!(
            parse_request(r#"{"x": 2.0, "y": -1.0}"#).unwrap(),
            PosCtrlRequest::goto(2.0, -1.0)
        );

        assert!(parse_request(r#"{"x": 0.0, "y": 0.0, "stop": true}"#)
            .unwrap()
            .stop);
    }

    #[test]
    fn test_parse_invalid_request() {
        for s in &["", "stop", r#"{"x": 1.0}"#, r#"{"x": "a", "y": 1.0}"#] {
            assert!(
                matches!(parse_request(s), Err(PosCtrlServerError::InvalidRequest(_))),
                "{:?} should be invalid",
                s
            );
        }
    }
}

//! # Position control telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use structopt::{clap::AppSettings, StructOpt};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A request made to the position control exec.
///
/// Requests carry no identity, the last request recieved always wins. When `stop` is set the
/// target coordinates are ignored.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosCtrlRequest {
    /// Target position along the X axis in meters.
    pub x: f64,

    /// Target position along the Y axis in meters.
    pub y: f64,

    /// Disarm position control and stop the platform.
    #[serde(default)]
    pub stop: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Response from the position control exec to a [`PosCtrlRequest`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PosCtrlResponse {
    /// The request has been fully applied
    Ack,

    /// The message recieved by the exec was not a valid request and has been ignored
    Invalid,
}

/// A position control command as entered by an operator.
#[derive(Debug, Copy, Clone, StructOpt)]
pub enum PosCtrlCmd {
    /// Move the platform to the given position.
    ///
    /// Sending a new target while already moving replaces the active target.
    #[structopt(name = "goto", setting = AppSettings::AllowNegativeNumbers)]
    Goto {
        /// Target position along the X axis in meters.
        x: f64,

        /// Target position along the Y axis in meters.
        y: f64,
    },

    /// Disarm position control and bring the platform to a stop.
    #[structopt(name = "stop")]
    Stop,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PosCtrlRequest {
    /// Request the platform moves to the given position.
    pub fn goto(x: f64, y: f64) -> Self {
        Self { x, y, stop: false }
    }

    /// Request the platform stops.
    pub fn stop() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            stop: true,
        }
    }
}

impl From<PosCtrlCmd> for PosCtrlRequest {
    fn from(cmd: PosCtrlCmd) -> Self {
        match cmd {
            PosCtrlCmd::Goto { x, y } => PosCtrlRequest::goto(x, y),
            PosCtrlCmd::Stop => PosCtrlRequest::stop(),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let req: PosCtrlRequest = serde_json::from_str(r#"{"x": 2.0, "y": -1.0, "stop": false}"#)
            .unwrap();
        assert_eq!(req, PosCtrlRequest::goto(2.0, -1.0));

        // Stop is optional on the wire
        let req: PosCtrlRequest = serde_json::from_str(r#"{"x": 1.0, "y": 1.0}"#).unwrap();
        assert!(!req.stop);

        let req: PosCtrlRequest = serde_json::from_str(r#"{"x": 0, "y": 0, "stop": true}"#)
            .unwrap();
        assert!(req.stop);
    }

    #[test]
    fn test_request_missing_target_rejected() {
        assert!(serde_json::from_str::<PosCtrlRequest>(r#"{"stop": true}"#).is_err());
    }

    #[test]
    fn test_cmd_from_args() {
        let cmd = PosCtrlCmd::from_iter_safe(&["pos_ctrl", "goto", "2.5", "-1.5"]).unwrap();
        assert_eq!(PosCtrlRequest::from(cmd), PosCtrlRequest::goto(2.5, -1.5));

        let cmd = PosCtrlCmd::from_iter_safe(&["pos_ctrl", "stop"]).unwrap();
        assert_eq!(PosCtrlRequest::from(cmd), PosCtrlRequest::stop());
    }
}

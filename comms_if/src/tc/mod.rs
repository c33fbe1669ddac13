//! # Telecommand module
//!
//! This module provides the commands which can be sent to the position control exec through its
//! request interface, and the responses the exec replies with.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod pos_ctrl;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use pos_ctrl::{PosCtrlCmd, PosCtrlRequest, PosCtrlResponse};

//! # Position control library.
//!
//! This library allows other crates in the workspace, and the integration tests, to access items
//! defined inside the position control crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Actuator client - publishes velocity commands to the platform
pub mod actuator;

/// Axis controller client - sends setpoints to and recieves outputs from the axis controllers
pub mod axis_ctrl;

/// Motion gate - decides whether controller outputs reach the actuators
pub mod motion_gate;

/// Parameters of the position control exec
pub mod params;

/// Position control server - recieves requests from clients
pub mod pos_ctrl_server;

//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the position control software: the request
//! interface exposed by the position control exec, the data streams exchanged with equipment (axis
//! controllers, the actuator, the transform server), and the networking layer they travel over.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Commands and responses for the position control request interface
pub mod tc;

/// Data definitions for equipment (axis controllers, actuator, transforms)
pub mod eqpt;

/// Network module
pub mod net;

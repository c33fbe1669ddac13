//! # Axis Controller Equipment Interface
//!
//! The position control exec drives one external closed-loop controller per planar axis. Each
//! controller consumes a setpoint and the current position along its axis, and emits a control
//! output which is the velocity demand for that axis.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// All axes which are independently controlled.
pub const AXES: [AxisId; 2] = [AxisId::X, AxisId::Y];

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Identifies one of the independently controlled planar axes.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum AxisId {
    X,
    Y,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single output emitted by an axis controller.
///
/// Feedback is ephemeral, it is consumed by the motion gate as soon as it arrives and is never
/// retained.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct AxisFeedback {
    /// The axis whose controller emitted this value
    pub axis: AxisId,

    /// The control output, i.e. the velocity demand along the axis in meters/second
    pub value: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl AxisId {
    /// Topic on which the setpoint for this axis' controller is published.
    pub fn setpoint_topic(&self) -> &'static str {
        match self {
            AxisId::X => "setpoint_x",
            AxisId::Y => "setpoint_y",
        }
    }

    /// Topic on which this axis' controller publishes its output.
    pub fn control_topic(&self) -> &'static str {
        match self {
            AxisId::X => "control_x",
            AxisId::Y => "control_y",
        }
    }

    /// Topic on which the current position along this axis is fed to the controller.
    pub fn state_topic(&self) -> &'static str {
        match self {
            AxisId::X => "x_pid",
            AxisId::Y => "y_pid",
        }
    }
}

impl AxisFeedback {
    pub fn new(axis: AxisId, value: f64) -> Self {
        Self { axis, value }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

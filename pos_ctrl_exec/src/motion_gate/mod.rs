//! # Motion Gate
//!
//! The motion gate sits between the per-axis position controllers and the platform's actuators.
//! It accepts position control requests, forwards the requested target to the axis controllers as
//! setpoints, and decides whether the controllers' outputs are allowed to reach the actuators.
//!
//! The gate has two states:
//!
//! - `Disarmed` (initial): controller outputs are discarded. Entering this state always publishes
//!   the zero velocity command.
//! - `Armed`: every controller output updates its component of the velocity command, and the full
//!   two axis command is published.
//!
//! A stop request always disarms the gate. Any other request forwards its target as setpoints and
//! arms the gate, including when the gate is already armed.
//!
//! The combined command is published on every single-axis output rather than once both axes have
//! reported, so one component may be up to one controller period old. Downstream consumers rely
//! on the resulting publish rate.
//!
//! [`MotionGate`] is the synchronous state machine. [`actor`] owns a gate on its own thread and
//! serialises requests and controller outputs arriving from different threads.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod actor;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::{axis::AxisId, vel::VelocityCommand};

pub use actor::{GateActor, GateHandle, GateSignal};
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Arm state of the gate.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GateState {
    /// Controller outputs are discarded
    Disarmed,

    /// Controller outputs are forwarded to the actuators
    Armed,
}

/// Errors which can occur when talking to a gate owned by a [`GateActor`].
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("The motion gate is not running, position control must be assumed disarmed")]
    Stopped,

    #[error("Could not spawn the motion gate thread: {0}")]
    SpawnError(std::io::Error),
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Destination for the setpoints of the axis controllers.
///
/// Sends are fire-and-forget, implementors must not block and must handle their own failures.
pub trait SetpointSink {
    /// Forward a new setpoint to the controller of the given axis.
    fn send_setpoint(&mut self, axis: AxisId, setpoint: f64);

    /// Re-send the most recent setpoint of every axis, so that controllers which started after the
    /// setpoint was first sent still recieve it.
    fn relatch(&mut self) {}
}

/// Destination for velocity commands, i.e. the platform's actuators.
///
/// Sends are fire-and-forget, implementors must not block and must handle their own failures.
pub trait VelocitySink {
    /// Apply the given velocity command to the platform.
    fn send_velocity(&mut self, cmd: VelocityCommand);
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for GateState {
    fn default() -> Self {
        GateState::Disarmed
    }
}

impl<T: SetpointSink + ?Sized> SetpointSink for Box<T> {
    fn send_setpoint(&mut self, axis: AxisId, setpoint: f64) {
        (**self).send_setpoint(axis, setpoint)
    }

    fn relatch(&mut self) {
        (**self).relatch()
    }
}

impl<T: VelocitySink + ?Sized> VelocitySink for Box<T> {
    fn send_velocity(&mut self, cmd: VelocityCommand) {
        (**self).send_velocity(cmd)
    }
}

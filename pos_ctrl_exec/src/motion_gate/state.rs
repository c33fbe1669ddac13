//! Implementations for the MotionGate state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use comms_if::{
    eqpt::{
        axis::{AxisFeedback, AxisId, AXES},
        vel::VelocityCommand,
    },
    tc::{PosCtrlRequest, PosCtrlResponse},
};
use log::{info, trace};

// Internal
use super::{GateState, SetpointSink, VelocitySink};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The motion gate state machine.
///
/// The gate exclusively owns the arm state and the velocity command. Both operations take
/// `&mut self`, so whoever owns the gate serialises them.
pub struct MotionGate<S, V> {
    state: GateState,

    /// The velocity command as last built from controller outputs. Never aliased, the actuator is
    /// given a copy on every publish.
    cmd: VelocityCommand,

    /// The target of the last non-stop request, `None` while disarmed.
    target: Option<(f64, f64)>,

    report: GateReport,

    setpoints: S,

    actuator: V,
}

/// Counters describing what the gate has done since it was created.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct GateReport {
    /// Number of requests recieved, including stops
    pub num_requests: u64,

    /// Number of times the gate was disarmed, whether by request or on shutdown
    pub num_disarms: u64,

    /// Number of controller outputs applied to the velocity command
    pub num_feedback_accepted: u64,

    /// Number of controller outputs discarded because the gate was disarmed
    pub num_feedback_discarded: u64,

    /// Number of velocity commands sent to the actuator
    pub num_publishes: u64,

    /// Number of times the setpoints were re-sent to the controllers
    pub num_relatches: u64,
}

/// A snapshot of the gate.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GateStatus {
    pub state: GateState,
    pub command: VelocityCommand,
    pub target: Option<(f64, f64)>,
    pub report: GateReport,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<S, V> MotionGate<S, V>
where
    S: SetpointSink,
    V: VelocitySink,
{
    /// Create a new gate, disarmed and holding the zero command.
    ///
    /// Nothing is sent to either sink on creation.
    pub fn new(setpoints: S, actuator: V) -> Self {
        Self {
            state: GateState::Disarmed,
            cmd: VelocityCommand::zero(),
            target: None,
            report: GateReport::default(),
            setpoints,
            actuator,
        }
    }

    /// Handle a position control request.
    ///
    /// When this function returns the request has been fully applied: on a stop the zero command
    /// has already been sent to the actuator, otherwise both setpoints have been sent to the
    /// controllers and the gate is armed.
    pub fn submit(&mut self, request: &PosCtrlRequest) -> PosCtrlResponse {
        self.report.num_requests += 1;

        if request.stop {
            info!("Stop requested");
            self.disarm();
            return PosCtrlResponse::Ack;
        }

        info!("Recieved request: target ({}, {})", request.x, request.y);

        for &axis in AXES.iter() {
            let setpoint = match axis {
                AxisId::X => request.x,
                AxisId::Y => request.y,
            };
            self.setpoints.send_setpoint(axis, setpoint);
        }
        self.target = Some((request.x, request.y));

        if self.state == GateState::Disarmed {
            info!("Position control armed");
        }
        self.state = GateState::Armed;

        PosCtrlResponse::Ack
    }

    /// Handle an output from one of the axis controllers.
    ///
    /// While disarmed the output is discarded. While armed the output replaces the command's
    /// component for its axis and the whole command is published, the other axis keeping the value
    /// from its own most recent output.
    pub fn on_feedback(&mut self, feedback: &AxisFeedback) {
        match self.state {
            GateState::Disarmed => {
                trace!("Disarmed, discarding {:?}", feedback);
                self.report.num_feedback_discarded += 1;
            }
            GateState::Armed => {
                self.cmd.set_linear(feedback.axis, feedback.value);
                self.report.num_feedback_accepted += 1;

                trace!(
                    "Publishing velocity ({}, {})",
                    self.cmd.linear.x,
                    self.cmd.linear.y
                );
                self.publish(self.cmd);
            }
        }
    }

    /// Disarm the gate and publish the zero command.
    ///
    /// The zero command is published even if the gate is already disarmed. Only the outgoing
    /// command is zero, the stored command keeps its components so that after the next arm the
    /// first output on one axis is published alongside the other axis' last value.
    pub fn disarm(&mut self) {
        if self.state == GateState::Armed {
            info!("Position control disarmed");
        }

        self.state = GateState::Disarmed;
        self.target = None;
        self.report.num_disarms += 1;

        self.publish(VelocityCommand::zero());
    }

    /// Re-send the current setpoints to the controllers, if armed.
    pub fn relatch(&mut self) {
        if self.state == GateState::Armed {
            self.report.num_relatches += 1;
            self.setpoints.relatch();
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn command(&self) -> VelocityCommand {
        self.cmd
    }

    pub fn target(&self) -> Option<(f64, f64)> {
        self.target
    }

    pub fn report(&self) -> GateReport {
        self.report
    }

    pub fn status(&self) -> GateStatus {
        GateStatus {
            state: self.state,
            command: self.cmd,
            target: self.target,
            report: self.report,
        }
    }

    pub fn setpoint_sink(&self) -> &S {
        &self.setpoints
    }

    pub fn velocity_sink(&self) -> &V {
        &self.actuator
    }

    fn publish(&mut self, cmd: VelocityCommand) {
        self.report.num_publishes += 1;
        self.actuator.send_velocity(cmd);
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

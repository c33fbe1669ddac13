//! Drives the motion gate through its actor, with feedback arriving from several threads at once.

use std::{
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

use comms_if::{
    eqpt::{
        axis::{AxisFeedback, AxisId},
        vel::VelocityCommand,
    },
    tc::{PosCtrlRequest, PosCtrlResponse},
};
use pos_ctrl_lib::motion_gate::{GateActor, GateError, GateState, MotionGate, SetpointSink, VelocitySink};

// ------------------------------------------------------------------------------------------------
// RECORDING SINKS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Setpoint(AxisId, f64),
    Velocity(VelocityCommand),
}

#[derive(Clone, Default)]
struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
}

impl Recorder {
    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn velocities(&self) -> Vec<VelocityCommand> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Velocity(v) => Some(v),
                _ => None,
            })
            .collect()
    }
}

impl SetpointSink for Recorder {
    fn send_setpoint(&mut self, axis: AxisId, setpoint: f64) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Setpoint(axis, setpoint));
    }
}

impl VelocitySink for Recorder {
    fn send_velocity(&mut self, cmd: VelocityCommand) {
        self.events.lock().unwrap().push(Event::Velocity(cmd));
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[test]
fn test_scenario() {
    let rec = Recorder::default();
    let (actor, gate) = GateActor::spawn(MotionGate::new(rec.clone(), rec.clone()), None).unwrap();

    assert_eq!(
        gate.submit(PosCtrlRequest::goto(2.0, -1.0)).unwrap(),
        PosCtrlResponse::Ack
    );
    gate.feedback(AxisFeedback::new(AxisId::X, 0.8)).unwrap();
    gate.feedback(AxisFeedback::new(AxisId::Y, -0.3)).unwrap();

    assert_eq!(
        gate.submit(PosCtrlRequest::stop()).unwrap(),
        PosCtrlResponse::Ack
    );
    assert_eq!(gate.status().unwrap().state, GateState::Disarmed);

    gate.feedback(AxisFeedback::new(AxisId::X, 0.8)).unwrap();

    gate.shutdown().unwrap();
    let report = actor.join().unwrap().report();

    assert_eq!(
        rec.events(),
        vec![
            Event::Setpoint(AxisId::X, 2.0),
            Event::Setpoint(AxisId::Y, -1.0),
            Event::Velocity(VelocityCommand::planar(0.8, 0.0)),
            Event::Velocity(VelocityCommand::planar(0.8, -0.3)),
            Event::Velocity(VelocityCommand::zero()),
            // Shutdown disarm
            Event::Velocity(VelocityCommand::zero()),
        ]
    );
    assert_eq!(report.num_feedback_accepted, 2);
    assert_eq!(report.num_feedback_discarded, 1);
}

#[test]
fn test_stop_wins_over_concurrent_feedback() {
    let rec = Recorder::default();
    let (actor, gate) = GateActor::spawn(MotionGate::new(rec.clone(), rec.clone()), None).unwrap();

    gate.submit(PosCtrlRequest::goto(5.0, 5.0)).unwrap();

    // One thread per axis, like the feedback listeners
    let feeders: Vec<_> = [AxisId::X, AxisId::Y]
        .iter()
        .map(|&axis| {
            let gate = gate.clone();
            thread::spawn(move || {
                for i in 0..200 {
                    if gate.feedback(AxisFeedback::new(axis, i as f64 * 0.01)).is_err() {
                        break;
                    }
                }
            })
        })
        .collect();

    thread::sleep(Duration::from_millis(1));
    gate.submit(PosCtrlRequest::stop()).unwrap();

    // Once the stop has been acknowledged nothing else may be published
    let published_at_stop = rec.velocities().len();
    assert_eq!(rec.velocities().last(), Some(&VelocityCommand::zero()));

    for f in feeders {
        f.join().unwrap();
    }

    let status = gate.status().unwrap();
    assert_eq!(status.state, GateState::Disarmed);
    assert_eq!(rec.velocities().len(), published_at_stop);
    assert_eq!(rec.velocities().last(), Some(&VelocityCommand::zero()));

    drop(gate);
    actor.join().unwrap();
    assert_eq!(rec.velocities().last(), Some(&VelocityCommand::zero()));
}

#[test]
fn test_rearm_keeps_other_axis_from_before_stop() {
    let rec = Recorder::default();
    let (actor, gate) = GateActor::spawn(MotionGate::new(rec.clone(), rec.clone()), None).unwrap();

    gate.submit(PosCtrlRequest::goto(1.0, 1.0)).unwrap();
    gate.feedback(AxisFeedback::new(AxisId::Y, 0.7)).unwrap();
    gate.submit(PosCtrlRequest::stop()).unwrap();

    // The stop publishes zero but the stored command is untouched
    let status = gate.status().unwrap();
    assert_eq!(rec.velocities().last(), Some(&VelocityCommand::zero()));
    assert_eq!(status.command, VelocityCommand::planar(0.0, 0.7));

    gate.submit(PosCtrlRequest::goto(-1.0, 3.0)).unwrap();
    gate.feedback(AxisFeedback::new(AxisId::X, 0.2)).unwrap();

    assert_eq!(
        gate.status().unwrap().command,
        VelocityCommand::planar(0.2, 0.7)
    );

    gate.shutdown().unwrap();
    actor.join().unwrap();

    assert_eq!(
        rec.velocities(),
        vec![
            VelocityCommand::planar(0.0, 0.7),
            VelocityCommand::zero(),
            VelocityCommand::planar(0.2, 0.7),
            VelocityCommand::zero(),
        ]
    );
}

#[test]
fn test_retarget_while_armed() {
    let rec = Recorder::default();
    let (actor, gate) = GateActor::spawn(MotionGate::new(rec.clone(), rec.clone()), None).unwrap();

    gate.submit(PosCtrlRequest::goto(1.0, 2.0)).unwrap();
    gate.feedback(AxisFeedback::new(AxisId::X, 0.5)).unwrap();
    gate.submit(PosCtrlRequest::goto(3.0, 4.0)).unwrap();
    gate.feedback(AxisFeedback::new(AxisId::Y, 0.1)).unwrap();

    let status = gate.status().unwrap();
    assert_eq!(status.state, GateState::Armed);
    assert_eq!(status.target, Some((3.0, 4.0)));

    // The x component is kept across a retarget
    assert_eq!(status.command, VelocityCommand::planar(0.5, 0.1));

    gate.shutdown().unwrap();
    actor.join().unwrap();

    assert_eq!(
        &rec.events()[..3],
        &[
            Event::Setpoint(AxisId::X, 1.0),
            Event::Setpoint(AxisId::Y, 2.0),
            Event::Velocity(VelocityCommand::planar(0.5, 0.0)),
        ]
    );
    assert_eq!(
        &rec.events()[3..5],
        &[Event::Setpoint(AxisId::X, 3.0), Event::Setpoint(AxisId::Y, 4.0)]
    );
}

#[test]
fn test_gate_gone_means_disarmed() {
    let rec = Recorder::default();
    let (actor, gate) = GateActor::spawn(MotionGate::new(rec.clone(), rec.clone()), None).unwrap();

    gate.submit(PosCtrlRequest::goto(1.0, 1.0)).unwrap();
    gate.shutdown().unwrap();
    let stopped = actor.join().unwrap();

    assert_eq!(stopped.state(), GateState::Disarmed);
    assert!(matches!(
        gate.submit(PosCtrlRequest::goto(1.0, 1.0)),
        Err(GateError::Stopped)
    ));
    assert!(matches!(gate.status(), Err(GateError::Stopped)));
    assert_eq!(rec.velocities(), vec![VelocityCommand::zero()]);
}

//! # Gate actor
//!
//! Runs a [`MotionGate`] on a dedicated thread. Requests and controller outputs from any number of
//! threads are sent to the gate as [`GateSignal`]s over a single channel, so the gate handles them
//! one at a time, in the order they arrive, without any locking.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::{
    sync::mpsc::{channel, sync_channel, Receiver, RecvTimeoutError, Sender, SyncSender},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use comms_if::{
    eqpt::axis::AxisFeedback,
    tc::{PosCtrlRequest, PosCtrlResponse},
};
use log::{info, warn};

use super::{GateError, GateStatus, MotionGate, SetpointSink, VelocitySink};

// -----------------------------------------------------------------------------------------------
// STRUCTS
// -----------------------------------------------------------------------------------------------

/// Owns the thread a gate runs on.
pub struct GateActor<S, V> {
    jh: JoinHandle<MotionGate<S, V>>,
}

/// Handle used to talk to a gate running in a [`GateActor`].
///
/// Handles are cheap to clone, give one to every source of requests or controller outputs.
#[derive(Clone)]
pub struct GateHandle {
    sender: Sender<GateSignal>,
}

// -----------------------------------------------------------------------------------------------
// ENUMS
// -----------------------------------------------------------------------------------------------

#[derive(Debug)]
pub enum GateSignal {
    /// A position control request, and where to send the response once it has been applied
    Request(PosCtrlRequest, SyncSender<PosCtrlResponse>),

    /// An output from one of the axis controllers
    Feedback(AxisFeedback),

    /// Request a snapshot of the gate
    Status(SyncSender<GateStatus>),

    /// Disarm the gate and stop the thread
    Shutdown,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl<S, V> GateActor<S, V>
where
    S: SetpointSink + Send + 'static,
    V: VelocitySink + Send + 'static,
{
    /// Move the gate onto its own thread.
    ///
    /// If `relatch_period` is given the setpoints are re-sent to the controllers at that period
    /// while the gate is armed.
    pub fn spawn(
        gate: MotionGate<S, V>,
        relatch_period: Option<Duration>,
    ) -> Result<(Self, GateHandle), GateError> {
        let (sender, receiver) = channel();

        let jh = thread::Builder::new()
            .name("motion_gate".into())
            .spawn(move || gate_thread(gate, receiver, relatch_period))
            .map_err(GateError::SpawnError)?;

        Ok((Self { jh }, GateHandle { sender }))
    }

    /// Wait for the gate thread to exit, returning the gate.
    ///
    /// The thread exits once [`GateHandle::shutdown`] has been called or every handle has been
    /// dropped. `None` is returned if the thread panicked.
    pub fn join(self) -> Option<MotionGate<S, V>> {
        self.jh.join().ok()
    }
}

impl GateHandle {
    /// Submit a request to the gate and wait until it has been applied.
    ///
    /// Once this returns every controller output sent afterwards, from any thread, is handled with
    /// the request already in effect.
    pub fn submit(&self, request: PosCtrlRequest) -> Result<PosCtrlResponse, GateError> {
        let (ack_sender, ack_receiver) = sync_channel(1);

        self.sender
            .send(GateSignal::Request(request, ack_sender))
            .map_err(|_| GateError::Stopped)?;

        ack_receiver.recv().map_err(|_| GateError::Stopped)
    }

    /// Pass a controller output to the gate, without waiting for it to be handled.
    pub fn feedback(&self, feedback: AxisFeedback) -> Result<(), GateError> {
        self.sender
            .send(GateSignal::Feedback(feedback))
            .map_err(|_| GateError::Stopped)
    }

    /// Get a snapshot of the gate.
    pub fn status(&self) -> Result<GateStatus, GateError> {
        let (status_sender, status_receiver) = sync_channel(1);

        self.sender
            .send(GateSignal::Status(status_sender))
            .map_err(|_| GateError::Stopped)?;

        status_receiver.recv().map_err(|_| GateError::Stopped)
    }

    /// Ask the gate to disarm and stop.
    ///
    /// Signals sent before the shutdown are still handled.
    pub fn shutdown(&self) -> Result<(), GateError> {
        self.sender
            .send(GateSignal::Shutdown)
            .map_err(|_| GateError::Stopped)
    }
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

fn gate_thread<S, V>(
    mut gate: MotionGate<S, V>,
    receiver: Receiver<GateSignal>,
    relatch_period: Option<Duration>,
) -> MotionGate<S, V>
where
    S: SetpointSink,
    V: VelocitySink,
{
    // A period too long to schedule never relatches
    let mut next_relatch = relatch_period.and_then(|p| Instant::now().checked_add(p));

    loop {
        let signal = match next_relatch {
            Some(deadline) => {
                match receiver.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                    Ok(s) => Some(s),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match receiver.recv() {
                Ok(s) => Some(s),
                Err(_) => break,
            },
        };

        match signal {
            Some(GateSignal::Request(request, ack_sender)) => {
                let response = gate.submit(&request);

                if ack_sender.send(response).is_err() {
                    warn!("Requester went away before {:?} was acknowledged", request);
                }
            }
            Some(GateSignal::Feedback(feedback)) => gate.on_feedback(&feedback),
            Some(GateSignal::Status(status_sender)) => {
                status_sender.send(gate.status()).ok();
            }
            Some(GateSignal::Shutdown) => break,
            None => (),
        }

        // Relatch on the period even when signals keep arriving
        if let (Some(deadline), Some(period)) = (next_relatch, relatch_period) {
            let now = Instant::now();
            if now >= deadline {
                gate.relatch();
                next_relatch = now.checked_add(period);
            }
        }
    }

    info!("Motion gate stopping");
    gate.disarm();

    gate
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::motion_gate::GateState;
    use comms_if::eqpt::{axis::AxisId, vel::VelocityCommand};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorder {
        velocities: Arc<Mutex<Vec<VelocityCommand>>>,
        relatches: Arc<Mutex<usize>>,
    }

    impl SetpointSink for Recorder {
        fn send_setpoint(&mut self, _axis: AxisId, _setpoint: f64) {}

        fn relatch(&mut self) {
            *self.relatches.lock().unwrap() += 1;
        }
    }

    impl VelocitySink for Recorder {
        fn send_velocity(&mut self, cmd: VelocityCommand) {
            self.velocities.lock().unwrap().push(cmd);
        }
    }

    #[test]
    fn test_submit_then_feedback_is_ordered() {
        let rec = Recorder::default();
        let (actor, handle) =
            GateActor::spawn(MotionGate::new(rec.clone(), rec.clone()), None).unwrap();

        handle.submit(PosCtrlRequest::goto(1.0, 1.0)).unwrap();
        handle.feedback(AxisFeedback::new(AxisId::X, 0.4)).unwrap();

        let status = handle.status().unwrap();
        assert_eq!(status.state, GateState::Armed);
        assert_eq!(status.command, VelocityCommand::planar(0.4, 0.0));

        handle.shutdown().unwrap();
        let gate = actor.join().unwrap();
        assert_eq!(gate.state(), GateState::Disarmed);

        assert_eq!(
            *rec.velocities.lock().unwrap(),
            vec![VelocityCommand::planar(0.4, 0.0), VelocityCommand::zero()]
        );
    }

    #[test]
    fn test_dropping_handles_disarms() {
        let rec = Recorder::default();
        let (actor, handle) =
            GateActor::spawn(MotionGate::new(rec.clone(), rec.clone()), None).unwrap();

        handle.submit(PosCtrlRequest::goto(1.0, 1.0)).unwrap();
        drop(handle);

        actor.join().unwrap();
        assert_eq!(
            *rec.velocities.lock().unwrap(),
            vec![VelocityCommand::zero()]
        );
    }

    #[test]
    fn test_handle_reports_stopped() {
        let rec = Recorder::default();
        let (actor, handle) =
            GateActor::spawn(MotionGate::new(rec.clone(), rec.clone()), None).unwrap();

        handle.shutdown().unwrap();
        actor.join().unwrap();

        assert!(matches!(
            handle.submit(PosCtrlRequest::stop()),
            Err(GateError::Stopped)
        ));
        assert!(matches!(
            handle.feedback(AxisFeedback::new(AxisId::Y, 1.0)),
            Err(GateError::Stopped)
        ));
    }

    #[test]
    fn test_relatch_runs_while_armed() {
        let rec = Recorder::default();
        let (actor, handle) = GateActor::spawn(
            MotionGate::new(rec.clone(), rec.clone()),
            Some(Duration::from_millis(5)),
        )
        .unwrap();

        // Disarmed, nothing is relatched
        thread::sleep(Duration::from_millis(30));
        assert_eq!(*rec.relatches.lock().unwrap(), 0);

        handle.submit(PosCtrlRequest::goto(1.0, 1.0)).unwrap();
        thread::sleep(Duration::from_millis(50));
        handle.shutdown().unwrap();
        actor.join().unwrap();

        assert!(*rec.relatches.lock().unwrap() >= 1);

        // Relatching never publishes, only the shutdown disarm does
        assert_eq!(
            *rec.velocities.lock().unwrap(),
            vec![VelocityCommand::zero()]
        );
    }

    #[test]
    fn test_unschedulable_relatch_period() {
        let rec = Recorder::default();
        let (actor, handle) = GateActor::spawn(
            MotionGate::new(rec.clone(), rec.clone()),
            Some(Duration::from_secs(std::u64::MAX)),
        )
        .unwrap();

        handle.submit(PosCtrlRequest::goto(1.0, 1.0)).unwrap();
        assert_eq!(handle.status().unwrap().state, GateState::Armed);

        handle.shutdown().unwrap();
        actor.join().unwrap();
        assert_eq!(*rec.relatches.lock().unwrap(), 0);
    }
}

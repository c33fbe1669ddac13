//! # Pose Sensor
//!
//! Looks up where the platform is and splits its position into one channel per axis, which are
//! the feeds the axis controllers consume. Lookup failures are transient: the cycle is skipped and
//! nothing is published.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    thread,
    time::{Duration, Instant},
};

use comms_if::eqpt::{
    axis::{AxisId, AXES},
    tf::{TfError, Transform},
};
use log::{debug, info, warn};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Something which can provide the transform between two frames.
pub trait TransformSource {
    /// Get the latest transform from `source` into `target`.
    fn lookup_transform(&mut self, target: &str, source: &str) -> Result<Transform, TfError>;
}

/// Destination for the per-axis position of the platform.
pub trait PoseSink {
    fn send_position(&mut self, axis: AxisId, position: f64);
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct PoseSensor<T, P> {
    source: T,
    sink: P,

    target_frame: String,
    source_frame: String,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PoseSensorError {
    #[error("Failed to lookup the transform from {source_frame} to {target_frame}: {err}")]
    LookupFailed {
        target_frame: String,
        source_frame: String,
        err: TfError,
    },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<T, P> PoseSensor<T, P>
where
    T: TransformSource,
    P: PoseSink,
{
    pub fn new(source: T, sink: P, target_frame: &str, source_frame: &str) -> Self {
        Self {
            source,
            sink,
            target_frame: target_frame.into(),
            source_frame: source_frame.into(),
        }
    }

    /// Wait until the transform can be looked up, polling at the given period.
    ///
    /// Returns `false` if the transform was still not available after `timeout`. Callers are
    /// expected to carry on regardless, later lookups may still succeed.
    pub fn wait_for_transform(&mut self, timeout: Duration, poll_period: Duration) -> bool {
        info!("Waiting for transform...");

        let start = Instant::now();

        loop {
            match self.lookup() {
                Ok(_) => {
                    info!(
                        "Transform available after {:.03} s",
                        start.elapsed().as_secs_f64()
                    );
                    return true;
                }
                Err(e) => debug!("{}", e),
            }

            if start.elapsed() >= timeout {
                warn!(
                    "Transform from {} to {} still unavailable after {:.03} s",
                    self.source_frame,
                    self.target_frame,
                    timeout.as_secs_f64()
                );
                return false;
            }

            thread::sleep(poll_period);
        }
    }

    /// Look up the current position and publish it, x first then y.
    ///
    /// If the lookup fails nothing is published.
    pub fn broadcast(&mut self) -> Result<Transform, PoseSensorError> {
        let transform = self.lookup()?;

        for (i, &axis) in AXES.iter().enumerate() {
            self.sink.send_position(axis, transform.translation[i]);
        }

        debug!(
            "Published position ({}, {})",
            transform.translation[0], transform.translation[1]
        );

        Ok(transform)
    }

    fn lookup(&mut self) -> Result<Transform, PoseSensorError> {
        self.source
            .lookup_transform(&self.target_frame, &self.source_frame)
            .map_err(|err| PoseSensorError::LookupFailed {
                target_frame: self.target_frame.clone(),
                source_frame: self.source_frame.clone(),
                err,
            })
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::VecDeque;

    /// Replies with the queued results, then fails every lookup
    #[derive(Default)]
    struct MockSource {
        replies: VecDeque<Result<Transform, TfError>>,
        requests: Vec<(String, String)>,
    }

    #[derive(Default)]
    struct MockSink {
        sent: Vec<(AxisId, f64)>,
    }

    impl TransformSource for MockSource {
        fn lookup_transform(&mut self, target: &str, source: &str) -> Result<Transform, TfError> {
            self.requests.push((target.into(), source.into()));
            self.replies
                .pop_front()
                .unwrap_or_else(|| Err(TfError::Lookup("no transform".into())))
        }
    }

    impl PoseSink for MockSink {
        fn send_position(&mut self, axis: AxisId, position: f64) {
            self.sent.push((axis, position));
        }
    }

    fn transform(x: f64, y: f64) -> Transform {
        Transform {
            translation: [x, y, 0.3],
            rotation: [0.0, 0.0, 0.0, 1.0],
        }
    }

    fn sensor(replies: Vec<Result<Transform, TfError>>) -> PoseSensor<MockSource, MockSink> {
        PoseSensor::new(
            MockSource {
                replies: replies.into(),
                ..Default::default()
            },
            MockSink::default(),
            "world",
            "base_link",
        )
    }

    #[test]
    fn test_broadcast() {
        let mut s = sensor(vec![Ok(transform(1.5, -2.0))]);

        s.broadcast().unwrap();

        assert_eq!(
            s.source.requests,
            vec![("world".to_string(), "base_link".to_string())]
        );
        assert_eq!(s.sink.sent, vec![(AxisId::X, 1.5), (AxisId::Y, -2.0)]);
    }

    #[test]
    fn test_broadcast_skips_on_failure() {
        let mut s = sensor(vec![
            Err(TfError::Lookup("unknown frame".into())),
            Err(TfError::Connectivity("not connected".into())),
            Err(TfError::Extrapolation("too old".into())),
            Ok(transform(0.2, 0.1)),
        ]);

        for _ in 0..3 {
            assert!(matches!(
                s.broadcast(),
                Err(PoseSensorError::LookupFailed { .. })
            ));
            assert!(s.sink.sent.is_empty());
        }

        // Failures don't stop later cycles
        s.broadcast().unwrap();
        assert_eq!(s.sink.sent, vec![(AxisId::X, 0.2), (AxisId::Y, 0.1)]);
    }

    #[test]
    fn test_wait_for_transform() {
        let mut s = sensor(vec![
            Err(TfError::Lookup("not yet".into())),
            Err(TfError::Lookup("not yet".into())),
            Ok(transform(0.0, 0.0)),
        ]);

        assert!(s.wait_for_transform(Duration::from_secs(1), Duration::from_millis(1)));
        assert_eq!(s.source.requests.len(), 3);

        // Waiting never publishes
        assert!(s.sink.sent.is_empty());
    }

    #[test]
    fn test_wait_for_transform_timeout() {
        let mut s = sensor(vec![]);

        assert!(!s.wait_for_transform(Duration::from_millis(20), Duration::from_millis(5)));
        assert!(s.source.requests.len() >= 2);
    }
}

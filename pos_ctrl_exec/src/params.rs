//! # Position Control Executable Parameters
//!
//! This module provide parameters for the position control executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::axis::AxisId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PosCtrlExecParams {
    /// Minimum log level, e.g. `"info"` or `"trace"`
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Network endpoint the request server binds to
    pub request_endpoint: String,

    /// Time to wait for a request before checking on the rest of the exec, in milliseconds
    #[serde(default = "default_request_recv_timeout_ms")]
    pub request_recv_timeout_ms: i32,

    /// Network endpoint the setpoint publisher binds to
    pub setpoint_endpoint: String,

    /// Period at which setpoints are re-sent to the axis controllers while armed, in seconds. Zero
    /// disables relatching.
    #[serde(default)]
    pub setpoint_relatch_period_s: f64,

    /// Network endpoints of the axis controllers' outputs
    pub control_endpoints: AxisEndpoints,

    /// Network endpoint the velocity command publisher binds to
    pub cmd_vel_endpoint: String,

    /// Number of consecutive velocity publish failures after which an error is raised
    #[serde(default = "default_max_consec_publish_failures")]
    pub max_consec_publish_failures: u64,
}

/// One endpoint per controlled axis.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AxisEndpoints {
    pub x: String,
    pub y: String,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PosCtrlExecParams {
    /// The relatch period, or `None` if relatching is disabled.
    ///
    /// A period which is not a positive number of seconds that fits in a [`Duration`], such as
    /// `inf`, disables relatching.
    pub fn relatch_period(&self) -> Option<Duration> {
        if self.setpoint_relatch_period_s > 0.0 {
            util::time::seconds_to_duration(self.setpoint_relatch_period_s)
        } else {
            None
        }
    }
}

impl AxisEndpoints {
    pub fn get(&self, axis: AxisId) -> &str {
        match axis {
            AxisId::X => &self.x,
            AxisId::Y => &self.y,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn default_log_level() -> String {
    "info".into()
}

fn default_request_recv_timeout_ms() -> i32 {
    200
}

fn default_max_consec_publish_failures() -> u64 {
    5
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const PARAMS: &str = r#"
        request_endpoint = "tcp://*:5100"
        setpoint_endpoint = "tcp://*:5101"
        cmd_vel_endpoint = "tcp://*:5102"
        setpoint_relatch_period_s = 0.5

        [control_endpoints]
        x = "tcp://localhost:5111"
        y = "tcp://localhost:5112"
    "#;

    #[test]
    fn test_load() {
        let params: PosCtrlExecParams = util::params::from_toml_str(PARAMS).unwrap();

        assert_eq!(params.log_level, "info");
        assert_eq!(params.request_recv_timeout_ms, 200);
        assert_eq!(params.control_endpoints.get(AxisId::Y), "tcp://localhost:5112");
        assert_eq!(params.relatch_period(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_relatch_disabled() {
        let mut params: PosCtrlExecParams = util::params::from_toml_str(PARAMS).unwrap();

        params.setpoint_relatch_period_s = 0.0;
        assert_eq!(params.relatch_period(), None);
    }

    #[test]
    fn test_relatch_unrepresentable() {
        let params: PosCtrlExecParams = util::params::from_toml_str(
            &PARAMS.replace("setpoint_relatch_period_s = 0.5", "setpoint_relatch_period_s = inf"),
        )
        .unwrap();
        assert_eq!(params.relatch_period(), None);

        for &p in &[std::f64::NAN, -0.5, 1e30] {
            let params = PosCtrlExecParams {
                setpoint_relatch_period_s: p,
                ..params.clone()
            };
            assert_eq!(params.relatch_period(), None, "{} should disable relatching", p);
        }
    }
}

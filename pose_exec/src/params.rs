//! # Pose Executable Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;
use std::time::Duration;
use util::time::seconds_to_duration;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Deserialize, Debug, Clone)]
pub struct PoseExecParams {
    /// Minimum log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Endpoint of the transform server
    pub tf_endpoint: String,

    /// Time to wait for the transform server to reply, in milliseconds
    #[serde(default = "default_tf_timeout_ms")]
    pub tf_timeout_ms: i32,

    /// Endpoint the pose publisher binds to
    pub pose_endpoint: String,

    /// Frame the pose is expressed in
    #[serde(default = "default_target_frame")]
    pub target_frame: String,

    /// Frame of the platform
    #[serde(default = "default_source_frame")]
    pub source_frame: String,

    /// Target period of one cycle
    #[serde(default = "default_cycle_period_s")]
    pub cycle_period_s: f64,

    /// Time to wait for the first transform to become available at startup
    #[serde(default = "default_wait_timeout_s")]
    pub wait_timeout_s: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PoseExecParams {
    /// Values which aren't a valid number of seconds fall back to the default.
    pub fn cycle_period(&self) -> Duration {
        seconds_to_duration(self.cycle_period_s)
            .unwrap_or_else(|| Duration::from_secs_f64(default_cycle_period_s()))
    }

    /// Values which aren't a valid number of seconds fall back to the default.
    pub fn wait_timeout(&self) -> Duration {
        seconds_to_duration(self.wait_timeout_s)
            .unwrap_or_else(|| Duration::from_secs_f64(default_wait_timeout_s()))
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn default_log_level() -> String {
    "info".into()
}

fn default_tf_timeout_ms() -> i32 {
    100
}

fn default_target_frame() -> String {
    "world".into()
}

fn default_source_frame() -> String {
    "base_link".into()
}

fn default_cycle_period_s() -> f64 {
    0.1
}

fn default_wait_timeout_s() -> f64 {
    5.0
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let params: PoseExecParams = util::params::from_toml_str(
            r#"
            tf_endpoint = "tcp://localhost:5120"
            pose_endpoint = "tcp://*:5121"
            "#,
        )
        .unwrap();

        assert_eq!(params.target_frame, "world");
        assert_eq!(params.source_frame, "base_link");
        assert_eq!(params.wait_timeout(), Duration::from_secs(5));
        assert_eq!(params.cycle_period(), Duration::from_millis(100));
    }

    #[test]
    fn test_invalid_periods_use_defaults() {
        let params: PoseExecParams = util::params::from_toml_str(
            r#"
            tf_endpoint = "tcp://localhost:5120"
            pose_endpoint = "tcp://*:5121"
            cycle_period_s = inf
            wait_timeout_s = -2.0
            "#,
        )
        .unwrap();

        assert_eq!(params.cycle_period(), Duration::from_millis(100));
        assert_eq!(params.wait_timeout(), Duration::from_secs(5));

        let params = PoseExecParams {
            cycle_period_s: 0.02,
            wait_timeout_s: std::f64::NAN,
            ..params
        };
        assert_eq!(params.cycle_period(), Duration::from_millis(20));
        assert_eq!(params.wait_timeout(), Duration::from_secs(5));
    }
}

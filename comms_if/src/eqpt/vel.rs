//! # Velocity Command Equipment Interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::axis::AxisId;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Topic on which velocity commands are published to the platform.
pub const CMD_VEL_TOPIC: &str = "cmd_vel";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A three component vector.
#[derive(Serialize, Deserialize, Debug, Default, Copy, Clone, PartialEq)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Velocity demand sent to the platform's actuators.
///
/// Only `linear.x` and `linear.y` are ever set by position control, all other components are held
/// at zero.
#[derive(Serialize, Deserialize, Debug, Default, Copy, Clone, PartialEq)]
pub struct VelocityCommand {
    /// Linear velocity in meters/second
    pub linear: Vector3,

    /// Angular velocity in radians/second
    pub angular: Vector3,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl VelocityCommand {
    /// The zero command, which brings the platform to a stop.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Build a planar command from the x and y linear components.
    pub fn planar(linear_x: f64, linear_y: f64) -> Self {
        Self {
            linear: Vector3 {
                x: linear_x,
                y: linear_y,
                z: 0.0,
            },
            ..Default::default()
        }
    }

    /// Get the linear component along the given axis.
    pub fn linear(&self, axis: AxisId) -> f64 {
        match axis {
            AxisId::X => self.linear.x,
            AxisId::Y => self.linear.y,
        }
    }

    /// Set the linear component along the given axis, leaving every other component untouched.
    pub fn set_linear(&mut self, axis: AxisId, value: f64) {
        match axis {
            AxisId::X => self.linear.x = value,
            AxisId::Y => self.linear.y = value,
        }
    }

    /// Returns true if every component of the command is zero.
    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_set_linear_only_touches_axis() {
        let mut cmd = VelocityCommand::zero();

        cmd.set_linear(AxisId::X, 0.8);
        assert_eq!(cmd, VelocityCommand::planar(0.8, 0.0));

        cmd.set_linear(AxisId::Y, -0.3);
        assert_eq!(cmd, VelocityCommand::planar(0.8, -0.3));
        assert_eq!(cmd.linear(AxisId::X), 0.8);
        assert_eq!(cmd.linear(AxisId::Y), -0.3);
        assert_eq!(cmd.linear.z, 0.0);
        assert_eq!(cmd.angular, Vector3::default());
    }

    #[test]
    fn test_zero() {
        assert!(VelocityCommand::zero().is_zero());
        assert!(!VelocityCommand::planar(0.0, 1e-9).is_zero());
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_string(&VelocityCommand::planar(1.5, -2.0)).unwrap();
        assert_eq!(
            json,
            r#"{"linear":{"x":1.5,"y":-2.0,"z":0.0},"angular":{"x":0.0,"y":0.0,"z":0.0}}"#
        );
    }
}

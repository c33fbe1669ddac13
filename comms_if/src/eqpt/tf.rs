//! # Transform Equipment Interface
//!
//! Requests and replies exchanged with the transform server, which tracks the relationship between
//! coordinate frames (for example `world` and `base_link`).

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Request the latest available transform between two frames.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TfRequest {
    /// The frame the transform maps into
    pub target_frame: String,

    /// The frame the transform maps from
    pub source_frame: String,
}

/// A rigid body transform.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq)]
pub struct Transform {
    /// Translation in meters
    pub translation: [f64; 3],

    /// Rotation as a quaternion, `[x, y, z, w]`
    pub rotation: [f64; 4],
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Replies that can be sent by the transform server
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum TfResponse {
    /// The requested transform
    Transform(Transform),

    /// The transform could not be provided
    Error(TfError),
}

/// Reasons the transform server could not provide a transform.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, thiserror::Error)]
pub enum TfError {
    #[error("Lookup failed: {0}")]
    Lookup(String),

    #[error("Frames are not connected: {0}")]
    Connectivity(String),

    #[error("Extrapolation required: {0}")]
    Extrapolation(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TfRequest {
    pub fn new(target_frame: &str, source_frame: &str) -> Self {
        Self {
            target_frame: target_frame.into(),
            source_frame: source_frame.into(),
        }
    }
}

impl From<TfResponse> for Result<Transform, TfError> {
    fn from(response: TfResponse) -> Self {
        match response {
            TfResponse::Transform(t) => Ok(t),
            TfResponse::Error(e) => Err(e),
        }
    }
}

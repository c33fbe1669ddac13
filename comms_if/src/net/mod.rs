//! # Network Module
//!
//! This module provides networking abstractions over ZMQ, the networking library chosen for the
//! software.
//!
//! Streamed data (setpoints, controller outputs, poses, velocity commands) is sent over PUB/SUB
//! sockets as `"<topic> <json payload>"` strings. The topic comes first so that subscribers can use
//! ZMQ's prefix filtering with [`zmq::Socket::set_subscribe`].

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod socket;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{de::DeserializeOwned, Serialize};

// Export zmq
pub use zmq;

pub use socket::{MonitoredSocket, MonitoredSocketError, SocketOptions};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur while unpacking a topic message.
#[derive(thiserror::Error, Debug)]
pub enum TopicMsgError {
    #[error("The message has no topic separator")]
    NoSeparator,

    #[error("Expected a message on topic \"{expected}\", found \"{found}\"")]
    WrongTopic { expected: String, found: String },

    #[error("Could not deserialize the payload: {0}")]
    DeserializeError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Pack a payload for sending on the given topic.
pub fn pack_topic_msg<T: Serialize>(topic: &str, payload: &T) -> Result<String, serde_json::Error> {
    Ok(format!("{} {}", topic, serde_json::to_string(payload)?))
}

/// Unpack a message recieved on the given topic.
pub fn unpack_topic_msg<T: DeserializeOwned>(topic: &str, msg: &str) -> Result<T, TopicMsgError> {
    let (found, payload) = split_topic_msg(msg).ok_or(TopicMsgError::NoSeparator)?;

    if found != topic {
        return Err(TopicMsgError::WrongTopic {
            expected: topic.into(),
            found: found.into(),
        });
    }

    serde_json::from_str(payload).map_err(TopicMsgError::DeserializeError)
}

/// Split a message into its topic and payload.
pub fn split_topic_msg(msg: &str) -> Option<(&str, &str)> {
    let mut parts = msg.splitn(2, ' ');

    match (parts.next(), parts.next()) {
        (Some(topic), Some(payload)) if !topic.is_empty() => Some((topic, payload)),
        _ => None,
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_pack_unpack() {
        let msg = pack_topic_msg("control_x", &0.8f64).unwrap();
        assert_eq!(msg, "control_x 0.8");

        let value: f64 = unpack_topic_msg("control_x", &msg).unwrap();
        assert_eq!(value, 0.8);
    }

    #[test]
    fn test_unpack_wrong_topic() {
        match unpack_topic_msg::<f64>("control_x", "control_y 0.8") {
            Err(TopicMsgError::WrongTopic { expected, found }) => {
                assert_eq!(expected, "control_x");
                assert_eq!(found, "control_y");
            }
            r => panic!("Expected a wrong topic error, got {:?}", r),
        }
    }

    #[test]
    fn test_unpack_malformed() {
        assert!(matches!(
            unpack_topic_msg::<f64>("control_x", "control_x"),
            Err(TopicMsgError::NoSeparator)
        ));
        assert!(matches!(
            unpack_topic_msg::<f64>("control_x", " 0.8"),
            Err(TopicMsgError::NoSeparator)
        ));
        assert!(matches!(
            unpack_topic_msg::<f64>("control_x", "control_x fast"),
            Err(TopicMsgError::DeserializeError(_))
        ));
    }

    #[test]
    fn test_split_keeps_spaces_in_payload() {
        assert_eq!(
            split_topic_msg(r#"cmd_vel {"a": 1}"#),
            Some(("cmd_vel", r#"{"a": 1}"#))
        );
    }
}

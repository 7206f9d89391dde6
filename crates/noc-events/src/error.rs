//! Error types for the noc-events crate.

use thiserror::Error;

/// Errors that can occur during event operations.
#[derive(Debug, Error)]
pub enum EventError {
    /// Failed to publish event to topic.
    #[error("Failed to publish to topic {topic}: {cause}")]
    PublishFailed { topic: String, cause: String },

    /// Failed to serialize event.
    #[error("Failed to serialize event type {event_type}: {cause}")]
    SerializationFailed { event_type: String, cause: String },

    /// Failed to deserialize event.
    #[error("Failed to deserialize event type {event_type}: {raw}")]
    DeserializationFailed { event_type: String, raw: String },

    /// Invalid event envelope.
    #[error("Invalid event envelope: {reason}")]
    InvalidEnvelope { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EventError::PublishFailed {
            topic: "noc.incident.created".to_string(),
            cause: "socket closed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to publish to topic noc.incident.created: socket closed"
        );

        let err = EventError::InvalidEnvelope {
            reason: "event_type is empty".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid event envelope: event_type is empty");
    }
}

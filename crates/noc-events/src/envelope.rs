//! Envelopes carried across the publisher seam.
//!
//! A typed [`EventEnvelope`] is built by the service that emits the event.
//! Before it reaches an [`crate::EventPublisher`] the payload is erased to
//! JSON, giving a [`RawEnvelope`] that subscribers can route on
//! `event_type` and later decode with [`RawEnvelope::downcast`].

use crate::error::EventError;
use crate::event::Event;
use chrono::{DateTime, Utc};
use noc_core::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix every NOC event type carries.
pub const EVENT_TYPE_PREFIX: &str = "noc.";

/// An event plus the metadata subscribers route and deduplicate on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope<T> {
    pub event_id: Uuid,
    /// `noc.<entity>.<action>`
    pub event_type: String,
    /// `None` when the engine itself raised the event, e.g. an SLA sweep.
    pub actor_id: Option<UserId>,
    pub timestamp: DateTime<Utc>,
    pub payload: T,
}

impl<T: Event> EventEnvelope<T> {
    /// Wrap `payload` with a fresh event id.
    pub fn new(payload: T, actor_id: Option<UserId>, timestamp: DateTime<Utc>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type: T::EVENT_TYPE.to_string(),
            actor_id,
            timestamp,
            payload,
        }
    }

    pub fn topic(&self) -> &'static str {
        T::TOPIC
    }

    /// Convert the payload to JSON, keeping the metadata.
    pub fn into_raw(self) -> Result<RawEnvelope, EventError> {
        let Self {
            event_id,
            event_type,
            actor_id,
            timestamp,
            payload,
        } = self;

        let payload = serde_json::to_value(payload).map_err(|e| {
            EventError::SerializationFailed {
                event_type: event_type.clone(),
                cause: e.to_string(),
            }
        })?;

        Ok(RawEnvelope {
            event_id,
            event_type,
            actor_id,
            timestamp,
            payload,
        })
    }
}

/// Envelope with a JSON payload of unknown type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawEnvelope {
    pub event_id: Uuid,
    pub event_type: String,
    pub actor_id: Option<UserId>,
    pub timestamp: DateTime<Utc>,
    pub payload: serde_json::Value,
}

impl RawEnvelope {
    /// Wire form handed to a transport.
    pub fn encode(&self) -> Result<Vec<u8>, EventError> {
        serde_json::to_vec(self).map_err(|e| EventError::SerializationFailed {
            event_type: self.event_type.clone(),
            cause: e.to_string(),
        })
    }

    /// Parse the wire form produced by [`RawEnvelope::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self, EventError> {
        serde_json::from_slice(bytes).map_err(|e| EventError::InvalidEnvelope {
            reason: e.to_string(),
        })
    }

    /// Reject envelopes whose `event_type` is blank or outside the `noc.`
    /// namespace. Publishers call this before accepting an envelope.
    pub fn validate(&self) -> Result<(), EventError> {
        let reason = if self.event_type.trim().is_empty() {
            "event_type is empty".to_string()
        } else if !self.event_type.starts_with(EVENT_TYPE_PREFIX) {
            format!("event_type '{}' is outside the noc namespace", self.event_type)
        } else {
            return Ok(());
        };

        Err(EventError::InvalidEnvelope { reason })
    }

    /// Recover the typed envelope. Fails when `event_type` names another
    /// event or the payload does not fit `T`.
    pub fn downcast<T: Event>(self) -> Result<EventEnvelope<T>, EventError> {
        if self.event_type != T::EVENT_TYPE {
            return Err(EventError::DeserializationFailed {
                event_type: T::EVENT_TYPE.to_string(),
                raw: format!("envelope carries {}", self.event_type),
            });
        }

        match serde_json::from_value::<T>(self.payload) {
            Ok(payload) => Ok(EventEnvelope {
                event_id: self.event_id,
                event_type: self.event_type,
                actor_id: self.actor_id,
                timestamp: self.timestamp,
                payload,
            }),
            Err(e) => Err(EventError::DeserializationFailed {
                event_type: self.event_type,
                raw: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{IncidentEscalated, IncidentSlaBreached};
    use noc_core::IncidentId;

    fn t0() -> DateTime<Utc> {
        "2025-03-01T08:00:00Z".parse().unwrap()
    }

    fn escalated() -> EventEnvelope<IncidentEscalated> {
        EventEnvelope::new(
            IncidentEscalated {
                incident_id: IncidentId::new(),
                incident_number: "INC-202503-0007".to_string(),
                previous_level: 0,
                escalation_level: 1,
            },
            Some(UserId::new()),
            t0(),
        )
    }

    #[test]
    fn test_new_envelope_takes_type_and_topic_from_event() {
        let envelope = escalated();
        assert_eq!(envelope.event_type, "noc.incident.escalated");
        assert_eq!(envelope.topic(), "noc.incident.escalated");
        assert_eq!(envelope.timestamp, t0());
        assert_ne!(envelope.event_id, escalated().event_id);
    }

    #[test]
    fn test_raw_keeps_metadata_and_downcasts() {
        let envelope = escalated();
        let (event_id, actor_id) = (envelope.event_id, envelope.actor_id);

        let raw = envelope.into_raw().unwrap();
        assert_eq!(raw.payload["incident_number"], "INC-202503-0007");
        assert_eq!(raw.payload["escalation_level"], 1);

        let typed = raw.downcast::<IncidentEscalated>().unwrap();
        assert_eq!(typed.event_id, event_id);
        assert_eq!(typed.actor_id, actor_id);
        assert_eq!(typed.payload.escalation_level, 1);
    }

    #[test]
    fn test_downcast_to_other_event_fails() {
        let raw = escalated().into_raw().unwrap();
        let err = raw.downcast::<IncidentSlaBreached>().unwrap_err();
        assert!(matches!(err, EventError::DeserializationFailed { .. }));
    }

    #[test]
    fn test_wire_form_survives_transport() {
        let raw = escalated().into_raw().unwrap();
        let bytes = raw.encode().unwrap();
        assert_eq!(RawEnvelope::decode(&bytes).unwrap(), raw);

        let err = RawEnvelope::decode(b"{\"event_id\":").unwrap_err();
        assert!(matches!(err, EventError::InvalidEnvelope { .. }));
    }

    #[test]
    fn test_validate_enforces_namespace() {
        let mut raw = escalated().into_raw().unwrap();
        assert!(raw.validate().is_ok());

        raw.event_type = "incident.escalated".to_string();
        assert!(raw.validate().is_err());

        raw.event_type = "  ".to_string();
        let err = raw.validate().unwrap_err();
        assert_eq!(err.to_string(), "Invalid event envelope: event_type is empty");
    }
}

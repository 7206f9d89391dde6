//! Event publisher seam.
//!
//! Publishing is fire-and-forget from the services' point of view: a
//! failed publish is logged and never rolls back the state change that
//! produced it.

use crate::envelope::{EventEnvelope, RawEnvelope};
use crate::error::EventError;
use crate::event::Event;
use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, info};

/// Delivers envelopes to subscribers (websocket fan-out, message bus).
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an envelope to `topic`.
    async fn publish(&self, topic: &str, envelope: RawEnvelope) -> Result<(), EventError>;
}

/// Typed publishing on top of any [`EventPublisher`].
#[async_trait]
pub trait EventPublisherExt {
    /// Publish a typed envelope to the event's topic.
    async fn publish_event<E: Event>(&self, envelope: EventEnvelope<E>) -> Result<(), EventError>;
}

#[async_trait]
impl<P: EventPublisher + ?Sized> EventPublisherExt for P {
    async fn publish_event<E: Event>(&self, envelope: EventEnvelope<E>) -> Result<(), EventError> {
        let raw = envelope.into_raw()?;
        self.publish(E::TOPIC, raw).await
    }
}

/// In-memory publisher that records everything it receives.
#[derive(Debug, Default)]
pub struct InMemoryEventPublisher {
    published: Mutex<Vec<(String, RawEnvelope)>>,
}

impl InMemoryEventPublisher {
    /// Create an empty publisher.
    pub fn new() -> Self {
        Self::default()
    }

    /// All published `(topic, envelope)` pairs, in publish order.
    pub fn published(&self) -> Vec<(String, RawEnvelope)> {
        self.published.lock().clone()
    }

    /// Topics in publish order.
    pub fn topics(&self) -> Vec<String> {
        self.published
            .lock()
            .iter()
            .map(|(topic, _)| topic.clone())
            .collect()
    }

    /// Envelopes of one event type, decoded.
    pub fn events_of<E: Event>(&self) -> Vec<EventEnvelope<E>> {
        self.published
            .lock()
            .iter()
            .filter(|(topic, _)| topic == E::TOPIC)
            .filter_map(|(_, raw)| raw.clone().downcast::<E>().ok())
            .collect()
    }

    /// Drop everything recorded so far.
    pub fn clear(&self) {
        self.published.lock().clear();
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventPublisher {
    async fn publish(&self, topic: &str, envelope: RawEnvelope) -> Result<(), EventError> {
        envelope.validate()?;
        debug!(topic = %topic, event_id = %envelope.event_id, "Recording event");
        self.published.lock().push((topic.to_string(), envelope));
        Ok(())
    }
}

/// Publisher that writes each event as a structured log record.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventPublisher;

#[async_trait]
impl EventPublisher for TracingEventPublisher {
    async fn publish(&self, topic: &str, envelope: RawEnvelope) -> Result<(), EventError> {
        envelope.validate()?;
        info!(
            target: "events",
            topic = %topic,
            event_id = %envelope.event_id,
            event_type = %envelope.event_type,
            actor_id = ?envelope.actor_id,
            payload = %envelope.payload,
            "Event published"
        );
        Ok(())
    }
}

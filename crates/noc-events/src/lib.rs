//! Event publishing for the NOC engine.
//!
//! Incident state changes are announced as typed [`Event`]s wrapped in an
//! [`EventEnvelope`] and handed to an [`EventPublisher`]. The transport
//! (websocket fan-out, message bus) lives behind that trait; this crate
//! ships an in-memory publisher for tests and a tracing-backed default.
//!
//! # Example
//!
//! ```rust
//! use noc_events::{EventEnvelope, EventPublisherExt, InMemoryEventPublisher};
//! use noc_events::events::IncidentEscalated;
//! use noc_core::{IncidentId, UserId};
//!
//! # tokio_test_block(async {
//! let publisher = InMemoryEventPublisher::new();
//! let event = IncidentEscalated {
//!     incident_id: IncidentId::new(),
//!     incident_number: "INC-202503-0001".to_string(),
//!     previous_level: 0,
//!     escalation_level: 1,
//! };
//! let envelope = EventEnvelope::new(event, Some(UserId::new()), chrono::Utc::now());
//! publisher.publish_event(envelope).await.unwrap();
//! assert_eq!(publisher.topics(), vec!["noc.incident.escalated"]);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

pub mod envelope;
pub mod error;
pub mod event;
pub mod events;
pub mod publisher;

pub use envelope::{EventEnvelope, RawEnvelope};
pub use error::EventError;
pub use event::Event;
pub use publisher::{
    EventPublisher, EventPublisherExt, InMemoryEventPublisher, TracingEventPublisher,
};

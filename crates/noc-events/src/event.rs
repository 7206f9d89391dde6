//! Event trait definition for type-safe event publishing.

use serde::{de::DeserializeOwned, Serialize};

/// Trait for types that can be published as NOC events.
///
/// Implementors define the topic and event type name. The payload is
/// serialized as JSON inside an [`crate::EventEnvelope`].
///
/// # Example
///
/// ```rust
/// use serde::{Serialize, Deserialize};
/// use noc_events::Event;
/// use uuid::Uuid;
///
/// #[derive(Debug, Serialize, Deserialize)]
/// pub struct DeviceUnreachable {
///     pub device_id: Uuid,
/// }
///
/// impl Event for DeviceUnreachable {
///     const TOPIC: &'static str = "noc.device.unreachable";
///     const EVENT_TYPE: &'static str = "noc.device.unreachable";
/// }
/// ```
pub trait Event: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The topic this event type is published to.
    const TOPIC: &'static str;

    /// The fully qualified event type name.
    ///
    /// Convention: `noc.<entity>.<action>`
    const EVENT_TYPE: &'static str;
}

//! Built-in event types for the NOC engine.
//!
//! Incident lifecycle events (created, status changed, SLA breached,
//! escalated, assigned, communication added).

pub mod incident;

pub use incident::{
    IncidentAssigned, IncidentCommunicationAdded, IncidentCreated, IncidentEscalated,
    IncidentSlaBreached, IncidentStatusChanged,
};

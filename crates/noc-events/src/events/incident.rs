//! Incident lifecycle events.
//!
//! Enum-valued fields (status, priority, kind) are carried in their wire
//! form so consumers do not need the incident model.

use crate::event::Event;
use noc_core::{CommunicationId, IncidentId, UserId};
use serde::{Deserialize, Serialize};

/// Published when an incident is opened.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncidentCreated {
    pub incident_id: IncidentId,
    pub incident_number: String,
    pub title: String,
    pub category: String,
    pub priority: String,
    pub severity: String,
    /// SLA target in minutes.
    pub sla_target: Option<i64>,
    pub created_by: UserId,
}

impl Event for IncidentCreated {
    const TOPIC: &'static str = "noc.incident.created";
    const EVENT_TYPE: &'static str = "noc.incident.created";
}

/// Published on every status transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncidentStatusChanged {
    pub incident_id: IncidentId,
    pub incident_number: String,
    pub previous_status: String,
    pub new_status: String,
}

impl Event for IncidentStatusChanged {
    const TOPIC: &'static str = "noc.incident.status_changed";
    const EVENT_TYPE: &'static str = "noc.incident.status_changed";
}

/// Published once, when the SLA breach flag flips to true.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncidentSlaBreached {
    pub incident_id: IncidentId,
    pub incident_number: String,
    pub priority: String,
    pub sla_target: i64,
    pub elapsed_minutes: i64,
}

impl Event for IncidentSlaBreached {
    const TOPIC: &'static str = "noc.incident.sla_breached";
    const EVENT_TYPE: &'static str = "noc.incident.sla_breached";
}

/// Published when the escalation level is raised.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncidentEscalated {
    pub incident_id: IncidentId,
    pub incident_number: String,
    pub previous_level: u32,
    pub escalation_level: u32,
}

impl Event for IncidentEscalated {
    const TOPIC: &'static str = "noc.incident.escalated";
    const EVENT_TYPE: &'static str = "noc.incident.escalated";
}

/// Published when an incident changes hands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncidentAssigned {
    pub incident_id: IncidentId,
    pub incident_number: String,
    pub previous_assignee: Option<UserId>,
    pub assigned_to: UserId,
}

impl Event for IncidentAssigned {
    const TOPIC: &'static str = "noc.incident.assigned";
    const EVENT_TYPE: &'static str = "noc.incident.assigned";
}

/// Published when an entry is appended to the communication log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncidentCommunicationAdded {
    pub incident_id: IncidentId,
    pub incident_number: String,
    pub communication_id: CommunicationId,
    pub kind: String,
    pub author_id: UserId,
}

impl Event for IncidentCommunicationAdded {
    const TOPIC: &'static str = "noc.incident.communication_added";
    const EVENT_TYPE: &'static str = "noc.incident.communication_added";
}

//! Incident record and its enumerations.

use chrono::{DateTime, Utc};
use noc_core::{CommunicationId, CustomerId, DeviceId, IncidentId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationError};

/// Unknown wire value for one of the incident enums.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Closed enum with a snake_case wire form, `as_str`, `Display` and `FromStr`.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident : $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $wire ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $wire => Ok($name::$variant), )+
                    other => Err(ParseEnumError {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

wire_enum! {
    IncidentCategory: "category" {
        NetworkOutage => "network_outage",
        PerformanceDegradation => "performance_degradation",
        SecurityIncident => "security_incident",
        HardwareFailure => "hardware_failure",
        SoftwareIssue => "software_issue",
        ConnectivityProblem => "connectivity_problem",
        ServiceDisruption => "service_disruption",
        MaintenanceRequired => "maintenance_required",
        CustomerComplaint => "customer_complaint",
        Other => "other",
    }
}

wire_enum! {
    IncidentPriority: "priority" {
        Critical => "critical",
        High => "high",
        Medium => "medium",
        Low => "low",
    }
}

wire_enum! {
    IncidentSeverity: "severity" {
        Sev1 => "sev1",
        Sev2 => "sev2",
        Sev3 => "sev3",
        Sev4 => "sev4",
    }
}

wire_enum! {
    /// Lifecycle state. `cancelled` is reachable from anywhere.
    IncidentStatus: "status" {
        Open => "open",
        InProgress => "in_progress",
        Pending => "pending",
        Resolved => "resolved",
        Closed => "closed",
        Cancelled => "cancelled",
    }
}

wire_enum! {
    IncidentSource: "source" {
        MonitoringSystem => "monitoring_system",
        CustomerReport => "customer_report",
        InternalDetection => "internal_detection",
        ThirdParty => "third_party",
        ScheduledMaintenance => "scheduled_maintenance",
    }
}

wire_enum! {
    BusinessImpact: "business impact" {
        None => "none",
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

wire_enum! {
    CommunicationKind: "communication kind" {
        Note => "note",
        CustomerUpdate => "customer_update",
        Internal => "internal",
        Escalation => "escalation",
        StatusChange => "status_change",
    }
}

impl Default for IncidentPriority {
    fn default() -> Self {
        Self::Medium
    }
}

impl Default for IncidentSeverity {
    fn default() -> Self {
        Self::Sev3
    }
}

impl Default for IncidentStatus {
    fn default() -> Self {
        Self::Open
    }
}

impl Default for IncidentSource {
    fn default() -> Self {
        Self::MonitoringSystem
    }
}

impl Default for BusinessImpact {
    fn default() -> Self {
        Self::Low
    }
}

impl Default for CommunicationKind {
    fn default() -> Self {
        Self::Note
    }
}

impl IncidentStatus {
    /// Open, in progress or pending.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Open | Self::InProgress | Self::Pending)
    }

    /// Closed or cancelled.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Cancelled)
    }

    /// Whether an incident in this state still counts against its SLA.
    #[must_use]
    pub fn counts_against_sla(&self) -> bool {
        !matches!(self, Self::Resolved | Self::Closed)
    }
}

/// One entry of the append-only communication log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Communication {
    pub id: CommunicationId,
    pub message: String,
    pub author_id: UserId,
    pub kind: CommunicationKind,
    pub timestamp: DateTime<Utc>,
}

/// A tracked incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    pub id: IncidentId,
    pub incident_number: String,
    pub title: String,
    pub description: String,
    pub category: IncidentCategory,
    pub priority: IncidentPriority,
    pub severity: IncidentSeverity,
    pub status: IncidentStatus,
    pub source: IncidentSource,
    pub business_impact: BusinessImpact,
    pub affected_services: Vec<String>,
    pub affected_customers: u32,
    pub root_cause: Option<String>,
    pub resolution: Option<String>,
    pub workaround: Option<String>,
    pub created_by: UserId,
    pub assigned_to: Option<UserId>,
    pub device_id: Option<DeviceId>,
    pub customer_id: Option<CustomerId>,
    pub detected_at: DateTime<Utc>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    /// Minutes allowed from detection to resolution.
    pub sla_target: Option<i64>,
    pub sla_breach: bool,
    pub escalation_level: u32,
    pub escalated_at: Option<DateTime<Utc>>,
    pub communication_log: Vec<Communication>,
    pub tags: Vec<String>,
    pub location: Option<String>,
    pub external_ticket_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for opening an incident.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateIncident {
    #[validate(length(min = 5, max = 200, message = "Title must be 5-200 characters"))]
    pub title: String,

    #[validate(custom(function = "validate_not_blank"))]
    pub description: String,

    #[validate(required(message = "Category is required"))]
    pub category: Option<IncidentCategory>,
    #[serde(default)]
    pub priority: IncidentPriority,
    #[serde(default)]
    pub severity: IncidentSeverity,
    #[serde(default)]
    pub source: IncidentSource,
    #[serde(default)]
    pub business_impact: BusinessImpact,

    /// Overrides the priority-derived SLA target (minutes).
    #[validate(range(min = 1, max = 525_600, message = "SLA target must be between 1 minute and one year"))]
    pub sla_target: Option<i64>,

    /// Defaults to creation time.
    pub detected_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub affected_services: Vec<String>,
    #[serde(default)]
    pub affected_customers: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    pub assigned_to: Option<UserId>,
    pub device_id: Option<DeviceId>,
    pub customer_id: Option<CustomerId>,

    #[validate(length(max = 100))]
    pub location: Option<String>,

    #[validate(length(max = 50))]
    pub external_ticket_id: Option<String>,
}

impl CreateIncident {
    /// Minimal input; everything else takes its default.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        category: IncidentCategory,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            category: Some(category),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn priority(mut self, priority: IncidentPriority) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn severity(mut self, severity: IncidentSeverity) -> Self {
        self.severity = severity;
        self
    }

    #[must_use]
    pub fn sla_target(mut self, minutes: i64) -> Self {
        self.sla_target = Some(minutes);
        self
    }

    #[must_use]
    pub fn detected_at(mut self, at: DateTime<Utc>) -> Self {
        self.detected_at = Some(at);
        self
    }

    #[must_use]
    pub fn assigned_to(mut self, assignee: UserId) -> Self {
        self.assigned_to = Some(assignee);
        self
    }
}

pub(crate) fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Must not be empty".into());
        Err(err)
    } else {
        Ok(())
    }
}

//! Incident lifecycle for the NOC engine.
//!
//! - [`model`] - Incident record, enumerations and creation input
//! - [`lifecycle`] - Status transitions, SLA breach flagging, escalation
//!   and the communication log (pure)
//! - [`sla`] - Default targets, elapsed time and SLA status
//! - [`numbering`] - `INC-YYYYMM-NNNN` numbers
//! - [`service`] - [`IncidentService`] tying storage and events together
//! - [`policy`] - Permission requirements per incident operation
//!
//! # Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use noc_incidents::numbering::{next_incident_number, parse_incident_number};
//! use noc_incidents::sla::default_sla_target;
//! use noc_incidents::IncidentPriority;
//!
//! let now = Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap();
//! let number = next_incident_number(now, 41);
//! assert_eq!(number, "INC-202503-0042");
//! assert_eq!(parse_incident_number(&number), Some((2025, 3, 42)));
//!
//! assert_eq!(default_sla_target(IncidentPriority::Critical), 240);
//! ```

pub mod error;
pub mod lifecycle;
pub mod model;
pub mod numbering;
pub mod policy;
pub mod repository;
pub mod resource;
pub mod service;
pub mod sla;

pub use error::IncidentError;
pub use lifecycle::{Escalation, IncidentUpdate};
pub use model::{
    BusinessImpact, Communication, CommunicationKind, CreateIncident, Incident, IncidentCategory,
    IncidentPriority, IncidentSeverity, IncidentSource, IncidentStatus, ParseEnumError,
};
pub use policy::{IncidentAction, IncidentPolicy};
pub use repository::{InMemoryIncidentRepository, IncidentRepository};
pub use resource::IncidentResourceRepository;
pub use service::IncidentService;
pub use sla::{SlaStatus, MAX_SLA_TARGET_MINUTES};

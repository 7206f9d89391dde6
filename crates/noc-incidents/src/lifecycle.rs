//! Incident state changes.
//!
//! Status transitions are not validated against a graph: any status may
//! follow any other. What is enforced is that lifecycle timestamps are set
//! once, the SLA breach flag only ever turns on, and the escalation level
//! never decreases.

use chrono::{DateTime, Utc};
use noc_core::{CommunicationId, UserId};

use crate::error::IncidentError;
use crate::model::{Communication, CommunicationKind, Incident, IncidentStatus};
use crate::sla::elapsed_minutes_exact;

/// Fields changed by a status transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentUpdate {
    pub previous_status: IncidentStatus,
    pub status: IncidentStatus,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    /// The SLA breach flag turns on with this update.
    pub sla_breached: bool,
}

impl IncidentUpdate {
    /// Write the update into `incident`.
    ///
    /// Timestamps already present are kept, and a set breach flag is never
    /// cleared.
    pub fn apply_to(&self, incident: &mut Incident) {
        incident.status = self.status;
        if let Some(at) = self.acknowledged_at {
            incident.acknowledged_at.get_or_insert(at);
        }
        if let Some(at) = self.resolved_at {
            incident.resolved_at.get_or_insert(at);
        }
        if let Some(at) = self.closed_at {
            incident.closed_at.get_or_insert(at);
        }
        incident.sla_breach |= self.sla_breached;
    }

    #[must_use]
    pub fn status_changed(&self) -> bool {
        self.previous_status != self.status
    }
}

/// Whether the SLA breach flag should turn on now.
///
/// Requires a target, an unset flag, a `status` that still counts against
/// the SLA, and strictly more (fractional) minutes elapsed than the target.
#[must_use]
pub fn breaches_sla(incident: &Incident, status: IncidentStatus, now: DateTime<Utc>) -> bool {
    match incident.sla_target {
        Some(target) if !incident.sla_breach && status.counts_against_sla() => {
            elapsed_minutes_exact(incident, now) > target as f64
        }
        _ => false,
    }
}

/// Compute the effect of moving `incident` to `new_status` at `now`.
#[must_use]
pub fn apply_status_change(
    incident: &Incident,
    new_status: IncidentStatus,
    now: DateTime<Utc>,
) -> IncidentUpdate {
    let stamp = |target: IncidentStatus, current: Option<DateTime<Utc>>| {
        (new_status == target && current.is_none()).then_some(now)
    };

    IncidentUpdate {
        previous_status: incident.status,
        status: new_status,
        acknowledged_at: stamp(IncidentStatus::InProgress, incident.acknowledged_at),
        resolved_at: stamp(IncidentStatus::Resolved, incident.resolved_at),
        closed_at: stamp(IncidentStatus::Closed, incident.closed_at),
        sla_breached: breaches_sla(incident, new_status, now),
    }
}

/// Re-check the breach rule after a change other than a status transition.
///
/// Returns true when the flag turned on.
pub fn refresh_sla_breach(incident: &mut Incident, now: DateTime<Utc>) -> bool {
    if breaches_sla(incident, incident.status, now) {
        incident.sla_breach = true;
        true
    } else {
        false
    }
}

/// Level change made by [`escalate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Escalation {
    pub previous_level: u32,
    pub level: u32,
}

/// Raise the escalation level.
///
/// Without an explicit level (or with level 0) the level goes up by one.
/// An explicit level below the current one is refused.
pub fn escalate(
    incident: &mut Incident,
    explicit_level: Option<u32>,
    now: DateTime<Utc>,
) -> Result<Escalation, IncidentError> {
    let previous_level = incident.escalation_level;

    let level = match explicit_level.filter(|l| *l > 0) {
        Some(requested) if requested < previous_level => {
            return Err(IncidentError::EscalationDowngrade {
                current: previous_level,
                requested,
            });
        }
        Some(requested) => requested,
        None => previous_level.saturating_add(1),
    };

    incident.escalation_level = level;
    incident.escalated_at = Some(now);

    Ok(Escalation {
        previous_level,
        level,
    })
}

/// Append an entry to the communication log.
pub fn append_communication(
    incident: &mut Incident,
    message: &str,
    author_id: UserId,
    kind: CommunicationKind,
    now: DateTime<Utc>,
) -> Result<Communication, IncidentError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(IncidentError::Validation(
            "message: Must not be empty".to_string(),
        ));
    }

    let entry = Communication {
        id: CommunicationId::new(),
        message: message.to_string(),
        author_id,
        kind,
        timestamp: now,
    };
    incident.communication_log.push(entry.clone());
    Ok(entry)
}

//! Incident orchestration: numbering, persistence and event publication.
//!
//! Each mutation is one read-modify-write against the repository. Events
//! are published after the save succeeds; a publish failure is logged and
//! never fails the operation.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use noc_core::{Clock, IncidentId, UserId};
use noc_events::events::{
    IncidentAssigned, IncidentCommunicationAdded, IncidentCreated, IncidentEscalated,
    IncidentSlaBreached, IncidentStatusChanged,
};
use noc_events::{Event, EventEnvelope, EventPublisher, EventPublisherExt};
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::error::IncidentError;
use crate::lifecycle::{
    append_communication, apply_status_change, escalate, refresh_sla_breach,
};
use crate::model::{
    Communication, CommunicationKind, CreateIncident, Incident, IncidentPriority, IncidentStatus,
};
use crate::numbering::next_incident_number;
use crate::repository::IncidentRepository;
use crate::sla::{
    compute_sla_status, default_sla_target, elapsed_minutes, SlaStatus, MAX_SLA_TARGET_MINUTES,
};

/// Incident service.
#[derive(Clone)]
pub struct IncidentService {
    incidents: Arc<dyn IncidentRepository>,
    events: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl IncidentService {
    pub fn new(
        incidents: Arc<dyn IncidentRepository>,
        events: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            incidents,
            events,
            clock,
        }
    }

    async fn publish<E: Event>(&self, payload: E, actor: Option<UserId>, now: DateTime<Utc>) {
        let envelope = EventEnvelope::new(payload, actor, now);
        if let Err(e) = self.events.publish_event(envelope).await {
            warn!(topic = E::TOPIC, error = %e, "Failed to publish incident event");
        }
    }

    async fn publish_breach(&self, incident: &Incident, now: DateTime<Utc>) {
        let Some(sla_target) = incident.sla_target else {
            return;
        };
        warn!(
            incident_number = %incident.incident_number,
            sla_target,
            "SLA breached"
        );
        self.publish(
            IncidentSlaBreached {
                incident_id: incident.id,
                incident_number: incident.incident_number.clone(),
                priority: incident.priority.to_string(),
                sla_target,
                elapsed_minutes: elapsed_minutes(incident, now),
            },
            None,
            now,
        )
        .await;
    }

    async fn load(&self, id: IncidentId) -> Result<Incident, IncidentError> {
        self.incidents
            .find_by_id(id)
            .await?
            .ok_or_else(|| IncidentError::NotFound(id.to_string()))
    }

    /// Open a new incident.
    ///
    /// Assigns the next number for the current year and, unless given, the
    /// priority's default SLA target.
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create(
        &self,
        mut input: CreateIncident,
        created_by: UserId,
    ) -> Result<Incident, IncidentError> {
        input.title = input.title.trim().to_string();
        input.validate()?;
        let category = input
            .category
            .ok_or_else(|| IncidentError::Validation("category: Category is required".to_string()))?;

        let now = self.clock.now();
        if input.detected_at.is_some_and(|detected| detected > now) {
            return Err(IncidentError::Validation(
                "detected_at: Detection time cannot be in the future".to_string(),
            ));
        }
        let prior = self.incidents.count_by_year(now.year()).await?;
        let incident_number = next_incident_number(now, prior);
        let sla_target = input
            .sla_target
            .unwrap_or_else(|| default_sla_target(input.priority));

        let incident = Incident {
            id: IncidentId::new(),
            incident_number,
            title: input.title,
            description: input.description,
            category,
            priority: input.priority,
            severity: input.severity,
            status: IncidentStatus::Open,
            source: input.source,
            business_impact: input.business_impact,
            affected_services: input.affected_services,
            affected_customers: input.affected_customers,
            root_cause: None,
            resolution: None,
            workaround: None,
            created_by,
            assigned_to: input.assigned_to,
            device_id: input.device_id,
            customer_id: input.customer_id,
            detected_at: input.detected_at.unwrap_or(now),
            acknowledged_at: None,
            resolved_at: None,
            closed_at: None,
            sla_target: Some(sla_target),
            sla_breach: false,
            escalation_level: 0,
            escalated_at: None,
            communication_log: Vec::new(),
            tags: input.tags,
            location: input.location,
            external_ticket_id: input.external_ticket_id,
            created_at: now,
            updated_at: now,
        };

        self.incidents.save(&incident).await?;

        info!(
            incident_id = %incident.id,
            incident_number = %incident.incident_number,
            priority = %incident.priority,
            sla_target,
            "Incident created"
        );

        self.publish(
            IncidentCreated {
                incident_id: incident.id,
                incident_number: incident.incident_number.clone(),
                title: incident.title.clone(),
                category: incident.category.to_string(),
                priority: incident.priority.to_string(),
                severity: incident.severity.to_string(),
                sla_target: incident.sla_target,
                created_by,
            },
            Some(created_by),
            now,
        )
        .await;

        Ok(incident)
    }

    /// Move an incident to `new_status`, stamping lifecycle timestamps and
    /// checking the SLA.
    #[instrument(skip(self), fields(new_status = %new_status))]
    pub async fn transition(
        &self,
        id: IncidentId,
        new_status: IncidentStatus,
        actor: UserId,
    ) -> Result<Incident, IncidentError> {
        let mut incident = self.load(id).await?;
        let now = self.clock.now();

        let update = apply_status_change(&incident, new_status, now);
        update.apply_to(&mut incident);
        incident.updated_at = now;
        self.incidents.save(&incident).await?;

        if update.status_changed() {
            info!(
                incident_number = %incident.incident_number,
                from = %update.previous_status,
                to = %update.status,
                "Incident status changed"
            );
            self.publish(
                IncidentStatusChanged {
                    incident_id: incident.id,
                    incident_number: incident.incident_number.clone(),
                    previous_status: update.previous_status.to_string(),
                    new_status: update.status.to_string(),
                },
                Some(actor),
                now,
            )
            .await;
        }

        if update.sla_breached {
            self.publish_breach(&incident, now).await;
        }

        Ok(incident)
    }

    /// Raise the escalation level by one, or to `level` if given.
    #[instrument(skip(self))]
    pub async fn escalate(
        &self,
        id: IncidentId,
        level: Option<u32>,
        actor: UserId,
    ) -> Result<Incident, IncidentError> {
        let mut incident = self.load(id).await?;
        let now = self.clock.now();

        let change = escalate(&mut incident, level, now)?;
        let breached = refresh_sla_breach(&mut incident, now);
        incident.updated_at = now;
        self.incidents.save(&incident).await?;

        info!(
            incident_number = %incident.incident_number,
            previous_level = change.previous_level,
            level = change.level,
            "Incident escalated"
        );
        self.publish(
            IncidentEscalated {
                incident_id: incident.id,
                incident_number: incident.incident_number.clone(),
                previous_level: change.previous_level,
                escalation_level: change.level,
            },
            Some(actor),
            now,
        )
        .await;

        if breached {
            self.publish_breach(&incident, now).await;
        }

        Ok(incident)
    }

    /// Append to the communication log.
    #[instrument(skip(self, message))]
    pub async fn add_communication(
        &self,
        id: IncidentId,
        message: &str,
        kind: CommunicationKind,
        author: UserId,
    ) -> Result<Communication, IncidentError> {
        let mut incident = self.load(id).await?;
        let now = self.clock.now();

        let entry = append_communication(&mut incident, message, author, kind, now)?;
        let breached = refresh_sla_breach(&mut incident, now);
        incident.updated_at = now;
        self.incidents.save(&incident).await?;

        debug!(
            incident_number = %incident.incident_number,
            communication_id = %entry.id,
            kind = %entry.kind,
            "Communication added"
        );
        self.publish(
            IncidentCommunicationAdded {
                incident_id: incident.id,
                incident_number: incident.incident_number.clone(),
                communication_id: entry.id,
                kind: entry.kind.to_string(),
                author_id: author,
            },
            Some(author),
            now,
        )
        .await;

        if breached {
            self.publish_breach(&incident, now).await;
        }

        Ok(entry)
    }

    /// Hand the incident to `assignee`.
    #[instrument(skip(self))]
    pub async fn assign(
        &self,
        id: IncidentId,
        assignee: UserId,
        actor: UserId,
    ) -> Result<Incident, IncidentError> {
        let mut incident = self.load(id).await?;
        let now = self.clock.now();

        let previous_assignee = incident.assigned_to.replace(assignee);
        let breached = refresh_sla_breach(&mut incident, now);
        incident.updated_at = now;
        self.incidents.save(&incident).await?;

        if previous_assignee != Some(assignee) {
            info!(
                incident_number = %incident.incident_number,
                assigned_to = %assignee,
                "Incident assigned"
            );
            self.publish(
                IncidentAssigned {
                    incident_id: incident.id,
                    incident_number: incident.incident_number.clone(),
                    previous_assignee,
                    assigned_to: assignee,
                },
                Some(actor),
                now,
            )
            .await;
        }

        if breached {
            self.publish_breach(&incident, now).await;
        }

        Ok(incident)
    }

    /// Replace the SLA target. The breach flag is re-checked but never cleared.
    #[instrument(skip(self))]
    pub async fn override_sla_target(
        &self,
        id: IncidentId,
        minutes: i64,
        actor: UserId,
    ) -> Result<Incident, IncidentError> {
        if !(1..=MAX_SLA_TARGET_MINUTES).contains(&minutes) {
            return Err(IncidentError::Validation(
                "sla_target: SLA target must be between 1 minute and one year".to_string(),
            ));
        }

        let mut incident = self.load(id).await?;
        let now = self.clock.now();

        let previous = incident.sla_target.replace(minutes);
        let breached = refresh_sla_breach(&mut incident, now);
        incident.updated_at = now;
        self.incidents.save(&incident).await?;

        info!(
            incident_number = %incident.incident_number,
            previous_target = ?previous,
            sla_target = minutes,
            actor = %actor,
            "SLA target overridden"
        );

        if breached {
            self.publish_breach(&incident, now).await;
        }

        Ok(incident)
    }

    /// Flag every active incident that has run past its target.
    ///
    /// Returns the incidents whose flag turned on in this sweep.
    #[instrument(skip(self))]
    pub async fn detect_sla_breaches(&self) -> Result<Vec<Incident>, IncidentError> {
        let now = self.clock.now();
        let mut flagged = Vec::new();

        for mut incident in self.incidents.find_open().await? {
            if refresh_sla_breach(&mut incident, now) {
                incident.updated_at = now;
                self.incidents.save(&incident).await?;
                self.publish_breach(&incident, now).await;
                flagged.push(incident);
            }
        }

        if !flagged.is_empty() {
            info!(count = flagged.len(), "SLA sweep flagged incidents");
        }
        Ok(flagged)
    }

    pub async fn get(&self, id: IncidentId) -> Result<Incident, IncidentError> {
        self.load(id).await
    }

    pub async fn get_by_number(&self, incident_number: &str) -> Result<Incident, IncidentError> {
        self.incidents
            .find_by_number(incident_number)
            .await?
            .ok_or_else(|| IncidentError::NotFound(incident_number.to_string()))
    }

    pub async fn open_incidents(&self) -> Result<Vec<Incident>, IncidentError> {
        Ok(self.incidents.find_open().await?)
    }

    pub async fn by_priority(
        &self,
        priority: IncidentPriority,
    ) -> Result<Vec<Incident>, IncidentError> {
        Ok(self.incidents.find_by_priority(priority).await?)
    }

    pub async fn sla_breached(&self) -> Result<Vec<Incident>, IncidentError> {
        Ok(self.incidents.find_sla_breached().await?)
    }

    /// Incidents detected within `[start, end]`.
    pub async fn in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Incident>, IncidentError> {
        if start > end {
            return Err(IncidentError::Validation(
                "range: start must not be after end".to_string(),
            ));
        }
        Ok(self.incidents.find_by_date_range(start, end).await?)
    }

    /// SLA standing of an incident as of now.
    pub async fn sla_status(&self, id: IncidentId) -> Result<SlaStatus, IncidentError> {
        let incident = self.load(id).await?;
        Ok(compute_sla_status(&incident, self.clock.now()))
    }
}

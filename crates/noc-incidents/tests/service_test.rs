//! Integration tests for the incident service.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use noc_core::{FixedClock, IncidentId, UserId};
use noc_events::events::{
    IncidentAssigned, IncidentCommunicationAdded, IncidentCreated, IncidentEscalated,
    IncidentSlaBreached, IncidentStatusChanged,
};
use noc_events::InMemoryEventPublisher;
use noc_incidents::{
    CommunicationKind, CreateIncident, InMemoryIncidentRepository, Incident, IncidentCategory,
    IncidentError, IncidentPriority, IncidentService, IncidentStatus, SlaStatus,
    MAX_SLA_TARGET_MINUTES,
};

struct Harness {
    service: IncidentService,
    events: Arc<InMemoryEventPublisher>,
    clock: Arc<FixedClock>,
    operator: UserId,
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap()
}

fn harness() -> Harness {
    let repo = Arc::new(InMemoryIncidentRepository::new());
    let events = Arc::new(InMemoryEventPublisher::new());
    let clock = Arc::new(FixedClock::at(t0()));
    let service = IncidentService::new(repo, events.clone(), clock.clone());

    Harness {
        service,
        events,
        clock,
        operator: UserId::new(),
    }
}

fn outage(priority: IncidentPriority) -> CreateIncident {
    CreateIncident::new(
        "Core router unreachable",
        "BGP sessions down on core-rtr-01",
        IncidentCategory::NetworkOutage,
    )
    .priority(priority)
}

async fn open(h: &Harness, priority: IncidentPriority) -> Incident {
    h.service.create(outage(priority), h.operator).await.unwrap()
}

mod create {
    use super::*;

    #[tokio::test]
    async fn test_numbers_follow_yearly_sequence() {
        let h = harness();

        let first = open(&h, IncidentPriority::High).await;
        let second = open(&h, IncidentPriority::Low).await;
        h.clock.set(Utc.with_ymd_and_hms(2025, 4, 2, 10, 0, 0).unwrap());
        let third = open(&h, IncidentPriority::Low).await;

        assert_eq!(first.incident_number, "INC-202503-0001");
        assert_eq!(second.incident_number, "INC-202503-0002");
        // The sequence runs per year, the month only labels it.
        assert_eq!(third.incident_number, "INC-202504-0003");

        h.clock.set(Utc.with_ymd_and_hms(2026, 1, 1, 0, 5, 0).unwrap());
        let next_year = open(&h, IncidentPriority::Low).await;
        assert_eq!(next_year.incident_number, "INC-202601-0001");
    }

    #[tokio::test]
    async fn test_defaults_applied() {
        let h = harness();
        let incident = open(&h, IncidentPriority::Critical).await;

        assert_eq!(incident.status, IncidentStatus::Open);
        assert_eq!(incident.sla_target, Some(240));
        assert!(!incident.sla_breach);
        assert_eq!(incident.escalation_level, 0);
        assert_eq!(incident.detected_at, t0());
        assert_eq!(incident.created_by, h.operator);
        assert!(incident.communication_log.is_empty());
    }

    #[tokio::test]
    async fn test_explicit_target_and_detection_time() {
        let h = harness();
        let detected = t0() - Duration::minutes(20);
        let input = outage(IncidentPriority::Medium)
            .sla_target(90)
            .detected_at(detected);

        let incident = h.service.create(input, h.operator).await.unwrap();
        assert_eq!(incident.sla_target, Some(90));
        assert_eq!(incident.detected_at, detected);
    }

    #[tokio::test]
    async fn test_created_event_published() {
        let h = harness();
        let incident = open(&h, IncidentPriority::High).await;

        let created = h.events.events_of::<IncidentCreated>();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].payload.incident_id, incident.id);
        assert_eq!(created[0].payload.priority, "high");
        assert_eq!(created[0].payload.sla_target, Some(480));
        assert_eq!(created[0].actor_id, Some(h.operator));
    }

    #[tokio::test]
    async fn test_invalid_input_rejected() {
        let h = harness();
        let err = h
            .service
            .create(
                CreateIncident::new("Down", "x", IncidentCategory::Other),
                h.operator,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, IncidentError::Validation(_)));
        assert!(h.events.published().is_empty());
    }

    #[tokio::test]
    async fn test_title_length_checked_after_trimming() {
        let h = harness();
        let err = h
            .service
            .create(
                CreateIncident::new("   ab   ", "Span A-B dark", IncidentCategory::Other),
                h.operator,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, IncidentError::Validation(ref m) if m.contains("title")));

        let padded = h
            .service
            .create(
                CreateIncident::new("  Fiber cut  ", "Span A-B dark", IncidentCategory::Other),
                h.operator,
            )
            .await
            .unwrap();
        assert_eq!(padded.title, "Fiber cut");
    }

    #[tokio::test]
    async fn test_future_detection_rejected() {
        let h = harness();
        let input = outage(IncidentPriority::Low).detected_at(t0() + Duration::days(1));

        let err = h.service.create(input, h.operator).await.unwrap_err();
        assert!(matches!(err, IncidentError::Validation(ref m) if m.starts_with("detected_at")));
        assert!(h.events.published().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_target_rejected() {
        let h = harness();
        let input = outage(IncidentPriority::Low).sla_target(i64::MAX);

        let err = h.service.create(input, h.operator).await.unwrap_err();
        assert!(matches!(err, IncidentError::Validation(_)));
    }
}

mod transitions {
    use super::*;

    #[tokio::test]
    async fn test_lifecycle_timestamps() {
        let h = harness();
        let incident = open(&h, IncidentPriority::High).await;

        h.clock.advance(Duration::minutes(10));
        let working = h
            .service
            .transition(incident.id, IncidentStatus::InProgress, h.operator)
            .await
            .unwrap();
        assert_eq!(working.acknowledged_at, Some(t0() + Duration::minutes(10)));

        h.clock.advance(Duration::minutes(50));
        let resolved = h
            .service
            .transition(incident.id, IncidentStatus::Resolved, h.operator)
            .await
            .unwrap();
        assert_eq!(resolved.resolved_at, Some(t0() + Duration::minutes(60)));
        assert_eq!(resolved.updated_at, t0() + Duration::minutes(60));

        let changes = h.events.events_of::<IncidentStatusChanged>();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[1].payload.previous_status, "in_progress");
        assert_eq!(changes[1].payload.new_status, "resolved");
    }

    #[tokio::test]
    async fn test_same_status_publishes_nothing() {
        let h = harness();
        let incident = open(&h, IncidentPriority::High).await;

        h.service
            .transition(incident.id, IncidentStatus::Open, h.operator)
            .await
            .unwrap();
        assert!(h.events.events_of::<IncidentStatusChanged>().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_incident() {
        let h = harness();
        let err = h
            .service
            .transition(IncidentId::new(), IncidentStatus::Closed, h.operator)
            .await
            .unwrap_err();
        assert!(matches!(err, IncidentError::NotFound(_)));
    }
}

mod sla {
    use super::*;

    #[tokio::test]
    async fn test_critical_breach_on_late_update() {
        let h = harness();
        let incident = open(&h, IncidentPriority::Critical).await;

        h.clock.advance(Duration::minutes(241));
        let updated = h
            .service
            .transition(incident.id, IncidentStatus::InProgress, h.operator)
            .await
            .unwrap();
        assert!(updated.sla_breach);

        let breaches = h.events.events_of::<IncidentSlaBreached>();
        assert_eq!(breaches.len(), 1);
        assert_eq!(breaches[0].payload.sla_target, 240);
        assert_eq!(breaches[0].payload.elapsed_minutes, 241);
        assert_eq!(breaches[0].actor_id, None);

        // Already flagged: no second event.
        h.clock.advance(Duration::minutes(5));
        h.service
            .transition(incident.id, IncidentStatus::Pending, h.operator)
            .await
            .unwrap();
        assert_eq!(h.events.events_of::<IncidentSlaBreached>().len(), 1);
    }

    #[tokio::test]
    async fn test_resolving_late_is_not_flagged() {
        let h = harness();
        let incident = open(&h, IncidentPriority::Critical).await;

        h.clock.advance(Duration::minutes(300));
        let resolved = h
            .service
            .transition(incident.id, IncidentStatus::Resolved, h.operator)
            .await
            .unwrap();
        assert!(!resolved.sla_breach);
        assert!(h.events.events_of::<IncidentSlaBreached>().is_empty());
    }

    #[tokio::test]
    async fn test_sweep_flags_overdue_active_incidents() {
        let h = harness();
        let critical = open(&h, IncidentPriority::Critical).await;
        let low = open(&h, IncidentPriority::Low).await;
        let done = open(&h, IncidentPriority::Critical).await;
        h.service
            .transition(done.id, IncidentStatus::Resolved, h.operator)
            .await
            .unwrap();

        h.clock.advance(Duration::hours(5));
        let flagged = h.service.detect_sla_breaches().await.unwrap();
        assert_eq!(flagged.iter().map(|i| i.id).collect::<Vec<_>>(), vec![critical.id]);

        let breached = h.service.sla_breached().await.unwrap();
        assert_eq!(breached.len(), 1);
        assert_eq!(h.service.sla_status(low.id).await.unwrap(), SlaStatus::OnTrack);

        // A second sweep finds nothing new.
        assert!(h.service.detect_sla_breaches().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_status_bands() {
        let h = harness();
        let incident = open(&h, IncidentPriority::Critical).await;

        assert_eq!(h.service.sla_status(incident.id).await.unwrap(), SlaStatus::OnTrack);
        h.clock.advance(Duration::minutes(185));
        assert_eq!(h.service.sla_status(incident.id).await.unwrap(), SlaStatus::Warning);
        h.clock.advance(Duration::minutes(35));
        assert_eq!(h.service.sla_status(incident.id).await.unwrap(), SlaStatus::Critical);
        h.clock.advance(Duration::minutes(20));
        assert_eq!(h.service.sla_status(incident.id).await.unwrap(), SlaStatus::Breached);
    }

    #[tokio::test]
    async fn test_override_target() {
        let h = harness();
        let incident = open(&h, IncidentPriority::Low).await;

        h.clock.advance(Duration::minutes(45));
        let updated = h
            .service
            .override_sla_target(incident.id, 30, h.operator)
            .await
            .unwrap();
        assert_eq!(updated.sla_target, Some(30));
        assert!(updated.sla_breach);
        assert_eq!(h.events.events_of::<IncidentSlaBreached>().len(), 1);

        // Raising the target again does not clear the flag.
        let relaxed = h
            .service
            .override_sla_target(incident.id, 4320, h.operator)
            .await
            .unwrap();
        assert!(relaxed.sla_breach);

        let err = h
            .service
            .override_sla_target(incident.id, 0, h.operator)
            .await
            .unwrap_err();
        assert!(matches!(err, IncidentError::Validation(_)));

        let err = h
            .service
            .override_sla_target(incident.id, MAX_SLA_TARGET_MINUTES + 1, h.operator)
            .await
            .unwrap_err();
        assert!(matches!(err, IncidentError::Validation(_)));
        assert_eq!(
            h.service.sla_status(incident.id).await.unwrap(),
            SlaStatus::Breached
        );
    }
}

mod escalation {
    use super::*;

    #[tokio::test]
    async fn test_escalate_increments_and_publishes() {
        let h = harness();
        let incident = open(&h, IncidentPriority::High).await;

        let once = h.service.escalate(incident.id, None, h.operator).await.unwrap();
        h.clock.advance(Duration::minutes(15));
        let twice = h.service.escalate(incident.id, None, h.operator).await.unwrap();

        assert_eq!(once.escalation_level, 1);
        assert_eq!(twice.escalation_level, 2);
        assert_eq!(twice.escalated_at, Some(t0() + Duration::minutes(15)));

        let escalations = h.events.events_of::<IncidentEscalated>();
        assert_eq!(escalations.len(), 2);
        assert_eq!(escalations[1].payload.previous_level, 1);
        assert_eq!(escalations[1].payload.escalation_level, 2);
    }

    #[tokio::test]
    async fn test_downgrade_refused() {
        let h = harness();
        let incident = open(&h, IncidentPriority::High).await;
        h.service
            .escalate(incident.id, Some(3), h.operator)
            .await
            .unwrap();

        let err = h
            .service
            .escalate(incident.id, Some(2), h.operator)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            IncidentError::EscalationDowngrade {
                current: 3,
                requested: 2
            }
        );
        assert_eq!(h.service.get(incident.id).await.unwrap().escalation_level, 3);
        assert_eq!(h.events.events_of::<IncidentEscalated>().len(), 1);
    }
}

mod collaboration {
    use super::*;

    #[tokio::test]
    async fn test_communication_log() {
        let h = harness();
        let incident = open(&h, IncidentPriority::High).await;

        let entry = h
            .service
            .add_communication(
                incident.id,
                "Field tech dispatched",
                CommunicationKind::Internal,
                h.operator,
            )
            .await
            .unwrap();

        let stored = h.service.get(incident.id).await.unwrap();
        assert_eq!(stored.communication_log, vec![entry.clone()]);

        let added = h.events.events_of::<IncidentCommunicationAdded>();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].payload.communication_id, entry.id);

        let err = h
            .service
            .add_communication(incident.id, "   ", CommunicationKind::Note, h.operator)
            .await
            .unwrap_err();
        assert!(matches!(err, IncidentError::Validation(_)));
    }

    #[tokio::test]
    async fn test_assign() {
        let h = harness();
        let incident = open(&h, IncidentPriority::High).await;
        let tech = UserId::new();

        let assigned = h.service.assign(incident.id, tech, h.operator).await.unwrap();
        assert_eq!(assigned.assigned_to, Some(tech));

        // Re-assigning to the same person is a no-op for events.
        h.service.assign(incident.id, tech, h.operator).await.unwrap();

        let events = h.events.events_of::<IncidentAssigned>();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].payload.previous_assignee, None);
        assert_eq!(events[0].payload.assigned_to, tech);
    }
}

mod queries {
    use super::*;

    #[tokio::test]
    async fn test_lookup_and_lists() {
        let h = harness();
        let a = open(&h, IncidentPriority::High).await;
        h.clock.advance(Duration::minutes(30));
        let b = open(&h, IncidentPriority::High).await;
        h.clock.advance(Duration::minutes(30));
        let c = open(&h, IncidentPriority::Low).await;
        h.service
            .transition(c.id, IncidentStatus::Closed, h.operator)
            .await
            .unwrap();

        assert_eq!(
            h.service.get_by_number("INC-202503-0002").await.unwrap().id,
            b.id
        );
        assert!(matches!(
            h.service.get_by_number("INC-202503-0099").await,
            Err(IncidentError::NotFound(_))
        ));

        let open_ids: Vec<_> = h
            .service
            .open_incidents()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(open_ids, vec![a.id, b.id]);

        let high: Vec<_> = h
            .service
            .by_priority(IncidentPriority::High)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(high, vec![b.id, a.id]);

        let window = h
            .service
            .in_range(t0() + Duration::minutes(30), t0() + Duration::minutes(60))
            .await
            .unwrap();
        assert_eq!(window.iter().map(|i| i.id).collect::<Vec<_>>(), vec![b.id, c.id]);
    }

    #[tokio::test]
    async fn test_inverted_range_rejected() {
        let h = harness();
        let err = h
            .service
            .in_range(t0(), t0() - Duration::minutes(1))
            .await
            .unwrap_err();
        assert!(matches!(err, IncidentError::Validation(_)));
    }
}

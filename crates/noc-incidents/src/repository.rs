//! Incident storage seam.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use noc_core::{IncidentId, NocError};
use tokio::sync::RwLock;

use crate::model::{Incident, IncidentPriority};

/// Incident persistence.
#[async_trait]
pub trait IncidentRepository: Send + Sync {
    async fn find_by_id(&self, id: IncidentId) -> Result<Option<Incident>, NocError>;

    async fn find_by_number(&self, incident_number: &str) -> Result<Option<Incident>, NocError>;

    /// Incidents created in calendar year `year`.
    async fn count_by_year(&self, year: i32) -> Result<u64, NocError>;

    /// Insert or replace by id.
    ///
    /// Fails with [`NocError::Conflict`] when another incident already holds
    /// the same incident number.
    async fn save(&self, incident: &Incident) -> Result<(), NocError>;

    /// Open, in progress or pending; oldest detection first.
    async fn find_open(&self) -> Result<Vec<Incident>, NocError>;

    /// Newest detection first.
    async fn find_by_priority(&self, priority: IncidentPriority)
        -> Result<Vec<Incident>, NocError>;

    async fn find_sla_breached(&self) -> Result<Vec<Incident>, NocError>;

    /// Detected within `[start, end]`, oldest first.
    async fn find_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Incident>, NocError>;
}

/// In-memory repository for tests and local runs.
#[derive(Debug, Default)]
pub struct InMemoryIncidentRepository {
    incidents: RwLock<HashMap<IncidentId, Incident>>,
}

impl InMemoryIncidentRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.incidents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.incidents.read().await.is_empty()
    }

    async fn select<F>(&self, predicate: F) -> Vec<Incident>
    where
        F: Fn(&Incident) -> bool,
    {
        let incidents = self.incidents.read().await;
        let mut selected: Vec<Incident> = incidents.values().filter(|i| predicate(i)).cloned().collect();
        selected.sort_by(|a, b| {
            a.detected_at
                .cmp(&b.detected_at)
                .then_with(|| a.incident_number.cmp(&b.incident_number))
        });
        selected
    }
}

#[async_trait]
impl IncidentRepository for InMemoryIncidentRepository {
    async fn find_by_id(&self, id: IncidentId) -> Result<Option<Incident>, NocError> {
        Ok(self.incidents.read().await.get(&id).cloned())
    }

    async fn find_by_number(&self, incident_number: &str) -> Result<Option<Incident>, NocError> {
        let incidents = self.incidents.read().await;
        Ok(incidents
            .values()
            .find(|i| i.incident_number == incident_number)
            .cloned())
    }

    async fn count_by_year(&self, year: i32) -> Result<u64, NocError> {
        let incidents = self.incidents.read().await;
        Ok(incidents
            .values()
            .filter(|i| i.created_at.year() == year)
            .count() as u64)
    }

    async fn save(&self, incident: &Incident) -> Result<(), NocError> {
        let mut incidents = self.incidents.write().await;

        let taken = incidents
            .values()
            .any(|other| other.id != incident.id && other.incident_number == incident.incident_number);
        if taken {
            return Err(NocError::Conflict {
                field: "incident_number".to_string(),
                message: format!("{} is already assigned", incident.incident_number),
            });
        }

        incidents.insert(incident.id, incident.clone());
        Ok(())
    }

    async fn find_open(&self) -> Result<Vec<Incident>, NocError> {
        Ok(self.select(|i| i.status.is_active()).await)
    }

    async fn find_by_priority(
        &self,
        priority: IncidentPriority,
    ) -> Result<Vec<Incident>, NocError> {
        let mut found = self.select(|i| i.priority == priority).await;
        found.reverse();
        Ok(found)
    }

    async fn find_sla_breached(&self) -> Result<Vec<Incident>, NocError> {
        Ok(self.select(|i| i.sla_breach).await)
    }

    async fn find_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Incident>, NocError> {
        Ok(self
            .select(|i| i.detected_at >= start && i.detected_at <= end)
            .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::{sample_incident, t0};
    use crate::model::IncidentStatus;
    use chrono::{Duration, TimeZone};

    fn numbered(number: &str, priority: IncidentPriority, detected_offset_mins: i64) -> Incident {
        let mut incident = sample_incident(priority, None);
        incident.incident_number = number.to_string();
        incident.detected_at = t0() + Duration::minutes(detected_offset_mins);
        incident
    }

    #[tokio::test]
    async fn test_save_and_lookup() {
        let repo = InMemoryIncidentRepository::new();
        let incident = numbered("INC-202503-0001", IncidentPriority::High, 0);
        repo.save(&incident).await.unwrap();

        assert_eq!(repo.find_by_id(incident.id).await.unwrap(), Some(incident.clone()));
        assert_eq!(
            repo.find_by_number("INC-202503-0001").await.unwrap().map(|i| i.id),
            Some(incident.id)
        );
        assert!(repo.find_by_id(IncidentId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_number_conflicts() {
        let repo = InMemoryIncidentRepository::new();
        repo.save(&numbered("INC-202503-0001", IncidentPriority::High, 0))
            .await
            .unwrap();

        let err = repo
            .save(&numbered("INC-202503-0001", IncidentPriority::Low, 5))
            .await
            .unwrap_err();
        assert!(matches!(err, NocError::Conflict { .. }));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_count_by_year() {
        let repo = InMemoryIncidentRepository::new();
        repo.save(&numbered("INC-202503-0001", IncidentPriority::High, 0))
            .await
            .unwrap();
        let mut old = numbered("INC-202412-0099", IncidentPriority::High, 0);
        old.created_at = Utc.with_ymd_and_hms(2024, 12, 31, 23, 0, 0).unwrap();
        repo.save(&old).await.unwrap();

        assert_eq!(repo.count_by_year(2025).await.unwrap(), 1);
        assert_eq!(repo.count_by_year(2024).await.unwrap(), 1);
        assert_eq!(repo.count_by_year(2023).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_queries() {
        let repo = InMemoryIncidentRepository::new();
        let a = numbered("INC-202503-0001", IncidentPriority::High, 0);
        let b = numbered("INC-202503-0002", IncidentPriority::High, 30);
        let mut c = numbered("INC-202503-0003", IncidentPriority::Low, 60);
        c.status = IncidentStatus::Resolved;
        c.sla_breach = true;
        for incident in [&a, &b, &c] {
            repo.save(incident).await.unwrap();
        }

        let open: Vec<_> = repo.find_open().await.unwrap().into_iter().map(|i| i.id).collect();
        assert_eq!(open, vec![a.id, b.id]);

        let high: Vec<_> = repo
            .find_by_priority(IncidentPriority::High)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(high, vec![b.id, a.id]);

        let breached = repo.find_sla_breached().await.unwrap();
        assert_eq!(breached.len(), 1);
        assert_eq!(breached[0].id, c.id);

        let range = repo
            .find_by_date_range(t0() + Duration::minutes(30), t0() + Duration::minutes(60))
            .await
            .unwrap();
        assert_eq!(range.iter().map(|i| i.id).collect::<Vec<_>>(), vec![b.id, c.id]);
    }
}

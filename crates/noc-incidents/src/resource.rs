//! Exposes incidents to the authorization gate.

use std::sync::Arc;

use async_trait::async_trait;
use noc_authorization::{Resource, ResourceRepository, ResourceType};
use noc_core::{IncidentId, NocError};

use crate::repository::IncidentRepository;

/// [`ResourceRepository`] over an [`IncidentRepository`].
///
/// Accepts either the incident id or its `INC-` number.
#[derive(Clone)]
pub struct IncidentResourceRepository {
    incidents: Arc<dyn IncidentRepository>,
}

impl IncidentResourceRepository {
    pub fn new(incidents: Arc<dyn IncidentRepository>) -> Self {
        Self { incidents }
    }
}

#[async_trait]
impl ResourceRepository for IncidentResourceRepository {
    async fn find_by_id(
        &self,
        resource_type: &ResourceType,
        id: &str,
    ) -> Result<Option<Resource>, NocError> {
        if *resource_type != ResourceType::Incident {
            return Ok(None);
        }

        let incident = match id.parse::<IncidentId>() {
            Ok(incident_id) => self.incidents.find_by_id(incident_id).await?,
            Err(_) => self.incidents.find_by_number(id).await?,
        };

        Ok(incident.map(|i| Resource::Incident {
            id: i.id,
            created_by: i.created_by,
            assigned_to: i.assigned_to,
        }))
    }
}

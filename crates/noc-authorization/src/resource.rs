//! Resources subject to ownership checks, and the lookup seam for them.

use async_trait::async_trait;
use noc_core::{IncidentId, NocError, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Kind of resource named in an access check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Incident,
    User,
    Device,
    Customer,
    Report,
    Other(String),
}

impl ResourceType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            ResourceType::Incident => "incident",
            ResourceType::User => "user",
            ResourceType::Device => "device",
            ResourceType::Customer => "customer",
            ResourceType::Report => "report",
            ResourceType::Other(name) => name,
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fields of a resource that access decisions look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Incident {
        id: IncidentId,
        created_by: UserId,
        assigned_to: Option<UserId>,
    },
    User {
        id: UserId,
    },
    /// Any type without an ownership rule.
    Other {
        resource_type: ResourceType,
        id: String,
    },
}

impl Resource {
    #[must_use]
    pub fn resource_type(&self) -> ResourceType {
        match self {
            Resource::Incident { .. } => ResourceType::Incident,
            Resource::User { .. } => ResourceType::User,
            Resource::Other { resource_type, .. } => resource_type.clone(),
        }
    }

    #[must_use]
    pub fn id(&self) -> String {
        match self {
            Resource::Incident { id, .. } => id.to_string(),
            Resource::User { id } => id.to_string(),
            Resource::Other { id, .. } => id.clone(),
        }
    }
}

/// Fetches the access-relevant view of a resource.
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    /// `Ok(None)` when no such resource exists.
    async fn find_by_id(
        &self,
        resource_type: &ResourceType,
        id: &str,
    ) -> Result<Option<Resource>, NocError>;
}

/// In-memory resource repository for testing.
#[derive(Debug, Default)]
pub struct InMemoryResourceRepository {
    resources: RwLock<HashMap<(ResourceType, String), Resource>>,
}

impl InMemoryResourceRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, resource: Resource) {
        let key = (resource.resource_type(), resource.id());
        self.resources.write().await.insert(key, resource);
    }
}

#[async_trait]
impl ResourceRepository for InMemoryResourceRepository {
    async fn find_by_id(
        &self,
        resource_type: &ResourceType,
        id: &str,
    ) -> Result<Option<Resource>, NocError> {
        let resources = self.resources.read().await;
        Ok(resources
            .get(&(resource_type.clone(), id.to_string()))
            .cloned())
    }
}

/// Routes lookups to a repository per resource type.
///
/// Types with no registered repository fall through to `fallback`, or
/// resolve to `None` when there is none.
#[derive(Default, Clone)]
pub struct ResourceRouter {
    routes: HashMap<ResourceType, Arc<dyn ResourceRepository>>,
    fallback: Option<Arc<dyn ResourceRepository>>,
}

impl ResourceRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn route(
        mut self,
        resource_type: ResourceType,
        repository: Arc<dyn ResourceRepository>,
    ) -> Self {
        self.routes.insert(resource_type, repository);
        self
    }

    #[must_use]
    pub fn fallback(mut self, repository: Arc<dyn ResourceRepository>) -> Self {
        self.fallback = Some(repository);
        self
    }
}

#[async_trait]
impl ResourceRepository for ResourceRouter {
    async fn find_by_id(
        &self,
        resource_type: &ResourceType,
        id: &str,
    ) -> Result<Option<Resource>, NocError> {
        match self.routes.get(resource_type).or(self.fallback.as_ref()) {
            Some(repository) => repository.find_by_id(resource_type, id).await,
            None => Ok(None),
        }
    }
}

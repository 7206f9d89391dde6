//! Exposes accounts to the authorization gate as `user` resources.

use std::sync::Arc;

use async_trait::async_trait;
use noc_authorization::{Resource, ResourceRepository, ResourceType};
use noc_core::{NocError, UserId};

use crate::repository::UserRepository;

/// [`ResourceRepository`] over a [`UserRepository`].
///
/// Answers only for [`ResourceType::User`]; ids that are not valid account
/// ids resolve to `None`.
#[derive(Clone)]
pub struct UserResourceRepository {
    users: Arc<dyn UserRepository>,
}

impl UserResourceRepository {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl ResourceRepository for UserResourceRepository {
    async fn find_by_id(
        &self,
        resource_type: &ResourceType,
        id: &str,
    ) -> Result<Option<Resource>, NocError> {
        if *resource_type != ResourceType::User {
            return Ok(None);
        }
        let Ok(user_id) = id.parse::<UserId>() else {
            return Ok(None);
        };

        Ok(self
            .users
            .find_by_id(user_id)
            .await?
            .map(|account| Resource::User { id: account.id }))
    }
}

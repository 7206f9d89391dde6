//! Account storage seam.

use std::collections::HashMap;

use async_trait::async_trait;
use noc_core::{NocError, UserId};
use tokio::sync::RwLock;

use crate::account::{normalize_identifier, Account};

/// Account persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find by username or email, compared in [`normalize_identifier`] form.
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Account>, NocError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<Account>, NocError>;

    /// Insert or replace by id.
    ///
    /// Fails with [`NocError::Conflict`] when another account already holds
    /// the username or email.
    async fn save(&self, account: &Account) -> Result<(), NocError>;

    /// Find the account holding a password-reset token with this SHA-256 hash.
    async fn find_by_reset_token(&self, token_hash: &str) -> Result<Option<Account>, NocError>;
}

/// In-memory repository for tests and local runs.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    accounts: RwLock<HashMap<UserId, Account>>,
}

impl InMemoryUserRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Account>, NocError> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .find(|a| a.matches_identifier(identifier))
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<Account>, NocError> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn save(&self, account: &Account) -> Result<(), NocError> {
        let mut accounts = self.accounts.write().await;

        let username = normalize_identifier(&account.username);
        let email = normalize_identifier(&account.email);
        for other in accounts.values().filter(|a| a.id != account.id) {
            if normalize_identifier(&other.username) == username {
                return Err(NocError::Conflict {
                    field: "username".to_string(),
                    message: format!("'{}' is already taken", account.username),
                });
            }
            if normalize_identifier(&other.email) == email {
                return Err(NocError::Conflict {
                    field: "email".to_string(),
                    message: format!("'{}' is already registered", account.email),
                });
            }
        }

        accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn find_by_reset_token(&self, token_hash: &str) -> Result<Option<Account>, NocError> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .find(|a| a.password_reset_token_hash.as_deref() == Some(token_hash))
            .cloned())
    }
}

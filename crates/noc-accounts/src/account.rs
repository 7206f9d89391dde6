//! Operator account record.

use chrono::{DateTime, Utc};
use noc_authorization::{Actor, Role};
use noc_core::UserId;
use serde::{Deserialize, Serialize};

use crate::lockout::LockState;

/// Canonical form of a username or email: trimmed, Unicode-lowercased.
#[must_use]
pub fn normalize_identifier(value: &str) -> String {
    value.trim().to_lowercase()
}

/// A stored operator account.
///
/// `username` and `email` are stored in [`normalize_identifier`] form and
/// every lookup compares against that form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub first_name: String,
    pub last_name: String,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub failed_login_attempts: u32,
    pub locked_until: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub password_reset_token_hash: Option<String>,
    #[serde(skip_serializing)]
    pub password_reset_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// The subject used by authorization checks.
    #[must_use]
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }

    #[must_use]
    pub fn lock_state(&self) -> LockState {
        LockState::new(self.failed_login_attempts, self.locked_until)
    }

    pub fn set_lock_state(&mut self, state: LockState) {
        self.failed_login_attempts = state.failed_attempts;
        self.locked_until = state.locked_until;
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whether `identifier` names this account by username or email.
    #[must_use]
    pub fn matches_identifier(&self, identifier: &str) -> bool {
        let needle = normalize_identifier(identifier);
        normalize_identifier(&self.username) == needle || normalize_identifier(&self.email) == needle
    }

    pub(crate) fn clear_password_reset(&mut self) {
        self.password_reset_token_hash = None;
        self.password_reset_expires = None;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn sample_account() -> Account {
        Account {
            id: UserId::new(),
            username: "jperez".to_string(),
            email: "jperez@noc.example".to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
            role: Role::Technician,
            is_active: true,
            first_name: "Juan".to_string(),
            last_name: "Perez".to_string(),
            department: Some("Field Ops".to_string()),
            phone: Some("+5215512345678".to_string()),
            failed_login_attempts: 0,
            locked_until: None,
            last_login: None,
            password_reset_token_hash: None,
            password_reset_expires: None,
            created_at: Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_matches_identifier_case_insensitive() {
        let account = sample_account();
        assert!(account.matches_identifier("JPerez"));
        assert!(account.matches_identifier("JPEREZ@noc.example"));
        assert!(!account.matches_identifier("perez"));
    }

    #[test]
    fn test_non_ascii_email_matches_in_any_case() {
        let mut account = sample_account();
        account.email = normalize_identifier("  Ünal.Öztürk@NOC.example ");
        assert_eq!(account.email, "ünal.öztürk@noc.example");
        assert!(account.matches_identifier("ÜNAL.ÖZTÜRK@noc.example"));
        assert!(account.matches_identifier("ünal.öztürk@noc.example"));
    }

    #[test]
    fn test_actor_carries_role() {
        let account = sample_account();
        assert_eq!(account.actor(), Actor::new(account.id, Role::Technician));
    }

    #[test]
    fn test_serialization_hides_secrets() {
        let mut account = sample_account();
        account.password_reset_token_hash = Some("abc".to_string());
        let json = serde_json::to_value(&account).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("password_reset_token_hash").is_none());
        assert_eq!(json["role"], "technician");
    }

    #[test]
    fn test_lock_state_round_trip() {
        let mut account = sample_account();
        let until = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        account.set_lock_state(LockState::new(5, Some(until)));
        assert_eq!(account.lock_state(), LockState::new(5, Some(until)));
    }
}

//! Security audit records.
//!
//! Every denial made by the account service or the authorization gate
//! produces exactly one [`SecurityAuditEvent`]. Sinks are fire-and-forget:
//! recording never fails the request that produced the event.

use std::net::IpAddr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::resource::ResourceType;
use crate::roles::{Permission, Role};
use noc_core::UserId;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityAction {
    LoginSuccess,
    LoginFailed,
    Logout,
    TokenRefreshed,
    RefreshFailed,
    AuthenticationFailed,
    AuthorizationFailed,
    ResourceAccessDenied,
    RateLimitExceeded,
    UserRegistered,
    PasswordChanged,
    PasswordResetRequested,
    PasswordResetCompleted,
    AccountUnlocked,
}

impl SecurityAction {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityAction::LoginSuccess => "login_success",
            SecurityAction::LoginFailed => "login_failed",
            SecurityAction::Logout => "logout",
            SecurityAction::TokenRefreshed => "token_refreshed",
            SecurityAction::RefreshFailed => "refresh_failed",
            SecurityAction::AuthenticationFailed => "authentication_failed",
            SecurityAction::AuthorizationFailed => "authorization_failed",
            SecurityAction::ResourceAccessDenied => "resource_access_denied",
            SecurityAction::RateLimitExceeded => "rate_limit_exceeded",
            SecurityAction::UserRegistered => "user_registered",
            SecurityAction::PasswordChanged => "password_changed",
            SecurityAction::PasswordResetRequested => "password_reset_requested",
            SecurityAction::PasswordResetCompleted => "password_reset_completed",
            SecurityAction::AccountUnlocked => "account_unlocked",
        }
    }

    /// Whether the action records a refused request.
    #[must_use]
    pub fn is_denial(&self) -> bool {
        matches!(
            self,
            SecurityAction::LoginFailed
                | SecurityAction::RefreshFailed
                | SecurityAction::AuthenticationFailed
                | SecurityAction::AuthorizationFailed
                | SecurityAction::ResourceAccessDenied
                | SecurityAction::RateLimitExceeded
        )
    }
}

impl std::fmt::Display for SecurityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client details attached to a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMeta {
    pub ip: Option<IpAddr>,
    pub user_agent: Option<String>,
}

impl RequestMeta {
    #[must_use]
    pub fn new(ip: Option<IpAddr>, user_agent: Option<String>) -> Self {
        Self { ip, user_agent }
    }
}

/// A security audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityAuditEvent {
    pub id: Uuid,
    pub action: SecurityAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_role: Option<Role>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_roles: Vec<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_permission: Option<Permission>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<ResourceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Action-specific fields (attempt counts, window sizes).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

impl SecurityAuditEvent {
    #[must_use]
    pub fn new(action: SecurityAction, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            action,
            reason: None,
            actor_id: None,
            actor_role: None,
            required_roles: Vec::new(),
            required_permission: None,
            resource_type: None,
            resource_id: None,
            ip: None,
            user_agent: None,
            details: None,
            timestamp,
        }
    }

    #[must_use]
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[must_use]
    pub fn actor(mut self, id: UserId, role: Option<Role>) -> Self {
        self.actor_id = Some(id);
        self.actor_role = role;
        self
    }

    #[must_use]
    pub fn required_roles(mut self, roles: &[Role]) -> Self {
        self.required_roles = roles.to_vec();
        self
    }

    #[must_use]
    pub fn required_permission(mut self, permission: Permission) -> Self {
        self.required_permission = Some(permission);
        self
    }

    #[must_use]
    pub fn resource(mut self, resource_type: ResourceType, id: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type);
        self.resource_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn meta(mut self, meta: &RequestMeta) -> Self {
        self.ip = meta.ip;
        self.user_agent = meta.user_agent.clone();
        self
    }

    #[must_use]
    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Destination for security audit records.
#[async_trait]
pub trait SecurityAuditSink: Send + Sync {
    async fn record(&self, event: SecurityAuditEvent);
}

/// In-memory audit sink for testing.
#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
    events: RwLock<Vec<SecurityAuditEvent>>,
}

impl InMemoryAuditSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All records, oldest first.
    pub async fn events(&self) -> Vec<SecurityAuditEvent> {
        self.events.read().await.clone()
    }

    pub async fn events_with_action(&self, action: SecurityAction) -> Vec<SecurityAuditEvent> {
        self.events
            .read()
            .await
            .iter()
            .filter(|e| e.action == action)
            .cloned()
            .collect()
    }

    pub async fn count(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn clear(&self) {
        self.events.write().await.clear();
    }
}

#[async_trait]
impl SecurityAuditSink for InMemoryAuditSink {
    async fn record(&self, event: SecurityAuditEvent) {
        self.events.write().await.push(event);
    }
}

/// Writes each record to the `security` tracing target.
///
/// Denials are logged at `warn`, everything else at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

#[async_trait]
impl SecurityAuditSink for TracingAuditSink {
    async fn record(&self, event: SecurityAuditEvent) {
        let actor_id = event.actor_id.map(|id| id.to_string());
        let actor_role = event.actor_role.map(|r| r.as_str());
        let required_permission = event.required_permission.as_ref().map(Permission::as_str);
        let resource_type = event.resource_type.as_ref().map(ResourceType::as_str);
        let required_roles: Vec<&str> = event.required_roles.iter().map(Role::as_str).collect();

        if event.action.is_denial() {
            warn!(
                target: "security",
                event_id = %event.id,
                action = %event.action,
                reason = ?event.reason,
                actor_id = ?actor_id,
                actor_role = ?actor_role,
                required_roles = ?required_roles,
                required_permission = ?required_permission,
                resource_type = ?resource_type,
                resource_id = ?event.resource_id,
                ip = ?event.ip,
                user_agent = ?event.user_agent,
                details = ?event.details,
                "Security event"
            );
        } else {
            info!(
                target: "security",
                event_id = %event.id,
                action = %event.action,
                actor_id = ?actor_id,
                actor_role = ?actor_role,
                ip = ?event.ip,
                user_agent = ?event.user_agent,
                details = ?event.details,
                "Security event"
            );
        }
    }
}

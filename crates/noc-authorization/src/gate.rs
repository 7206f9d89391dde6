//! Request-level authorization checks.
//!
//! Each `require_*` call either returns what the caller needs next (the
//! actor, the resource) or records one security audit event and returns a
//! typed [`AccessError`].

use std::sync::Arc;

use chrono::Duration;
use noc_core::Clock;
use serde_json::json;
use tracing::{debug, instrument};

use crate::access::{can_access_resource, has_any_role, has_permission, Actor};
use crate::audit::{RequestMeta, SecurityAction, SecurityAuditEvent, SecurityAuditSink};
use crate::error::AccessError;
use crate::rate_limit::{RateLimitStore, WindowOutcome};
use crate::resource::{Resource, ResourceRepository, ResourceType};
use crate::roles::{Permission, Role};

/// Who is asking, and from where.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub actor: Option<Actor>,
    pub meta: RequestMeta,
}

impl RequestContext {
    #[must_use]
    pub fn authenticated(actor: Actor, meta: RequestMeta) -> Self {
        Self {
            actor: Some(actor),
            meta,
        }
    }

    #[must_use]
    pub fn anonymous(meta: RequestMeta) -> Self {
        Self { actor: None, meta }
    }
}

/// Applies the role model, resource ownership and rate limits to requests.
#[derive(Clone)]
pub struct AuthorizationGate {
    resources: Arc<dyn ResourceRepository>,
    audit: Arc<dyn SecurityAuditSink>,
    rate_limits: RateLimitStore,
    clock: Arc<dyn Clock>,
}

impl AuthorizationGate {
    pub fn new(
        resources: Arc<dyn ResourceRepository>,
        audit: Arc<dyn SecurityAuditSink>,
        rate_limits: RateLimitStore,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            resources,
            audit,
            rate_limits,
            clock,
        }
    }

    fn event(&self, action: SecurityAction, ctx: &RequestContext) -> SecurityAuditEvent {
        let event = SecurityAuditEvent::new(action, self.clock.now()).meta(&ctx.meta);
        match ctx.actor {
            Some(actor) => event.actor(actor.id, Some(actor.role)),
            None => event,
        }
    }

    /// The request must carry an actor.
    pub async fn require_authenticated(&self, ctx: &RequestContext) -> Result<Actor, AccessError> {
        match ctx.actor {
            Some(actor) => Ok(actor),
            None => {
                self.audit
                    .record(
                        self.event(SecurityAction::AuthenticationFailed, ctx)
                            .reason("not_authenticated"),
                    )
                    .await;
                Err(AccessError::Unauthenticated)
            }
        }
    }

    /// The actor must hold one of `roles` (admin always passes).
    #[instrument(skip(self, ctx), fields(actor_id = ?ctx.actor.map(|a| a.id)))]
    pub async fn require_role(
        &self,
        ctx: &RequestContext,
        roles: &[Role],
    ) -> Result<Actor, AccessError> {
        let actor = self.require_authenticated(ctx).await?;

        if has_any_role(&actor, roles) {
            return Ok(actor);
        }

        self.audit
            .record(
                self.event(SecurityAction::AuthorizationFailed, ctx)
                    .reason("insufficient_permissions")
                    .required_roles(roles),
            )
            .await;

        let required: Vec<&str> = roles.iter().map(Role::as_str).collect();
        Err(AccessError::Forbidden {
            reason: format!("requires one of roles: {}", required.join(", ")),
        })
    }

    /// The actor's role must grant `permission` (admin always passes).
    #[instrument(skip(self, ctx), fields(actor_id = ?ctx.actor.map(|a| a.id), permission = %permission))]
    pub async fn require_permission(
        &self,
        ctx: &RequestContext,
        permission: Permission,
    ) -> Result<Actor, AccessError> {
        let actor = self.require_authenticated(ctx).await?;

        if has_permission(&actor, &permission) {
            return Ok(actor);
        }

        let reason = format!("requires permission: {permission}");
        self.audit
            .record(
                self.event(SecurityAction::AuthorizationFailed, ctx)
                    .reason("insufficient_permissions")
                    .required_permission(permission),
            )
            .await;

        Err(AccessError::Forbidden { reason })
    }

    /// The actor's role must grant at least one of `permissions`.
    ///
    /// A refusal records a single audit event listing every accepted
    /// permission.
    #[instrument(skip(self, ctx), fields(actor_id = ?ctx.actor.map(|a| a.id)))]
    pub async fn require_any_permission(
        &self,
        ctx: &RequestContext,
        permissions: &[Permission],
    ) -> Result<Actor, AccessError> {
        let actor = self.require_authenticated(ctx).await?;

        if permissions.iter().any(|p| has_permission(&actor, p)) {
            return Ok(actor);
        }

        let accepted: Vec<&str> = permissions.iter().map(Permission::as_str).collect();
        let mut event = self
            .event(SecurityAction::AuthorizationFailed, ctx)
            .reason("insufficient_permissions")
            .details(json!({ "accepted_permissions": accepted }));
        if let Some(first) = permissions.first() {
            event = event.required_permission(first.clone());
        }
        self.audit.record(event).await;

        Err(AccessError::Forbidden {
            reason: format!("requires one of permissions: {}", accepted.join(", ")),
        })
    }

    /// Fetch the resource and apply the ownership rule to it.
    #[instrument(skip(self, ctx), fields(actor_id = ?ctx.actor.map(|a| a.id), resource_type = %resource_type))]
    pub async fn require_resource_access(
        &self,
        ctx: &RequestContext,
        resource_type: ResourceType,
        id: &str,
    ) -> Result<Resource, AccessError> {
        let actor = self.require_authenticated(ctx).await?;

        let Some(resource) = self.resources.find_by_id(&resource_type, id).await? else {
            debug!(resource_id = %id, "Resource not found");
            self.audit
                .record(
                    self.event(SecurityAction::ResourceAccessDenied, ctx)
                        .reason("resource_not_found")
                        .resource(resource_type.clone(), id),
                )
                .await;
            return Err(AccessError::NotFound {
                resource_type,
                id: id.to_string(),
            });
        };

        if can_access_resource(&actor, &resource) {
            return Ok(resource);
        }

        self.audit
            .record(
                self.event(SecurityAction::ResourceAccessDenied, ctx)
                    .reason("not_owner")
                    .resource(resource_type.clone(), id),
            )
            .await;

        Err(AccessError::Forbidden {
            reason: format!("no access to {resource_type} {id}"),
        })
    }

    /// Count the request against the actor's window.
    ///
    /// Anonymous requests are not limited here.
    pub async fn check_rate_limit(&self, ctx: &RequestContext) -> Result<(), AccessError> {
        let Some(actor) = ctx.actor else {
            return Ok(());
        };

        match self.rate_limits.check(actor.id, self.clock.now()) {
            WindowOutcome::Allowed { .. } => Ok(()),
            WindowOutcome::Limited { count, retry_after } => {
                let config = self.rate_limits.config();
                self.audit
                    .record(
                        self.event(SecurityAction::RateLimitExceeded, ctx)
                            .reason("rate_limit_exceeded")
                            .details(json!({
                                "requests_count": count,
                                "max_requests": config.max_requests,
                                "window_secs": config.window.num_seconds(),
                            })),
                    )
                    .await;

                Err(AccessError::RateLimited {
                    retry_after: whole_seconds(retry_after),
                })
            }
        }
    }
}

/// Round a positive delta up to whole seconds, at least one.
fn whole_seconds(delta: Duration) -> std::time::Duration {
    let millis = delta.num_milliseconds().max(1);
    let secs = (millis + 999) / 1000;
    std::time::Duration::from_secs(u64::try_from(secs).unwrap_or(1))
}

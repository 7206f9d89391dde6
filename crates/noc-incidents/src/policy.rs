//! Which permissions each incident operation needs.

use noc_authorization::{Actor, AuthorizationGate, Permission, RequestContext, ResourceType};
use noc_core::IncidentId;

use crate::error::IncidentError;

/// An operation on incidents, as seen by the authorization layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncidentAction {
    Create,
    View,
    /// Status transitions.
    Update,
    Communicate,
    Assign,
    Escalate,
    OverrideSla,
}

static CREATE: [Permission; 4] = [
    Permission::CreateIncidents,
    Permission::WriteIncidents,
    Permission::ManageIncidents,
    Permission::WriteAll,
];

static VIEW: [Permission; 3] = [
    Permission::ReadIncidents,
    Permission::ReadAll,
    Permission::ManageIncidents,
];

static UPDATE: [Permission; 4] = [
    Permission::UpdateIncidents,
    Permission::WriteIncidents,
    Permission::ManageIncidents,
    Permission::WriteAll,
];

static ASSIGN: [Permission; 2] = [Permission::AssignIncidents, Permission::ManageIncidents];

static ESCALATE: [Permission; 2] = [Permission::EscalateIncidents, Permission::ManageIncidents];

static OVERRIDE_SLA: [Permission; 1] = [Permission::ManageIncidents];

impl IncidentAction {
    /// Holding any one of these is enough.
    #[must_use]
    pub fn accepted_permissions(&self) -> &'static [Permission] {
        match self {
            IncidentAction::Create => &CREATE,
            IncidentAction::View => &VIEW,
            IncidentAction::Update | IncidentAction::Communicate => &UPDATE,
            IncidentAction::Assign => &ASSIGN,
            IncidentAction::Escalate => &ESCALATE,
            IncidentAction::OverrideSla => &OVERRIDE_SLA,
        }
    }
}

/// Runs the gate checks for incident operations.
#[derive(Clone)]
pub struct IncidentPolicy {
    gate: AuthorizationGate,
}

impl IncidentPolicy {
    pub fn new(gate: AuthorizationGate) -> Self {
        Self { gate }
    }

    /// Rate limit, then permission, then (for an existing incident) ownership.
    pub async fn authorize(
        &self,
        ctx: &RequestContext,
        action: IncidentAction,
        incident: Option<IncidentId>,
    ) -> Result<Actor, IncidentError> {
        let actor = self.gate.require_authenticated(ctx).await?;
        self.gate.check_rate_limit(ctx).await?;
        self.gate
            .require_any_permission(ctx, action.accepted_permissions())
            .await?;

        if let Some(id) = incident {
            self.gate
                .require_resource_access(ctx, ResourceType::Incident, &id.to_string())
                .await?;
        }

        Ok(actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noc_authorization::{has_permission, Role};
    use noc_core::UserId;

    fn allowed(role: Role, action: IncidentAction) -> bool {
        let actor = Actor::new(UserId::new(), role);
        action
            .accepted_permissions()
            .iter()
            .any(|p| has_permission(&actor, p))
    }

    #[test]
    fn test_role_matrix() {
        use IncidentAction::*;

        assert!(allowed(Role::Technician, Create));
        assert!(allowed(Role::Technician, Update));
        assert!(!allowed(Role::Technician, Assign));
        assert!(!allowed(Role::Technician, Escalate));

        assert!(allowed(Role::Supervisor, Create));
        assert!(allowed(Role::Supervisor, Assign));
        assert!(allowed(Role::Supervisor, Escalate));
        assert!(!allowed(Role::Supervisor, OverrideSla));

        assert!(allowed(Role::Viewer, View));
        assert!(!allowed(Role::Viewer, Create));
        assert!(!allowed(Role::Analyst, Communicate));

        for action in [Create, View, Update, Communicate, Assign, Escalate, OverrideSla] {
            assert!(allowed(Role::Admin, action));
        }
    }
}

//! Pure access decisions over an authenticated actor.
//!
//! Nothing here fails or logs; denials are reported by the gate.

use crate::resource::Resource;
use crate::roles::{is_superuser, permissions_of, Permission, Role};
use noc_core::UserId;
use serde::{Deserialize, Serialize};

/// The authenticated account making a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    #[must_use]
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }
}

/// `actor` holds `role`, or is admin.
#[must_use]
pub fn has_role(actor: &Actor, role: Role) -> bool {
    is_superuser(actor.role) || actor.role == role
}

/// `actor` holds any of `roles`, or is admin.
#[must_use]
pub fn has_any_role(actor: &Actor, roles: &[Role]) -> bool {
    is_superuser(actor.role) || roles.contains(&actor.role)
}

/// `actor`'s role grants `permission`, or `actor` is admin.
#[must_use]
pub fn has_permission(actor: &Actor, permission: &Permission) -> bool {
    is_superuser(actor.role) || permissions_of(actor.role).contains(permission)
}

/// Ownership rule for a single resource.
///
/// - incidents: creator, assignee, or any supervisor
/// - users: only the account itself
/// - every other type: allowed
#[must_use]
pub fn can_access_resource(actor: &Actor, resource: &Resource) -> bool {
    if is_superuser(actor.role) {
        return true;
    }

    match resource {
        Resource::Incident {
            created_by,
            assigned_to,
            ..
        } => {
            *created_by == actor.id
                || *assigned_to == Some(actor.id)
                || actor.role == Role::Supervisor
        }
        Resource::User { id } => *id == actor.id,
        // Permissive fallback for types without an ownership rule.
        Resource::Other { .. } => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceType;
    use noc_core::IncidentId;

    fn actor(role: Role) -> Actor {
        Actor::new(UserId::new(), role)
    }

    fn incident(created_by: UserId, assigned_to: Option<UserId>) -> Resource {
        Resource::Incident {
            id: IncidentId::new(),
            created_by,
            assigned_to,
        }
    }

    mod role_tests {
        use super::*;

        #[test]
        fn test_has_role_exact_match() {
            let tech = actor(Role::Technician);
            assert!(has_role(&tech, Role::Technician));
            assert!(!has_role(&tech, Role::Supervisor));
        }

        #[test]
        fn test_admin_has_every_role() {
            let admin = actor(Role::Admin);
            for role in Role::ALL {
                assert!(has_role(&admin, role));
            }
        }

        #[test]
        fn test_has_any_role() {
            let analyst = actor(Role::Analyst);
            assert!(has_any_role(&analyst, &[Role::Supervisor, Role::Analyst]));
            assert!(!has_any_role(&analyst, &[Role::Supervisor]));
            assert!(!has_any_role(&analyst, &[]));
            assert!(has_any_role(&actor(Role::Admin), &[]));
        }
    }

    mod permission_tests {
        use super::*;

        #[test]
        fn test_admin_has_any_permission_including_unknown() {
            let admin = actor(Role::Admin);
            assert!(has_permission(&admin, &Permission::EscalateIncidents));
            assert!(has_permission(&admin, &Permission::parse("anything_at_all")));
        }

        #[test]
        fn test_unknown_permission_denied_to_others() {
            for role in &Role::ALL[1..] {
                assert!(!has_permission(
                    &actor(*role),
                    &Permission::parse("anything_at_all")
                ));
            }
        }

        #[test]
        fn test_role_table_drives_permission() {
            let viewer = actor(Role::Viewer);
            assert!(has_permission(&viewer, &Permission::ReadCustomers));
            assert!(!has_permission(&viewer, &Permission::UpdateIncidents));

            let supervisor = actor(Role::Supervisor);
            assert!(has_permission(&supervisor, &Permission::AssignIncidents));
            assert!(!has_permission(&supervisor, &Permission::ManageUsers));
        }
    }

    mod resource_tests {
        use super::*;

        #[test]
        fn test_viewer_cannot_access_foreign_incident() {
            let viewer = actor(Role::Viewer);
            let resource = incident(UserId::new(), None);
            assert!(!can_access_resource(&viewer, &resource));
        }

        #[test]
        fn test_creator_and_assignee_can_access() {
            let viewer = actor(Role::Viewer);
            assert!(can_access_resource(&viewer, &incident(viewer.id, None)));

            let tech = actor(Role::Technician);
            assert!(can_access_resource(
                &tech,
                &incident(UserId::new(), Some(tech.id))
            ));
        }

        #[test]
        fn test_supervisor_can_access_any_incident() {
            let supervisor = actor(Role::Supervisor);
            assert!(can_access_resource(
                &supervisor,
                &incident(UserId::new(), Some(UserId::new()))
            ));
        }

        #[test]
        fn test_user_resource_only_self() {
            let tech = actor(Role::Technician);
            assert!(can_access_resource(&tech, &Resource::User { id: tech.id }));
            assert!(!can_access_resource(
                &tech,
                &Resource::User { id: UserId::new() }
            ));
            assert!(!can_access_resource(
                &actor(Role::Supervisor),
                &Resource::User { id: UserId::new() }
            ));
            assert!(can_access_resource(
                &actor(Role::Admin),
                &Resource::User { id: UserId::new() }
            ));
        }

        #[test]
        fn test_untyped_resources_are_permissive() {
            let viewer = actor(Role::Viewer);
            let device = Resource::Other {
                resource_type: ResourceType::Device,
                id: "core-sw-02".to_string(),
            };
            assert!(can_access_resource(&viewer, &device));
        }
    }
}

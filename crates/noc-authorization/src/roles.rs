//! Roles, permissions and the role → permission table.
//!
//! The table is a closed `match`, so adding a role forces every grant to be
//! reconsidered at compile time. Admin is a wildcard; that rule lives only
//! in [`is_superuser`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Operator role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Supervisor,
    Technician,
    Analyst,
    #[default]
    Viewer,
}

impl Role {
    /// Every role, most privileged first.
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Supervisor,
        Role::Technician,
        Role::Analyst,
        Role::Viewer,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Supervisor => "supervisor",
            Role::Technician => "technician",
            Role::Analyst => "analyst",
            Role::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a role name is not one of the known roles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown role: {0}")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| ParseRoleError(s.to_string()))
    }
}

/// A permission token.
///
/// Unknown tokens parse to [`Permission::Other`]; no role grants them, but
/// admin still passes every permission check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Permission {
    ReadAll,
    WriteAll,
    DeleteAll,
    ManageUsers,
    ManageSystem,
    ViewReports,
    ManageIncidents,
    ManageDevices,
    ManageCustomers,
    WriteIncidents,
    AssignIncidents,
    ManageTeam,
    EscalateIncidents,
    ReadIncidents,
    UpdateIncidents,
    ReadDevices,
    UpdateDevices,
    CreateIncidents,
    AnalyzeData,
    CreateReports,
    ReadCustomers,
    Other(String),
}

impl Permission {
    /// The 21 known tokens.
    pub const KNOWN: [Permission; 21] = [
        Permission::ReadAll,
        Permission::WriteAll,
        Permission::DeleteAll,
        Permission::ManageUsers,
        Permission::ManageSystem,
        Permission::ViewReports,
        Permission::ManageIncidents,
        Permission::ManageDevices,
        Permission::ManageCustomers,
        Permission::WriteIncidents,
        Permission::AssignIncidents,
        Permission::ManageTeam,
        Permission::EscalateIncidents,
        Permission::ReadIncidents,
        Permission::UpdateIncidents,
        Permission::ReadDevices,
        Permission::UpdateDevices,
        Permission::CreateIncidents,
        Permission::AnalyzeData,
        Permission::CreateReports,
        Permission::ReadCustomers,
    ];

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Permission::ReadAll => "read_all",
            Permission::WriteAll => "write_all",
            Permission::DeleteAll => "delete_all",
            Permission::ManageUsers => "manage_users",
            Permission::ManageSystem => "manage_system",
            Permission::ViewReports => "view_reports",
            Permission::ManageIncidents => "manage_incidents",
            Permission::ManageDevices => "manage_devices",
            Permission::ManageCustomers => "manage_customers",
            Permission::WriteIncidents => "write_incidents",
            Permission::AssignIncidents => "assign_incidents",
            Permission::ManageTeam => "manage_team",
            Permission::EscalateIncidents => "escalate_incidents",
            Permission::ReadIncidents => "read_incidents",
            Permission::UpdateIncidents => "update_incidents",
            Permission::ReadDevices => "read_devices",
            Permission::UpdateDevices => "update_devices",
            Permission::CreateIncidents => "create_incidents",
            Permission::AnalyzeData => "analyze_data",
            Permission::CreateReports => "create_reports",
            Permission::ReadCustomers => "read_customers",
            Permission::Other(token) => token,
        }
    }

    /// Parse a token; never fails.
    #[must_use]
    pub fn parse(token: &str) -> Self {
        Permission::KNOWN
            .iter()
            .find(|p| p.as_str() == token)
            .cloned()
            .unwrap_or_else(|| Permission::Other(token.to_string()))
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Permission {
    fn from(token: String) -> Self {
        Permission::parse(&token)
    }
}

impl From<&str> for Permission {
    fn from(token: &str) -> Self {
        Permission::parse(token)
    }
}

impl From<Permission> for String {
    fn from(permission: Permission) -> Self {
        permission.as_str().to_string()
    }
}

static ADMIN: [Permission; 9] = [
    Permission::ReadAll,
    Permission::WriteAll,
    Permission::DeleteAll,
    Permission::ManageUsers,
    Permission::ManageSystem,
    Permission::ViewReports,
    Permission::ManageIncidents,
    Permission::ManageDevices,
    Permission::ManageCustomers,
];

static SUPERVISOR: [Permission; 6] = [
    Permission::ReadAll,
    Permission::WriteIncidents,
    Permission::AssignIncidents,
    Permission::ViewReports,
    Permission::ManageTeam,
    Permission::EscalateIncidents,
];

static TECHNICIAN: [Permission; 5] = [
    Permission::ReadIncidents,
    Permission::UpdateIncidents,
    Permission::ReadDevices,
    Permission::UpdateDevices,
    Permission::CreateIncidents,
];

static ANALYST: [Permission; 4] = [
    Permission::ReadAll,
    Permission::ViewReports,
    Permission::AnalyzeData,
    Permission::CreateReports,
];

static VIEWER: [Permission; 3] = [
    Permission::ReadIncidents,
    Permission::ReadDevices,
    Permission::ReadCustomers,
];

/// Permissions granted to `role`.
#[must_use]
pub fn permissions_of(role: Role) -> &'static [Permission] {
    match role {
        Role::Admin => &ADMIN,
        Role::Supervisor => &SUPERVISOR,
        Role::Technician => &TECHNICIAN,
        Role::Analyst => &ANALYST,
        Role::Viewer => &VIEWER,
    }
}

/// Whether `role` bypasses every role, permission and resource check.
#[must_use]
pub fn is_superuser(role: Role) -> bool {
    matches!(role, Role::Admin)
}

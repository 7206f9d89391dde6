//! Authorization for the NOC engine.
//!
//! - [`roles`] - Role and permission enums and the role → permission table
//! - [`access`] - Pure role/permission/ownership decisions
//! - [`resource`] - Resource lookup seam
//! - [`audit`] - Security audit records and sinks
//! - [`rate_limit`] - Per-actor sliding window
//! - [`gate`] - Request-level checks combining all of the above
//!
//! # Example
//!
//! ```rust
//! use noc_authorization::{has_permission, Actor, Permission, Role};
//! use noc_core::UserId;
//!
//! let tech = Actor::new(UserId::new(), Role::Technician);
//! assert!(has_permission(&tech, &Permission::CreateIncidents));
//! assert!(!has_permission(&tech, &Permission::ManageUsers));
//! ```

pub mod access;
pub mod audit;
pub mod error;
pub mod gate;
pub mod rate_limit;
pub mod resource;
pub mod roles;

pub use access::{can_access_resource, has_any_role, has_permission, has_role, Actor};
pub use audit::{
    InMemoryAuditSink, RequestMeta, SecurityAction, SecurityAuditEvent, SecurityAuditSink,
    TracingAuditSink,
};
pub use error::AccessError;
pub use gate::{AuthorizationGate, RequestContext};
pub use rate_limit::{
    evaluate_window, RateLimitConfig, RateLimitStore, WindowDecision, WindowOutcome,
};
pub use resource::{
    InMemoryResourceRepository, Resource, ResourceRepository, ResourceRouter, ResourceType,
};
pub use roles::{is_superuser, permissions_of, ParseRoleError, Permission, Role};

//! NOC Core Library
//!
//! Shared types and traits for the NOC incident and access-control engine.
//!
//! # Modules
//!
//! - [`ids`] - Strongly typed identifiers (UserId, IncidentId, CommunicationId)
//! - [`clock`] - Injectable time source (Clock, SystemClock, FixedClock)
//! - [`config`] - Environment lookup helpers (ConfigError)
//! - [`error`] - Standardized error types (NocError)
//! - [`logging`] - Structured JSON logging setup
//!
//! # Example
//!
//! ```
//! use noc_core::{Clock, FixedClock, IncidentId, NocError, Result, UserId};
//!
//! let user_id = UserId::new();
//! let incident_id = IncidentId::new();
//!
//! let clock = FixedClock::at("2025-03-01T08:00:00Z".parse().unwrap());
//! assert_eq!(clock.now().to_rfc3339(), "2025-03-01T08:00:00+00:00");
//!
//! fn example() -> Result<()> {
//!     Err(NocError::Unauthorized { message: None })
//! }
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod ids;
pub mod logging;

// Re-export main types for convenient access
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::ConfigError;
pub use error::{NocError, Result};
pub use ids::{CommunicationId, CustomerId, DeviceId, IncidentId, ParseIdError, UserId};

//! Operator accounts for the NOC engine.
//!
//! - [`lockout`] - Failed-login lock state machine (pure)
//! - [`service`] - [`AuthenticationService`]: login, refresh, token
//!   authentication, registration, password change and reset, unlock
//! - [`repository`] - [`UserRepository`] seam and in-memory store
//! - [`config`] - [`AuthConfig`] from the environment
//!
//! # Example
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use noc_accounts::lockout::{is_locked, record_failed_attempt, LockState};
//!
//! let now = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
//! let mut state = LockState::default();
//! for _ in 0..5 {
//!     state = record_failed_attempt(state, now);
//! }
//! assert!(is_locked(state, now + Duration::minutes(29)));
//! assert!(!is_locked(state, now + Duration::minutes(31)));
//! ```

pub mod account;
pub mod config;
pub mod error;
pub mod lockout;
pub mod repository;
pub mod resource;
pub mod service;
pub mod tokens;
pub mod validation;

pub use account::Account;
pub use config::AuthConfig;
pub use error::AccountError;
pub use lockout::{LockState, LockoutPolicy};
pub use repository::{InMemoryUserRepository, UserRepository};
pub use resource::UserResourceRepository;
pub use service::{AuthenticationService, LoginRequest, Session, TokenPair};
pub use validation::NewAccount;

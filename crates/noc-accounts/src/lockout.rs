//! Failed-login lockout state machine.
//!
//! The state is the pair `(failed_attempts, locked_until)` stored on the
//! account. Everything here is a pure function of that pair and `now`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Failed attempts that trigger a lock.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Lock duration in minutes.
pub const DEFAULT_LOCK_MINUTES: i64 = 30;

/// Lockout fields of an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockState {
    pub failed_attempts: u32,
    pub locked_until: Option<DateTime<Utc>>,
}

impl LockState {
    #[must_use]
    pub fn new(failed_attempts: u32, locked_until: Option<DateTime<Utc>>) -> Self {
        Self {
            failed_attempts,
            locked_until,
        }
    }
}

/// Threshold and duration of the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    pub max_attempts: u32,
    pub lock_duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            lock_duration: Duration::minutes(DEFAULT_LOCK_MINUTES),
        }
    }
}

impl LockoutPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, lock_duration: Duration) -> Self {
        Self {
            max_attempts,
            lock_duration,
        }
    }

    /// Register one wrong password.
    ///
    /// An expired lock is cleared first and the attempt counts as the first
    /// of a new series. While a lock is still active the counter moves but
    /// the expiry does not.
    #[must_use]
    pub fn record_failed_attempt(&self, state: LockState, now: DateTime<Utc>) -> LockState {
        if let Some(until) = state.locked_until {
            if until < now {
                return LockState::new(1, None);
            }
        }

        let failed_attempts = state.failed_attempts.saturating_add(1);
        let currently_locked = self.is_locked(state, now);

        let locked_until = if failed_attempts >= self.max_attempts && !currently_locked {
            Some(now + self.lock_duration)
        } else {
            state.locked_until
        };

        LockState {
            failed_attempts,
            locked_until,
        }
    }

    #[must_use]
    pub fn record_success(&self) -> LockState {
        LockState::default()
    }

    #[must_use]
    pub fn is_locked(&self, state: LockState, now: DateTime<Utc>) -> bool {
        state.locked_until.is_some_and(|until| until > now)
    }
}

/// [`LockoutPolicy::record_failed_attempt`] with the default policy.
#[must_use]
pub fn record_failed_attempt(state: LockState, now: DateTime<Utc>) -> LockState {
    LockoutPolicy::default().record_failed_attempt(state, now)
}

/// A fresh unlocked state.
#[must_use]
pub fn record_success() -> LockState {
    LockState::default()
}

#[must_use]
pub fn is_locked(state: LockState, now: DateTime<Utc>) -> bool {
    LockoutPolicy::default().is_locked(state, now)
}

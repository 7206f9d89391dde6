//! Injectable time source.
//!
//! Every timestamp the engine writes (lock expiry, SLA checks, token
//! expiry, rate-limit windows) comes from a [`Clock`], so behavior can be
//! pinned in tests with [`FixedClock`].

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// Returns the current UTC instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock backed by [`Utc::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests.
///
/// ```
/// use chrono::Duration;
/// use noc_core::{Clock, FixedClock};
///
/// let clock = FixedClock::at("2025-03-01T08:00:00Z".parse().unwrap());
/// let start = clock.now();
/// clock.advance(Duration::minutes(241));
/// assert_eq!(clock.now() - start, Duration::minutes(241));
/// ```
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Creates a clock frozen at `now`.
    #[must_use]
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock forward (or backward, with a negative duration).
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    /// Jumps to an absolute instant.
    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn t0() -> DateTime<Utc> {
        "2025-03-01T08:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_fixed_clock_is_frozen() {
        let clock = FixedClock::at(t0());
        assert_eq!(clock.now(), t0());
        assert_eq!(clock.now(), t0());
    }

    #[test]
    fn test_fixed_clock_advance_and_set() {
        let clock = FixedClock::at(t0());
        clock.advance(Duration::minutes(30));
        assert_eq!(clock.now(), t0() + Duration::minutes(30));

        clock.set(t0());
        assert_eq!(clock.now(), t0());
    }

    #[test]
    fn test_shared_clock_sees_advances() {
        let clock = Arc::new(FixedClock::at(t0()));
        let shared: Arc<dyn Clock> = clock.clone();
        clock.advance(Duration::seconds(90));
        assert_eq!(shared.now(), t0() + Duration::seconds(90));
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}

//! Per-actor sliding-window request limiting.
//!
//! The window arithmetic is the pure [`evaluate_window`]; [`RateLimitStore`]
//! only keeps the per-actor timestamp lists between calls.

use chrono::{DateTime, Duration, Utc};
use noc_core::config::{bounded_duration, parsed_or, process_env};
use noc_core::{ConfigError, UserId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Default maximum requests per window.
pub const DEFAULT_MAX_REQUESTS: usize = 100;

/// Default window duration in seconds (15 minutes).
pub const DEFAULT_WINDOW_SECS: i64 = 15 * 60;

/// Longest configurable window (one week).
pub const MAX_WINDOW_SECS: i64 = 7 * 24 * 60 * 60;

/// Configuration for the per-actor limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum number of requests allowed within the window.
    pub max_requests: usize,
    /// Duration of the sliding window.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_MAX_REQUESTS,
            window: Duration::seconds(DEFAULT_WINDOW_SECS),
        }
    }
}

impl RateLimitConfig {
    /// Load from `USER_RATE_LIMIT_MAX` and `USER_RATE_LIMIT_WINDOW_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&process_env)
    }

    pub fn from_lookup<L>(lookup: &L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let max_requests = parsed_or(lookup, "USER_RATE_LIMIT_MAX", DEFAULT_MAX_REQUESTS)?;
        let window = bounded_duration(
            lookup,
            "USER_RATE_LIMIT_WINDOW_SECS",
            DEFAULT_WINDOW_SECS,
            MAX_WINDOW_SECS,
            Duration::seconds,
        )?;

        Ok(Self {
            max_requests,
            window,
        })
    }
}

/// Verdict for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowOutcome {
    /// Request counted; `remaining` more fit in the current window.
    Allowed { remaining: usize },
    /// Window is full; the oldest counted request leaves it after `retry_after`.
    Limited { count: usize, retry_after: Duration },
}

/// Result of [`evaluate_window`]: the verdict and the timestamps to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowDecision {
    pub outcome: WindowOutcome,
    pub timestamps: Vec<DateTime<Utc>>,
}

/// Decide whether a request at `now` fits the window.
///
/// Timestamps at or before `now - window` are dropped. If the remaining
/// count is below the maximum, `now` is appended; a refused request is
/// not counted.
#[must_use]
pub fn evaluate_window(
    timestamps: &[DateTime<Utc>],
    now: DateTime<Utc>,
    config: &RateLimitConfig,
) -> WindowDecision {
    let window_start = now - config.window;
    let mut kept: Vec<DateTime<Utc>> = timestamps
        .iter()
        .copied()
        .filter(|t| *t > window_start)
        .collect();

    if kept.len() >= config.max_requests {
        let retry_after = kept
            .iter()
            .min()
            .map(|oldest| *oldest + config.window - now)
            .unwrap_or(config.window);

        return WindowDecision {
            outcome: WindowOutcome::Limited {
                count: kept.len(),
                retry_after,
            },
            timestamps: kept,
        };
    }

    kept.push(now);
    WindowDecision {
        outcome: WindowOutcome::Allowed {
            remaining: config.max_requests - kept.len(),
        },
        timestamps: kept,
    }
}

/// Tracked actors above which [`RateLimitStore::check`] sweeps stale entries.
pub const SWEEP_THRESHOLD: usize = 1024;

/// Shared per-actor timestamp lists.
///
/// Cloning shares the underlying map. Once more than [`SWEEP_THRESHOLD`]
/// actors are tracked, each `check` first drops actors with nothing left in
/// the window, so idle actors do not accumulate.
#[derive(Debug, Clone)]
pub struct RateLimitStore {
    config: RateLimitConfig,
    entries: Arc<Mutex<HashMap<UserId, Vec<DateTime<Utc>>>>>,
}

impl Default for RateLimitStore {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

impl RateLimitStore {
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    #[must_use]
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Count a request from `actor` at `now`.
    pub fn check(&self, actor: UserId, now: DateTime<Utc>) -> WindowOutcome {
        let mut entries = self.entries.lock();
        if entries.len() > SWEEP_THRESHOLD {
            let window_start = now - self.config.window;
            entries.retain(|_, timestamps| timestamps.iter().any(|t| *t > window_start));
        }
        let current = entries.get(&actor).map(Vec::as_slice).unwrap_or(&[]);
        let decision = evaluate_window(current, now, &self.config);
        entries.insert(actor, decision.timestamps);
        decision.outcome
    }

    /// Forget everything recorded for `actor`.
    pub fn reset(&self, actor: UserId) {
        self.entries.lock().remove(&actor);
    }

    /// Drop actors with no request inside the window.
    pub fn cleanup(&self, now: DateTime<Utc>) {
        let window_start = now - self.config.window;
        self.entries
            .lock()
            .retain(|_, timestamps| timestamps.iter().any(|t| *t > window_start));
    }

    /// Number of actors currently tracked.
    #[must_use]
    pub fn tracked_actors(&self) -> usize {
        self.entries.lock().len()
    }
}

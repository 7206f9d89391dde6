//! Environment-driven configuration helpers.
//!
//! Each crate's config struct reads its variables through a lookup
//! function so the parsing can be exercised without touching the process
//! environment. `from_env` variants pass [`process_env`].

use chrono::Duration;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Lookup against the real process environment.
pub fn process_env(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

/// Read a required, non-empty variable.
pub fn required<L>(lookup: &L, var: &str) -> Result<String, ConfigError>
where
    L: Fn(&str) -> Option<String>,
{
    lookup(var)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingVar(var.to_string()))
}

/// Read an optional variable, parsing it when present.
///
/// Unset or empty falls back to `default`; a value that does not parse
/// is an error rather than a silent default.
pub fn parsed_or<L, T>(lookup: &L, var: &str, default: T) -> Result<T, ConfigError>
where
    L: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(var).filter(|v| !v.trim().is_empty()) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            var: var.to_string(),
            message: e.to_string(),
        }),
    }
}

/// Read a whole number of `unit`s in `1..=max` and convert it.
///
/// The bound is checked before conversion, so `unit` never sees a value
/// chrono cannot represent.
pub fn bounded_duration<L>(
    lookup: &L,
    var: &str,
    default: i64,
    max: i64,
    unit: fn(i64) -> Duration,
) -> Result<Duration, ConfigError>
where
    L: Fn(&str) -> Option<String>,
{
    let count: i64 = parsed_or(lookup, var, default)?;
    if !(1..=max).contains(&count) {
        return Err(ConfigError::InvalidValue {
            var: var.to_string(),
            message: format!("must be between 1 and {max}"),
        });
    }
    Ok(unit(count))
}

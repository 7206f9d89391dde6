//! Human-readable incident numbers.
//!
//! Format: `INC-{YYYY}{MM}-{NNNN}`. The sequence restarts every calendar
//! year (not every month) and widens past 9999.

use chrono::{DateTime, Datelike, Utc};

/// Format an incident number.
#[must_use]
pub fn generate_incident_number(year: i32, month: u32, sequence: u64) -> String {
    format!("INC-{year:04}{month:02}-{sequence:04}")
}

/// Number for the incident following `prior_in_year` incidents created this year.
#[must_use]
pub fn next_incident_number(now: DateTime<Utc>, prior_in_year: u64) -> String {
    generate_incident_number(now.year(), now.month(), prior_in_year + 1)
}

/// Split a number into `(year, month, sequence)`.
#[must_use]
pub fn parse_incident_number(number: &str) -> Option<(i32, u32, u64)> {
    let rest = number.strip_prefix("INC-")?;
    let (period, sequence) = rest.split_once('-')?;
    if period.len() != 6 || !period.is_ascii() || sequence.len() < 4 {
        return None;
    }
    let year = period[..4].parse::<i32>().ok()?;
    let month = period[4..].parse::<u32>().ok().filter(|m| (1..=12).contains(m))?;
    let sequence = sequence.parse::<u64>().ok()?;
    Some((year, month, sequence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format() {
        assert_eq!(generate_incident_number(2025, 3, 1), "INC-202503-0001");
        assert_eq!(generate_incident_number(2025, 11, 42), "INC-202511-0042");
    }

    #[test]
    fn test_sequence_widens_past_four_digits() {
        assert_eq!(generate_incident_number(2025, 12, 10_000), "INC-202512-10000");
    }

    #[test]
    fn test_next_uses_clock_month() {
        let now = Utc.with_ymd_and_hms(2025, 7, 15, 23, 59, 0).unwrap();
        assert_eq!(next_incident_number(now, 130), "INC-202507-0131");
    }

    #[test]
    fn test_parse() {
        assert_eq!(parse_incident_number("INC-202503-0007"), Some((2025, 3, 7)));
        assert_eq!(parse_incident_number("INC-202512-10000"), Some((2025, 12, 10_000)));
        assert_eq!(parse_incident_number("INC-202513-0001"), None);
        assert_eq!(parse_incident_number("TCK-202503-0001"), None);
        assert_eq!(parse_incident_number("INC-202503-1"), None);
    }
}

//! SLA targets and status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Incident, IncidentPriority};

/// Largest accepted SLA target: one year, in minutes.
pub const MAX_SLA_TARGET_MINUTES: i64 = 525_600;

/// Default SLA target in minutes for a priority.
#[must_use]
pub fn default_sla_target(priority: IncidentPriority) -> i64 {
    match priority {
        IncidentPriority::Critical => 240,
        IncidentPriority::High => 480,
        IncidentPriority::Medium => 1440,
        IncidentPriority::Low => 4320,
    }
}

/// Where an incident stands against its SLA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaStatus {
    NoSla,
    Breached,
    /// 10% or less of the target remains.
    Critical,
    /// 25% or less of the target remains.
    Warning,
    OnTrack,
}

impl SlaStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SlaStatus::NoSla => "no_sla",
            SlaStatus::Breached => "breached",
            SlaStatus::Critical => "critical",
            SlaStatus::Warning => "warning",
            SlaStatus::OnTrack => "on_track",
        }
    }
}

impl std::fmt::Display for SlaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn floor_minutes(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_milliseconds().div_euclid(60_000)
}

/// Whole minutes from detection to resolution (or closure, or `now`).
///
/// The end point never lies after `now`.
#[must_use]
pub fn elapsed_minutes(incident: &Incident, now: DateTime<Utc>) -> i64 {
    let end = incident
        .resolved_at
        .or(incident.closed_at)
        .map_or(now, |end| end.min(now));
    floor_minutes(incident.detected_at, end)
}

/// Fractional minutes since detection, as used for breach detection.
#[must_use]
pub fn elapsed_minutes_exact(incident: &Incident, now: DateTime<Utc>) -> f64 {
    (now - incident.detected_at).num_milliseconds() as f64 / 60_000.0
}

/// Whole minutes from detection to resolution, if resolved.
#[must_use]
pub fn time_to_resolution(incident: &Incident) -> Option<i64> {
    incident
        .resolved_at
        .map(|resolved| floor_minutes(incident.detected_at, resolved))
}

#[must_use]
pub fn compute_sla_status(incident: &Incident, now: DateTime<Utc>) -> SlaStatus {
    let Some(target) = incident.sla_target else {
        return SlaStatus::NoSla;
    };

    let remaining = target.saturating_sub(elapsed_minutes(incident, now));

    if incident.sla_breach || remaining <= 0 {
        return SlaStatus::Breached;
    }

    let remaining = remaining as f64;
    let target = target as f64;
    if remaining <= target * 0.1 {
        SlaStatus::Critical
    } else if remaining <= target * 0.25 {
        SlaStatus::Warning
    } else {
        SlaStatus::OnTrack
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::{sample_incident, t0};
    use chrono::Duration;

    #[test]
    fn test_default_targets() {
        assert_eq!(default_sla_target(IncidentPriority::Critical), 240);
        assert_eq!(default_sla_target(IncidentPriority::High), 480);
        assert_eq!(default_sla_target(IncidentPriority::Medium), 1440);
        assert_eq!(default_sla_target(IncidentPriority::Low), 4320);
    }

    #[test]
    fn test_no_target() {
        let incident = sample_incident(IncidentPriority::Low, None);
        assert_eq!(compute_sla_status(&incident, t0()), SlaStatus::NoSla);
    }

    #[test]
    fn test_thresholds_for_critical_priority() {
        let incident = sample_incident(IncidentPriority::Critical, Some(240));
        let at = |mins: i64| compute_sla_status(&incident, t0() + Duration::minutes(mins));

        assert_eq!(at(0), SlaStatus::OnTrack);
        assert_eq!(at(179), SlaStatus::OnTrack);
        // 60 of 240 left is exactly 25%.
        assert_eq!(at(180), SlaStatus::Warning);
        assert_eq!(at(215), SlaStatus::Warning);
        // 24 of 240 left is exactly 10%.
        assert_eq!(at(216), SlaStatus::Critical);
        assert_eq!(at(239), SlaStatus::Critical);
        assert_eq!(at(240), SlaStatus::Breached);
        assert_eq!(at(241), SlaStatus::Breached);
    }

    #[test]
    fn test_future_detection_with_huge_target_does_not_overflow() {
        let mut incident = sample_incident(IncidentPriority::Low, Some(i64::MAX));
        incident.detected_at = t0() + Duration::days(1);
        assert_eq!(compute_sla_status(&incident, t0()), SlaStatus::OnTrack);
    }

    #[test]
    fn test_partial_minutes_are_floored() {
        let incident = sample_incident(IncidentPriority::Critical, Some(240));
        let now = t0() + Duration::minutes(239) + Duration::seconds(59);
        assert_eq!(elapsed_minutes(&incident, now), 239);
        assert_eq!(compute_sla_status(&incident, now), SlaStatus::Critical);
    }

    #[test]
    fn test_breach_flag_wins() {
        let mut incident = sample_incident(IncidentPriority::Low, Some(4320));
        incident.sla_breach = true;
        assert_eq!(compute_sla_status(&incident, t0()), SlaStatus::Breached);
    }

    #[test]
    fn test_resolution_stops_the_clock() {
        let mut incident = sample_incident(IncidentPriority::Critical, Some(240));
        incident.resolved_at = Some(t0() + Duration::minutes(100));

        let later = t0() + Duration::hours(10);
        assert_eq!(elapsed_minutes(&incident, later), 100);
        assert_eq!(compute_sla_status(&incident, later), SlaStatus::OnTrack);
        assert_eq!(time_to_resolution(&incident), Some(100));
    }

    #[test]
    fn test_closed_without_resolution_uses_closed_at() {
        let mut incident = sample_incident(IncidentPriority::High, Some(480));
        incident.closed_at = Some(t0() + Duration::minutes(30));
        assert_eq!(elapsed_minutes(&incident, t0() + Duration::days(1)), 30);
        assert_eq!(time_to_resolution(&incident), None);
    }

    #[test]
    fn test_end_point_clamped_to_now() {
        let mut incident = sample_incident(IncidentPriority::High, Some(480));
        incident.resolved_at = Some(t0() + Duration::minutes(90));
        assert_eq!(elapsed_minutes(&incident, t0() + Duration::minutes(45)), 45);
    }

    #[test]
    fn test_exact_elapsed_keeps_fraction() {
        let incident = sample_incident(IncidentPriority::High, Some(480));
        let now = t0() + Duration::seconds(90);
        assert!((elapsed_minutes_exact(&incident, now) - 1.5).abs() < f64::EPSILON);
    }
}

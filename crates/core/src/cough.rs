//! Cough event classification and per-device statistics.
//!
//! Devices label each event freely; statistics fold the labels into
//! `dry`, `wet` and `unknown` (anything else) case-insensitively.

use chrono::{DateTime, Duration, NaiveTime, SubsecRound, Utc};
use serde::Serialize;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Label reported when a window holds no events.
pub const NO_COUGHS: &str = "none";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoughType {
    Dry,
    Wet,
    Unknown,
}

impl CoughType {
    /// Buckets in tie-breaking order.
    pub const ALL: [CoughType; 3] = [CoughType::Dry, CoughType::Wet, CoughType::Unknown];

    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        if label.eq_ignore_ascii_case("dry") {
            CoughType::Dry
        } else if label.eq_ignore_ascii_case("wet") {
            CoughType::Wet
        } else {
            CoughType::Unknown
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CoughType::Dry => "dry",
            CoughType::Wet => "wet",
            CoughType::Unknown => "unknown",
        }
    }
}

/// The rolling windows statistics are served for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsPeriod {
    /// The last 60 minutes.
    Hour,
    /// Since midnight UTC.
    Today,
    /// The last 7 days.
    Week,
}

impl StatsPeriod {
    /// Name reported in the `period` field.
    pub fn label(self) -> &'static str {
        match self {
            StatsPeriod::Hour => "hour",
            StatsPeriod::Today => "day",
            StatsPeriod::Week => "week",
        }
    }

    /// Inclusive `(start, end)` bounds ending at `now`.
    pub fn window(self, now: Timestamp) -> (Timestamp, Timestamp) {
        let start = match self {
            StatsPeriod::Hour => now - Duration::hours(1),
            StatsPeriod::Today => now.date_naive().and_time(NaiveTime::MIN).and_utc(),
            StatsPeriod::Week => now - Duration::days(7),
        };
        (start, now)
    }
}

/// Event count and summed confidence for one stored label.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeTally {
    pub label: String,
    pub count: i64,
    pub confidence_sum: f64,
}

/// Summary of one device's events over a window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoughStatistics {
    pub total_coughs: i64,
    pub dry_coughs: i64,
    pub wet_coughs: i64,
    pub unknown_coughs: i64,
    pub average_confidence: f64,
    /// Events divided by the whole hours in the window (at least one).
    pub coughs_per_hour: f64,
    /// Bucket with the most events, earliest of [`CoughType::ALL`] on ties.
    pub most_common_type: String,
    pub period: String,
}

impl CoughStatistics {
    pub fn from_tallies(
        tallies: &[TypeTally],
        start: Timestamp,
        end: Timestamp,
        period: StatsPeriod,
    ) -> Self {
        let mut counts = [0_i64; 3];
        let mut confidence_sum = 0.0;
        for tally in tallies {
            let bucket = CoughType::from_label(&tally.label);
            counts[bucket as usize] += tally.count;
            confidence_sum += tally.confidence_sum;
        }

        let total: i64 = counts.iter().sum();
        let average_confidence = if total > 0 {
            confidence_sum / total as f64
        } else {
            0.0
        };

        let mut most_common = NO_COUGHS;
        let mut best = 0;
        for kind in CoughType::ALL {
            if counts[kind as usize] > best {
                best = counts[kind as usize];
                most_common = kind.name();
            }
        }

        let hours = (end - start).num_hours().max(1);

        Self {
            total_coughs: total,
            dry_coughs: counts[CoughType::Dry as usize],
            wet_coughs: counts[CoughType::Wet as usize],
            unknown_coughs: counts[CoughType::Unknown as usize],
            average_confidence,
            coughs_per_hour: total as f64 / hours as f64,
            most_common_type: most_common.to_string(),
            period: period.label().to_string(),
        }
    }
}

/// Convert a device-supplied Unix timestamp in milliseconds.
pub fn timestamp_from_millis(millis: i64) -> Result<Timestamp, CoreError> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| CoreError::Validation(format!("timestamp {millis} is out of range")))
}

/// Current time at the millisecond precision devices report.
pub fn now_millis() -> Timestamp {
    Utc::now().trunc_subsecs(3)
}

/// Ensure the event carries a label.
pub fn require_cough_type(cough_type: &str) -> Result<&str, CoreError> {
    let trimmed = cough_type.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("coughType is required".into()));
    }
    Ok(trimmed)
}

/// Model confidence must be a probability.
pub fn validate_confidence(confidence: f64) -> Result<(), CoreError> {
    if !(0.0..=1.0).contains(&confidence) {
        return Err(CoreError::Validation(
            "confidence must be between 0 and 1".into(),
        ));
    }
    Ok(())
}

//! Dashboard statistics derived from a trailing window of records
//!
//! Global invariants enforced:
//! - Statistics are strictly derived (never stored)
//! - An empty window yields the documented defaults, never a division by zero
//! - Output order follows record order (alerts) or calendar order (trend)

use crate::clock::Clock;
use crate::record::{field_contains, IncidentRecord};
use crate::risk::{
    assign_level, ratio_or, BucketThresholds, RoadConditions, WeatherRisk, DEFAULT_RESPONSE_TIME,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::iter;

/// Trailing window used for dashboard statistics
pub const DEFAULT_STATS_WINDOW: usize = 100;

/// Trailing window used for risk alerts
pub const DEFAULT_ALERT_WINDOW: usize = 10;

/// Number of days covered by the incident trend
pub const DEFAULT_TREND_DAYS: usize = 7;

/// Severity above which an alert is reported as high risk
const HIGH_SEVERITY: f64 = 2.0;

const ADVERSE_WEATHER_TERMS: &[&str] = &["rain", "snow", "fog"];
const HAZARDOUS_ROAD_TERMS: &[&str] = &["wet", "icy", "construction"];

/// Summary metrics for a window of records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DerivedStatistics {
    pub response_time: f64,
    pub active_incidents: usize,
    pub weather_risk: WeatherRisk,
    pub road_conditions: RoadConditions,
}

/// Alert level of a recent incident
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertLevel {
    Medium,
    High,
}

impl AlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Medium => "Medium",
            AlertLevel::High => "High",
        }
    }
}

/// Map marker for a recent incident
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RiskAlert {
    pub id: String,
    /// (latitude, longitude)
    pub location: (f64, f64),
    pub risk_level: AlertLevel,
    pub description: String,
}

/// Incident count for one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// Summarize a window of records with default thresholds
pub fn summarize(records: &[IncidentRecord]) -> DerivedStatistics {
    summarize_with_thresholds(records, &BucketThresholds::default())
}

/// Summarize a window of records with custom thresholds
pub fn summarize_with_thresholds(
    records: &[IncidentRecord],
    thresholds: &BucketThresholds,
) -> DerivedStatistics {
    let weather_pct = share_matching(records, |r| {
        ADVERSE_WEATHER_TERMS
            .iter()
            .any(|term| field_contains(r.weather_condition.as_deref(), term))
    });
    let road_pct = share_matching(records, |r| {
        HAZARDOUS_ROAD_TERMS
            .iter()
            .any(|term| field_contains(r.road_condition.as_deref(), term))
    });

    DerivedStatistics {
        response_time: average_response_time(records),
        active_incidents: records.len(),
        weather_risk: WeatherRisk::from_level(assign_level(weather_pct, thresholds)),
        road_conditions: RoadConditions::from_level(assign_level(road_pct, thresholds)),
    }
}

/// Mean of the response times that are present, or the default
pub fn average_response_time(records: &[IncidentRecord]) -> f64 {
    let (sum, n) = records
        .iter()
        .filter_map(|r| r.response_time)
        .fold((0.0, 0usize), |(sum, n), t| (sum + t, n + 1));
    if n == 0 {
        DEFAULT_RESPONSE_TIME
    } else {
        sum / n as f64
    }
}

fn share_matching<F>(records: &[IncidentRecord], predicate: F) -> f64
where
    F: Fn(&IncidentRecord) -> bool,
{
    let matched = records.iter().filter(|r| predicate(r)).count();
    ratio_or(matched, records.len(), 0.0)
}

/// Alerts for the trailing `window` records
pub fn recent_alerts(records: &[IncidentRecord], window: usize) -> Vec<RiskAlert> {
    let start = records.len().saturating_sub(window);
    records[start..]
        .iter()
        .enumerate()
        .map(|(index, record)| RiskAlert {
            id: index.to_string(),
            location: (record.display_latitude(), record.display_longitude()),
            risk_level: if record.severity.is_some_and(|s| s > HIGH_SEVERITY) {
                AlertLevel::High
            } else {
                AlertLevel::Medium
            },
            description: format!(
                "{} - {}",
                record
                    .weather_condition
                    .as_deref()
                    .unwrap_or("Unknown conditions"),
                record
                    .road_condition
                    .as_deref()
                    .unwrap_or("Road condition not specified")
            ),
        })
        .collect()
}

/// Incident counts for the last `days` calendar days, today first
///
/// Stops early if the calendar runs out before `days` entries.
pub fn daily_trend<C: Clock + ?Sized>(
    records: &[IncidentRecord],
    clock: &C,
    days: usize,
) -> Vec<DailyCount> {
    let mut per_day: HashMap<NaiveDate, usize> = HashMap::new();
    for date in records.iter().filter_map(|r| r.date) {
        *per_day.entry(date.date()).or_insert(0) += 1;
    }

    iter::successors(Some(clock.now().date()), |d| d.pred_opt())
        .take(days)
        .map(|date| DailyCount {
            date,
            count: per_day.get(&date).copied().unwrap_or(0),
        })
        .collect()
}

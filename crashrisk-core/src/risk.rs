//! Scoring policy: weights, thresholds and categorical labels
//!
//! Global invariants enforced:
//! - Every score handed out is clamped to [0, 100]
//! - Bucket thresholds are strict (`> high`, `> moderate`)
//! - Ratios over an empty set never divide by zero

use serde::{Deserialize, Serialize};

/// Lower and upper bound of every risk or probability value
pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;

/// Neutral survival sub-probability used when no record matches
pub const NEUTRAL_PROBABILITY: f64 = 50.0;

/// Speed above which penalties, warnings and "above safe limits" apply (km/h)
pub const SAFE_SPEED_LIMIT: f64 = 80.0;

/// Speed at which the speed factor saturates at 100 (km/h)
pub const SPEED_RISK_CEILING: f64 = 130.0;

/// Half-width of the speed window used by the survival estimator (km/h)
pub const SURVIVAL_SPEED_WINDOW: f64 = 15.0;

/// Half-width of the speed window used by the speed factor insight (km/h)
pub const SIMILAR_SPEED_WINDOW: f64 = 10.0;

/// Survival penalty multipliers
pub const HIGH_SPEED_PENALTY: f64 = 0.8;
pub const LOW_VISIBILITY_PENALTY: f64 = 0.9;
pub const HAZARDOUS_ROAD_PENALTY: f64 = 0.85;

/// Amplifier applied to the weather factor when the current weather is adverse
pub const ADVERSE_WEATHER_AMPLIFIER: f64 = 1.5;

/// Road risk above which the road factor asks for increased caution
pub const ROAD_CAUTION_THRESHOLD: f64 = 50.0;

/// Fixed seasonal sub-scores carried by the speed and road factors
pub const SPEED_SEASONAL_IMPACT: f64 = 65.0;
pub const ROAD_SEASONAL_IMPACT: f64 = 45.0;

/// Trailing window counted as recent incidents by the weather factor
pub const RECENT_INCIDENT_WINDOW: usize = 10;

/// Time-of-day risk levels
pub const PEAK_HOUR_RISK: f64 = 75.0;
pub const MODERATE_HOUR_RISK: f64 = 50.0;
pub const OFF_PEAK_RISK: f64 = 25.0;
pub const PEAK_HOURS: &[u32] = &[8, 9, 17, 18];
pub const MODERATE_HOURS: &[u32] = &[7, 10, 11, 15, 16, 19];

/// Average response time reported when no record carries one (minutes)
pub const DEFAULT_RESPONSE_TIME: f64 = 8.5;

/// Clamp a score into [0, 100]
///
/// NaN collapses to 0 so that a malformed input can never escape the range.
pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        SCORE_MIN
    } else {
        value.clamp(SCORE_MIN, SCORE_MAX)
    }
}

/// Percentage of `matched` over `total`, or `fallback` when `total` is zero
pub fn ratio_or(matched: usize, total: usize, fallback: f64) -> f64 {
    if total == 0 {
        fallback
    } else {
        matched as f64 / total as f64 * 100.0
    }
}

/// Weights for combining the four survival sub-probabilities
///
/// The weighted sum is not re-normalized when a sub-probability falls back
/// to [`NEUTRAL_PROBABILITY`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurvivalWeights {
    pub vehicle: f64,
    pub speed: f64,
    pub weather: f64,
    pub road: f64,
}

impl Default for SurvivalWeights {
    fn default() -> Self {
        SurvivalWeights {
            vehicle: 0.3,
            speed: 0.3,
            weather: 0.2,
            road: 0.2,
        }
    }
}

/// Thresholds shared by every three-way bucket (`> high`, `> moderate`, else low)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BucketThresholds {
    pub moderate: f64,
    pub high: f64,
}

impl Default for BucketThresholds {
    fn default() -> Self {
        BucketThresholds {
            moderate: 40.0,
            high: 70.0,
        }
    }
}

/// Three-way bucket level before it is given a domain label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    Moderate,
    High,
}

/// Assign a bucket level with custom thresholds
pub fn assign_level(score: f64, thresholds: &BucketThresholds) -> Level {
    if score > thresholds.high {
        Level::High
    } else if score > thresholds.moderate {
        Level::Moderate
    } else {
        Level::Low
    }
}

/// Traffic density derived from the time-of-day risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrafficDensity {
    Low,
    Moderate,
    High,
}

impl TrafficDensity {
    pub fn from_level(level: Level) -> Self {
        match level {
            Level::Low => TrafficDensity::Low,
            Level::Moderate => TrafficDensity::Moderate,
            Level::High => TrafficDensity::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrafficDensity::Low => "Low",
            TrafficDensity::Moderate => "Moderate",
            TrafficDensity::High => "High",
        }
    }
}

/// Weather trend derived from the weather factor risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherTrend {
    Good,
    Moderate,
    Severe,
}

impl WeatherTrend {
    pub fn from_level(level: Level) -> Self {
        match level {
            Level::Low => WeatherTrend::Good,
            Level::Moderate => WeatherTrend::Moderate,
            Level::High => WeatherTrend::Severe,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherTrend::Good => "Good",
            WeatherTrend::Moderate => "Moderate",
            WeatherTrend::Severe => "Severe",
        }
    }
}

/// Weather risk label for dashboard statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherRisk {
    Low,
    Moderate,
    High,
}

impl WeatherRisk {
    pub fn from_level(level: Level) -> Self {
        match level {
            Level::Low => WeatherRisk::Low,
            Level::Moderate => WeatherRisk::Moderate,
            Level::High => WeatherRisk::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherRisk::Low => "Low",
            WeatherRisk::Moderate => "Moderate",
            WeatherRisk::High => "High",
        }
    }
}

/// Road condition label for dashboard statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoadConditions {
    Good,
    Fair,
    Poor,
}

impl RoadConditions {
    pub fn from_level(level: Level) -> Self {
        match level {
            Level::Low => RoadConditions::Good,
            Level::Moderate => RoadConditions::Fair,
            Level::High => RoadConditions::Poor,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoadConditions::Good => "Good",
            RoadConditions::Fair => "Fair",
            RoadConditions::Poor => "Poor",
        }
    }
}

/// Part of the day for the analysis summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    /// Bucket an hour of day: `< 12` morning, `< 18` afternoon, else evening
    pub fn from_hour(hour: u32) -> Self {
        if hour < 12 {
            TimeOfDay::Morning
        } else if hour < 18 {
            TimeOfDay::Afternoon
        } else {
            TimeOfDay::Evening
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "Morning",
            TimeOfDay::Afternoon => "Afternoon",
            TimeOfDay::Evening => "Evening",
        }
    }
}

/// Risk attributed to the hour of day (peak 75, moderate 50, else 25)
pub fn time_of_day_risk(hour: u32) -> f64 {
    if PEAK_HOURS.contains(&hour) {
        PEAK_HOUR_RISK
    } else if MODERATE_HOURS.contains(&hour) {
        MODERATE_HOUR_RISK
    } else {
        OFF_PEAK_RISK
    }
}

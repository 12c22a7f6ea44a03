//! Risk analysis across weather, speed and road-condition factors
//!
//! Global invariants enforced:
//! - Pure given (scenario, record snapshot, instant)
//! - Exactly three factors, always in the order weather, speed, road
//! - Every risk value is clamped to [0, 100]
//! - Frequency ties resolve to the first-encountered value

use crate::clock::Clock;
use crate::record::{field_equals, IncidentRecord};
use crate::risk::{
    assign_level, clamp_score, ratio_or, time_of_day_risk, BucketThresholds, TimeOfDay,
    TrafficDensity, WeatherTrend, ADVERSE_WEATHER_AMPLIFIER, RECENT_INCIDENT_WINDOW,
    ROAD_CAUTION_THRESHOLD, ROAD_SEASONAL_IMPACT, SAFE_SPEED_LIMIT, SIMILAR_SPEED_WINDOW,
    SPEED_RISK_CEILING, SPEED_SEASONAL_IMPACT,
};
use crate::scenario::Scenario;
use crate::store::RecordStore;
use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const WEATHER_FACTOR: &str = "Weather Conditions";
pub const SPEED_FACTOR: &str = "Speed Analysis";
pub const ROAD_FACTOR: &str = "Road Conditions";

/// Historical weather conditions counted as severe
const SEVERE_WEATHER: &[&str] = &["Snow", "Heavy Rain", "Fog"];

/// Current weather conditions that amplify the weather factor
const ADVERSE_WEATHER: &[&str] = &["Snow", "Fog", "Rain"];

/// Label reported when no record carries a weather condition
const UNKNOWN_CONDITION: &str = "Unknown";

/// Supporting sub-scores for one factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ContextualData {
    pub historical_trend: f64,
    pub recent_incidents: usize,
    pub seasonal_impact: f64,
}

/// One scored dimension of a risk analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RiskFactor {
    pub factor: String,
    pub risk: f64,
    pub description: String,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub contextual_data: ContextualData,
}

/// Categorical context of an analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ContextFactors {
    pub time_of_day: TimeOfDay,
    pub traffic_density: TrafficDensity,
    pub weather_trend: WeatherTrend,
}

/// Aggregate view produced alongside the factors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AnalysisSummary {
    pub timestamp: NaiveDateTime,
    pub location: String,
    pub overall_risk: f64,
    pub context_factors: ContextFactors,
}

/// Result of one analysis call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RiskAnalysis {
    pub risk_factors: [RiskFactor; 3],
    pub summary: AnalysisSummary,
}

impl RiskAnalysis {
    pub fn weather(&self) -> &RiskFactor {
        &self.risk_factors[0]
    }

    pub fn speed(&self) -> &RiskFactor {
        &self.risk_factors[1]
    }

    pub fn road(&self) -> &RiskFactor {
        &self.risk_factors[2]
    }
}

/// Risk analysis bound to a record snapshot and a clock
pub struct RiskAnalysisEngine<'a, C: Clock> {
    store: &'a RecordStore,
    clock: C,
    thresholds: BucketThresholds,
}

impl<'a, C: Clock> RiskAnalysisEngine<'a, C> {
    pub fn new(store: &'a RecordStore, clock: C) -> Self {
        RiskAnalysisEngine {
            store,
            clock,
            thresholds: BucketThresholds::default(),
        }
    }

    /// Use custom bucket thresholds for the summary labels
    pub fn with_thresholds(mut self, thresholds: BucketThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Point the engine at a different record snapshot
    pub fn set_historical_data(&mut self, store: &'a RecordStore) {
        self.store = store;
    }

    pub fn store(&self) -> &RecordStore {
        self.store
    }

    /// Analyze a scenario against the current snapshot at the clock's instant
    pub fn analyze(&self, scenario: &Scenario) -> RiskAnalysis {
        analyze_at(
            scenario,
            self.store.records(),
            self.clock.now(),
            &self.thresholds,
        )
    }
}

/// Weather risk and its insights
struct WeatherPattern {
    risk: f64,
    insights: Vec<String>,
}

/// Analyze a scenario at a fixed instant
pub fn analyze_at(
    scenario: &Scenario,
    records: &[IncidentRecord],
    now: NaiveDateTime,
    thresholds: &BucketThresholds,
) -> RiskAnalysis {
    let hour = now.hour();
    let time_risk = time_of_day_risk(hour);

    let weather = weather_factor(scenario, records, time_risk);
    let speed = speed_factor(scenario, records);
    let road = road_factor(scenario, records);

    let overall_risk = clamp_score((weather.risk + speed.risk + road.risk) / 3.0);

    let summary = AnalysisSummary {
        timestamp: now,
        location: scenario.location_label().to_string(),
        overall_risk,
        context_factors: ContextFactors {
            time_of_day: TimeOfDay::from_hour(hour),
            traffic_density: TrafficDensity::from_level(assign_level(time_risk, thresholds)),
            weather_trend: WeatherTrend::from_level(assign_level(weather.risk, thresholds)),
        },
    };

    RiskAnalysis {
        risk_factors: [weather, speed, road],
        summary,
    }
}

fn weather_factor(scenario: &Scenario, records: &[IncidentRecord], time_risk: f64) -> RiskFactor {
    let pattern = analyze_weather_pattern(records, &scenario.weather_condition);

    RiskFactor {
        factor: WEATHER_FACTOR.to_string(),
        risk: pattern.risk,
        description: format!(
            "Analysis based on current weather ({}) and historical patterns",
            scenario.weather_condition
        ),
        insights: pattern.insights,
        recommendations: contextual_recommendations(scenario),
        contextual_data: ContextualData {
            historical_trend: pattern.risk,
            recent_incidents: records.len().min(RECENT_INCIDENT_WINDOW),
            seasonal_impact: time_risk,
        },
    }
}

fn analyze_weather_pattern(records: &[IncidentRecord], current_weather: &str) -> WeatherPattern {
    let counts = condition_frequencies(records.iter().filter_map(|r| r.weather_condition.as_deref()));

    let severe = records
        .iter()
        .filter(|r| {
            r.weather_condition
                .as_deref()
                .is_some_and(|w| SEVERE_WEATHER.contains(&w))
        })
        .count();
    let severe_pct = ratio_or(severe, records.len(), 0.0);

    let mut risk = severe_pct;
    if ADVERSE_WEATHER.contains(&current_weather) {
        risk *= ADVERSE_WEATHER_AMPLIFIER;
    }
    let risk = clamp_score(risk);

    let modal = most_common(&counts).unwrap_or(UNKNOWN_CONDITION);

    WeatherPattern {
        risk,
        insights: vec![
            format!("{} of accidents occurred in severe weather", format_percent(severe_pct)),
            format!("Current weather condition ({}) affects risk level", current_weather),
            format!("Most common condition: {}", modal),
        ],
    }
}

/// Count occurrences of each value, keeping first-encountered order
fn condition_frequencies<'r, I>(values: I) -> Vec<(&'r str, usize)>
where
    I: Iterator<Item = &'r str>,
{
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for value in values {
        match slots.get(value) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                slots.insert(value, counts.len());
                counts.push((value, 1));
            }
        }
    }
    counts
}

/// Percentage with one decimal, exact ties rounded away from zero
fn format_percent(value: f64) -> String {
    format!("{:.1}%", (value * 10.0).round() / 10.0)
}

/// Most frequent value; the earliest one wins a tie
fn most_common<'r>(counts: &[(&'r str, usize)]) -> Option<&'r str> {
    let mut best: Option<(&str, usize)> = None;
    for &(value, n) in counts {
        match best {
            Some((_, best_n)) if n <= best_n => {}
            _ => best = Some((value, n)),
        }
    }
    best.map(|(value, _)| value)
}

/// Advice triggered by the scenario; every matching rule contributes
fn contextual_recommendations(scenario: &Scenario) -> Vec<String> {
    let mut recommendations = Vec::new();

    let weather = scenario.weather_condition.as_str();
    if weather == "Snow" || weather == "Rain" {
        recommendations.push("Reduce speed by 30% in current weather conditions".to_string());
        recommendations.push("Maintain greater following distance".to_string());
    }

    let road = scenario.road_condition.as_str();
    if road == "Wet" || road == "Icy" {
        recommendations.push("Use appropriate tires for conditions".to_string());
        recommendations.push("Avoid sudden braking or acceleration".to_string());
    }

    if scenario.speed > SAFE_SPEED_LIMIT {
        recommendations.push("Current speed exceeds safe limits for conditions".to_string());
        recommendations.push("Consider alternative routes with lower speed limits".to_string());
    }

    recommendations
}

fn speed_factor(scenario: &Scenario, records: &[IncidentRecord]) -> RiskFactor {
    let risk = clamp_score(scenario.speed / SPEED_RISK_CEILING * 100.0);
    let similar = records
        .iter()
        .filter(|r| {
            r.speed
                .is_some_and(|s| (s - scenario.speed).abs() <= SIMILAR_SPEED_WINDOW)
        })
        .count();
    let too_fast = scenario.speed > SAFE_SPEED_LIMIT;

    RiskFactor {
        factor: SPEED_FACTOR.to_string(),
        risk,
        description: format!("Current speed ({} km/h) risk assessment", scenario.speed),
        insights: vec![
            format!("{} similar speed accidents in database", similar),
            format!(
                "Current speed is {} safe limits",
                if too_fast { "above" } else { "within" }
            ),
        ],
        recommendations: vec![
            if too_fast {
                "Reduce speed immediately"
            } else {
                "Maintain current speed"
            }
            .to_string(),
            "Adjust speed based on current conditions".to_string(),
            "Use cruise control in stable conditions".to_string(),
        ],
        contextual_data: ContextualData {
            historical_trend: risk,
            recent_incidents: similar,
            seasonal_impact: SPEED_SEASONAL_IMPACT,
        },
    }
}

fn road_factor(scenario: &Scenario, records: &[IncidentRecord]) -> RiskFactor {
    let matching = records
        .iter()
        .filter(|r| field_equals(r.road_condition.as_deref(), &scenario.road_condition))
        .count();
    let risk = clamp_score(ratio_or(matching, records.len(), 0.0));

    RiskFactor {
        factor: ROAD_FACTOR.to_string(),
        risk,
        description: format!(
            "Analysis of current road condition ({})",
            scenario.road_condition
        ),
        insights: vec![
            format!("{} of accidents occurred in similar conditions", format_percent(risk)),
            format!(
                "Current conditions require {} caution",
                if risk > ROAD_CAUTION_THRESHOLD {
                    "increased"
                } else {
                    "normal"
                }
            ),
        ],
        recommendations: vec![
            if scenario.road_condition == "Icy" {
                "Use winter tires"
            } else {
                "Maintain regular tire pressure"
            }
            .to_string(),
            "Increase following distance in current conditions".to_string(),
            "Watch for changes in road surface".to_string(),
        ],
        contextual_data: ContextualData {
            historical_trend: risk,
            recent_incidents: matching,
            seasonal_impact: ROAD_SEASONAL_IMPACT,
        },
    }
}

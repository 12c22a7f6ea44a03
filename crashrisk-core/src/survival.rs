//! Survival probability estimation by weighted similarity matching
//!
//! Four sub-probabilities (vehicle, speed, weather, road) are the survival
//! rate over the records matching the scenario on that one dimension, or
//! [`NEUTRAL_PROBABILITY`] when nothing matches. They are combined with fixed
//! weights and then penalized for high speed, low visibility and hazardous
//! roads.
//!
//! The weighted sum is not re-normalized when a sub-probability falls back
//! to the neutral value.

use crate::record::{field_contains, field_equals, IncidentRecord};
use crate::risk::{
    clamp_score, ratio_or, SurvivalWeights, HAZARDOUS_ROAD_PENALTY, HIGH_SPEED_PENALTY,
    LOW_VISIBILITY_PENALTY, NEUTRAL_PROBABILITY, SAFE_SPEED_LIMIT, SURVIVAL_SPEED_WINDOW,
};
use crate::scenario::Scenario;
use serde::{Deserialize, Serialize};

/// Per-dimension survival rates before weighting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SurvivalBreakdown {
    pub vehicle: f64,
    pub speed: f64,
    pub weather: f64,
    pub road: f64,
    /// Product of every penalty multiplier that applied
    pub penalty: f64,
}

/// Estimate survival probability (0-100) with default weights
pub fn estimate_survival(scenario: &Scenario, records: &[IncidentRecord]) -> f64 {
    estimate_survival_with_weights(scenario, records, &SurvivalWeights::default()).0
}

/// Estimate survival probability with custom weights
///
/// Returns the clamped probability and the breakdown it was built from. With
/// no records the probability is exactly [`NEUTRAL_PROBABILITY`] and every
/// sub-probability reports the neutral value.
pub fn estimate_survival_with_weights(
    scenario: &Scenario,
    records: &[IncidentRecord],
    weights: &SurvivalWeights,
) -> (f64, SurvivalBreakdown) {
    if records.is_empty() {
        return (
            NEUTRAL_PROBABILITY,
            SurvivalBreakdown {
                vehicle: NEUTRAL_PROBABILITY,
                speed: NEUTRAL_PROBABILITY,
                weather: NEUTRAL_PROBABILITY,
                road: NEUTRAL_PROBABILITY,
                penalty: 1.0,
            },
        );
    }

    let vehicle = survival_rate(records, |r| {
        field_equals(r.vehicle_type.as_deref(), &scenario.vehicle_type)
    });
    let speed = survival_rate(records, |r| {
        r.speed
            .is_some_and(|s| (s - scenario.speed).abs() <= SURVIVAL_SPEED_WINDOW)
    });
    let weather = survival_rate(records, |r| {
        field_contains(r.weather_condition.as_deref(), &scenario.weather_condition)
    });
    let road = survival_rate(records, |r| {
        field_contains(r.road_condition.as_deref(), &scenario.road_condition)
    });

    let weighted = vehicle * weights.vehicle
        + speed * weights.speed
        + weather * weights.weather
        + road * weights.road;

    let penalty = penalty_multiplier(scenario);

    let breakdown = SurvivalBreakdown {
        vehicle,
        speed,
        weather,
        road,
        penalty,
    };

    (clamp_score(weighted * penalty), breakdown)
}

/// Product of the penalties that apply to a scenario
///
/// Each penalty is independent; all three may apply at once.
pub fn penalty_multiplier(scenario: &Scenario) -> f64 {
    let mut multiplier = 1.0;

    if scenario.speed > SAFE_SPEED_LIMIT {
        multiplier *= HIGH_SPEED_PENALTY;
    }

    let weather = scenario.weather_condition.to_lowercase();
    if weather == "snow" || weather == "fog" {
        multiplier *= LOW_VISIBILITY_PENALTY;
    }

    let road = scenario.road_condition.to_lowercase();
    if road == "icy" || road == "under construction" {
        multiplier *= HAZARDOUS_ROAD_PENALTY;
    }

    multiplier
}

/// Survival percentage among records matching `predicate`
fn survival_rate<F>(records: &[IncidentRecord], predicate: F) -> f64
where
    F: Fn(&IncidentRecord) -> bool,
{
    let (matched, survived) = records
        .iter()
        .filter(|r| predicate(r))
        .fold((0usize, 0usize), |(m, s), r| (m + 1, s + usize::from(r.survived)));
    ratio_or(survived, matched, NEUTRAL_PROBABILITY)
}

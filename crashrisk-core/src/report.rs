//! Reporting and output generation
//!
//! Global invariants enforced:
//! - Rendering never changes a value, only its presentation
//! - Byte-for-byte identical output for identical input

use crate::analysis::{RiskAnalysis, RiskFactor};
use crate::stats::{DailyCount, DerivedStatistics, RiskAlert};
use crate::Prediction;
use serde::Serialize;

/// Render any engine output as pretty JSON
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
}

/// Render a prediction as text output
pub fn render_prediction_text(prediction: &Prediction) -> String {
    let mut output = String::new();
    let scenario = &prediction.scenario;

    output.push_str(&format!(
        "Scenario: {} at {} km/h, {} weather, {} road\n",
        scenario.vehicle_type, scenario.speed, scenario.weather_condition, scenario.road_condition
    ));
    output.push_str(&format!(
        "Survival probability: {:.1}%\n",
        prediction.survival_probability
    ));
    let b = &prediction.survival_breakdown;
    output.push_str(&format!(
        "  vehicle {:.1}  speed {:.1}  weather {:.1}  road {:.1}  penalty x{:.3}\n\n",
        b.vehicle, b.speed, b.weather, b.road, b.penalty
    ));
    output.push_str(&render_analysis_text(&prediction.analysis));
    output
}

/// Render a risk analysis as text output
pub fn render_analysis_text(analysis: &RiskAnalysis) -> String {
    let mut output = String::new();
    let summary = &analysis.summary;
    let context = &summary.context_factors;

    output.push_str(&format!(
        "Risk analysis for {} at {}\n",
        summary.location,
        summary.timestamp.format("%Y-%m-%d %H:%M:%S")
    ));
    output.push_str(&format!(
        "Overall risk: {:.1}  (time of day: {}, traffic: {}, weather trend: {})\n",
        summary.overall_risk,
        context.time_of_day.as_str(),
        context.traffic_density.as_str(),
        context.weather_trend.as_str()
    ));

    // Factor table
    output.push_str(&format!("\n{:<20} {:<8} {}\n", "FACTOR", "RISK", "DESCRIPTION"));
    for factor in &analysis.risk_factors {
        output.push_str(&format!(
            "{:<20} {:<8.1} {}\n",
            factor.factor, factor.risk, factor.description
        ));
    }

    for factor in &analysis.risk_factors {
        output.push('\n');
        output.push_str(&render_factor_details(factor));
    }

    output
}

fn render_factor_details(factor: &RiskFactor) -> String {
    let mut output = format!("{}\n", factor.factor);
    for insight in &factor.insights {
        output.push_str(&format!("  - {}\n", insight));
    }
    for recommendation in &factor.recommendations {
        output.push_str(&format!("  > {}\n", recommendation));
    }
    let ctx = &factor.contextual_data;
    output.push_str(&format!(
        "  trend {:.1}  recent {}  seasonal {:.1}\n",
        ctx.historical_trend, ctx.recent_incidents, ctx.seasonal_impact
    ));
    output
}

/// Render dashboard statistics as text output
pub fn render_statistics_text(stats: &DerivedStatistics) -> String {
    format!(
        "Average response time: {:.1} min\nActive incidents: {}\nWeather risk: {}\nRoad conditions: {}\n",
        stats.response_time,
        stats.active_incidents,
        stats.weather_risk.as_str(),
        stats.road_conditions.as_str()
    )
}

/// Render risk alerts as text output
pub fn render_alerts_text(alerts: &[RiskAlert]) -> String {
    let mut output = format!(
        "{:<4} {:<8} {:<22} {}\n",
        "ID", "LEVEL", "LOCATION", "DESCRIPTION"
    );
    for alert in alerts {
        let location = format!("{:.4},{:.4}", alert.location.0, alert.location.1);
        output.push_str(&format!(
            "{:<4} {:<8} {:<22} {}\n",
            alert.id,
            alert.risk_level.as_str(),
            location,
            alert.description
        ));
    }
    output
}

/// Render a daily incident trend as text output
pub fn render_trend_text(trend: &[DailyCount]) -> String {
    let mut output = format!("{:<12} {}\n", "DATE", "INCIDENTS");
    for day in trend {
        let date = day.date.format("%Y-%m-%d").to_string();
        output.push_str(&format!("{:<12} {}\n", date, day.count));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::{RoadConditions, WeatherRisk};
    use chrono::NaiveDate;

    #[test]
    fn test_render_statistics_text() {
        let stats = DerivedStatistics {
            response_time: 8.5,
            active_incidents: 0,
            weather_risk: WeatherRisk::Low,
            road_conditions: RoadConditions::Good,
        };
        let text = render_statistics_text(&stats);
        assert!(text.contains("Average response time: 8.5 min"));
        assert!(text.contains("Weather risk: Low"));
        assert!(text.contains("Road conditions: Good"));
    }

    #[test]
    fn test_render_json_labels() {
        let stats = DerivedStatistics {
            response_time: 7.25,
            active_incidents: 3,
            weather_risk: WeatherRisk::Moderate,
            road_conditions: RoadConditions::Poor,
        };
        let json: serde_json::Value = serde_json::from_str(&render_json(&stats)).unwrap();
        assert_eq!(json["weather_risk"], "Moderate");
        assert_eq!(json["road_conditions"], "Poor");
        assert_eq!(json["active_incidents"], 3);
    }

    #[test]
    fn test_render_trend_text() {
        let trend = vec![DailyCount {
            date: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
            count: 4,
        }];
        let text = render_trend_text(&trend);
        assert!(text.lines().nth(1).unwrap().starts_with("2024-02-29"));
        assert!(text.trim_end().ends_with('4'));
    }
}

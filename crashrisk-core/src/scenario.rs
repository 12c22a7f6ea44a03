//! Scenario input for survival estimation and risk analysis

use serde::{Deserialize, Serialize};

/// Location label used when a scenario does not name one
pub const DEFAULT_LOCATION: &str = "Current Location";

/// A hypothetical driving situation to score
///
/// Speed is expected in 0-200 km/h; the engine does not reject other values
/// but its formulas are calibrated for that range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Scenario {
    #[serde(alias = "vehicleType")]
    pub vehicle_type: String,
    pub speed: f64,
    #[serde(alias = "weatherCondition")]
    pub weather_condition: String,
    #[serde(alias = "roadCondition")]
    pub road_condition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Scenario {
    pub fn new(
        vehicle_type: impl Into<String>,
        speed: f64,
        weather_condition: impl Into<String>,
        road_condition: impl Into<String>,
    ) -> Self {
        Scenario {
            vehicle_type: vehicle_type.into(),
            speed,
            weather_condition: weather_condition.into(),
            road_condition: road_condition.into(),
            location: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Location label, or [`DEFAULT_LOCATION`]
    pub fn location_label(&self) -> &str {
        self.location
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LOCATION)
    }
}

impl Default for Scenario {
    /// Scenario analysed when no prediction has been submitted yet
    fn default() -> Self {
        Scenario::new("Car", 60.0, "Clear", "Dry")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_camel_case_input() {
        let json = r#"{"vehicleType": "Car", "speed": 72, "weatherCondition": "Fog", "roadCondition": "Wet"}"#;
        let scenario: Scenario = serde_json::from_str(json).unwrap();
        assert_eq!(scenario.vehicle_type, "Car");
        assert_eq!(scenario.speed, 72.0);
        assert_eq!(scenario.location_label(), DEFAULT_LOCATION);
    }

    #[test]
    fn test_location_label() {
        let scenario = Scenario::default().with_location("Main St");
        assert_eq!(scenario.location_label(), "Main St");
        let blank = Scenario::default().with_location("");
        assert_eq!(blank.location_label(), DEFAULT_LOCATION);
    }
}

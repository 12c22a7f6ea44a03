//! Historical incident records and row parsing
//!
//! Global invariants enforced:
//! - Missing or malformed numeric cells become `None`, never zero
//! - A row that carries none of the identifying columns is rejected
//! - Parsing never panics

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One raw ingestion row: column name to cell text
pub type RawRow = BTreeMap<String, String>;

/// Default coordinates used for display when a record has no location
pub const DEFAULT_LATITUDE: f64 = 40.7128;
pub const DEFAULT_LONGITUDE: f64 = -74.0060;

/// Column names understood by the parser
pub mod columns {
    pub const VEHICLE_TYPE: &str = "vehicle_type";
    pub const SPEED: &str = "speed";
    pub const WEATHER_CONDITION: &str = "weather_condition";
    pub const ROAD_CONDITION: &str = "road_condition";
    pub const SURVIVED: &str = "survived";
    pub const SEVERITY: &str = "severity";
    pub const RESPONSE_TIME: &str = "response_time";
    pub const LATITUDE: &str = "latitude";
    pub const LONGITUDE: &str = "longitude";
    pub const DATE: &str = "date";
}

/// One historical incident
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IncidentRecord {
    pub vehicle_type: Option<String>,
    pub speed: Option<f64>,
    pub weather_condition: Option<String>,
    pub road_condition: Option<String>,
    pub survived: bool,
    pub severity: Option<f64>,
    pub response_time: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub date: Option<NaiveDateTime>,
}

impl IncidentRecord {
    /// Parse one raw row, returning `None` if the row is unusable
    pub fn from_row(row: &RawRow) -> Option<Self> {
        let record = IncidentRecord {
            vehicle_type: text_cell(row, columns::VEHICLE_TYPE),
            speed: number_cell(row, columns::SPEED),
            weather_condition: text_cell(row, columns::WEATHER_CONDITION),
            road_condition: text_cell(row, columns::ROAD_CONDITION),
            survived: text_cell(row, columns::SURVIVED).as_deref() == Some("1"),
            severity: number_cell(row, columns::SEVERITY),
            response_time: number_cell(row, columns::RESPONSE_TIME),
            latitude: number_cell(row, columns::LATITUDE),
            longitude: number_cell(row, columns::LONGITUDE),
            date: text_cell(row, columns::DATE).and_then(|s| parse_date(&s)),
        };

        if record.vehicle_type.is_none()
            && record.speed.is_none()
            && record.weather_condition.is_none()
            && record.road_condition.is_none()
        {
            return None;
        }

        Some(record)
    }

    /// Latitude for display, falling back to [`DEFAULT_LATITUDE`]
    pub fn display_latitude(&self) -> f64 {
        self.latitude.unwrap_or(DEFAULT_LATITUDE)
    }

    /// Longitude for display, falling back to [`DEFAULT_LONGITUDE`]
    pub fn display_longitude(&self) -> f64 {
        self.longitude.unwrap_or(DEFAULT_LONGITUDE)
    }
}

/// Case-insensitive exact comparison of an optional field
pub(crate) fn field_equals(field: Option<&str>, wanted: &str) -> bool {
    field.is_some_and(|v| v.to_lowercase() == wanted.to_lowercase())
}

/// Case-insensitive substring test of an optional field
pub(crate) fn field_contains(field: Option<&str>, needle: &str) -> bool {
    field.is_some_and(|v| v.to_lowercase().contains(&needle.to_lowercase()))
}

fn text_cell(row: &RawRow, column: &str) -> Option<String> {
    row.get(column)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn number_cell(row: &RawRow, column: &str) -> Option<f64> {
    text_cell(row, column)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Parse a date cell in any of the accepted layouts
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_complete_row() {
        let r = row(&[
            ("vehicle_type", "Car"),
            ("speed", "62"),
            ("weather_condition", "Rain"),
            ("road_condition", "Wet"),
            ("survived", "1"),
            ("severity", "3"),
            ("response_time", "7.5"),
            ("latitude", "51.5"),
            ("longitude", "-0.12"),
            ("date", "2024-03-01"),
        ]);
        let record = IncidentRecord::from_row(&r).unwrap();
        assert_eq!(record.vehicle_type.as_deref(), Some("Car"));
        assert_eq!(record.speed, Some(62.0));
        assert!(record.survived);
        assert_eq!(record.severity, Some(3.0));
        assert_eq!(record.response_time, Some(7.5));
        assert_eq!(record.display_latitude(), 51.5);
        assert_eq!(
            record.date.map(|d| d.date()),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
    }

    #[test]
    fn test_malformed_numbers_are_absent_not_zero() {
        let r = row(&[
            ("vehicle_type", "Truck"),
            ("speed", "fast"),
            ("response_time", ""),
            ("latitude", "NaN"),
        ]);
        let record = IncidentRecord::from_row(&r).unwrap();
        assert_eq!(record.speed, None);
        assert_eq!(record.response_time, None);
        assert_eq!(record.latitude, None);
        assert_eq!(record.display_latitude(), DEFAULT_LATITUDE);
        assert_eq!(record.display_longitude(), DEFAULT_LONGITUDE);
    }

    #[test]
    fn test_survived_requires_exact_flag() {
        for (flag, expected) in [("1", true), ("0", false), ("yes", false), ("", false)] {
            let r = row(&[("vehicle_type", "Car"), ("survived", flag)]);
            assert_eq!(IncidentRecord::from_row(&r).unwrap().survived, expected);
        }
    }

    #[test]
    fn test_blank_row_is_rejected() {
        let r = row(&[("vehicle_type", " "), ("speed", ""), ("survived", "1")]);
        assert!(IncidentRecord::from_row(&r).is_none());
    }

    #[test]
    fn test_parse_date_layouts() {
        assert!(parse_date("2024-01-05").is_some());
        assert!(parse_date("2024-01-05 13:45:00").is_some());
        assert!(parse_date("2024-01-05T13:45:00").is_some());
        assert!(parse_date("2024-01-05T13:45:00+02:00").is_some());
        assert!(parse_date("01/05/2024").is_some());
        assert!(parse_date("yesterday").is_none());
    }

    #[test]
    fn test_field_matching_is_case_insensitive() {
        assert!(field_equals(Some("CAR"), "car"));
        assert!(!field_equals(None, "car"));
        assert!(field_contains(Some("Heavy Rain"), "rain"));
        assert!(!field_contains(None, "rain"));
    }
}

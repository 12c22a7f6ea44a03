//! Configuration file support for crashrisk
//!
//! Loads scoring parameters from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.crashriskrc.json` in the working directory
//! 3. `crashrisk.config.json` in the working directory
//!
//! All fields are optional. CLI flags take precedence over config file values.
//! Defaults reproduce the built-in scoring policy exactly.

use crate::risk::{BucketThresholds, SurvivalWeights};
use crate::stats::{DEFAULT_ALERT_WINDOW, DEFAULT_STATS_WINDOW, DEFAULT_TREND_DAYS};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Largest accepted survival weight
const MAX_WEIGHT: f64 = 10.0;

/// Longest accepted incident trend (days)
const MAX_TREND_DAYS: usize = 3660;

/// crashrisk configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrashRiskConfig {
    /// Path to the incident dataset (CSV)
    #[serde(default)]
    pub data: Option<PathBuf>,

    /// Custom survival weights
    #[serde(default)]
    pub weights: Option<WeightConfig>,

    /// Custom category bucket thresholds
    #[serde(default)]
    pub thresholds: Option<ThresholdConfig>,

    /// Number of trailing records summarized for statistics (default: 100)
    #[serde(default)]
    pub stats_window: Option<usize>,

    /// Number of trailing records turned into alerts (default: 10)
    #[serde(default)]
    pub alert_window: Option<usize>,

    /// Number of days covered by the incident trend (default: 7)
    #[serde(default)]
    pub trend_days: Option<usize>,
}

/// Custom survival weights
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeightConfig {
    /// Weight for vehicle type matches (default: 0.3)
    pub vehicle: Option<f64>,
    /// Weight for speed matches (default: 0.3)
    pub speed: Option<f64>,
    /// Weight for weather matches (default: 0.2)
    pub weather: Option<f64>,
    /// Weight for road condition matches (default: 0.2)
    pub road: Option<f64>,
}

/// Custom category bucket thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdConfig {
    /// Score above which a category is moderate (default: 40.0)
    pub moderate: Option<f64>,
    /// Score above which a category is high (default: 70.0)
    pub high: Option<f64>,
}

/// Resolved configuration with every default filled in
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedConfig {
    pub data_path: Option<PathBuf>,
    pub weights: SurvivalWeights,
    pub thresholds: BucketThresholds,
    pub stats_window: usize,
    pub alert_window: usize,
    pub trend_days: usize,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl CrashRiskConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        if let Some(ref w) = self.weights {
            for (name, val) in [
                ("vehicle", w.vehicle),
                ("speed", w.speed),
                ("weather", w.weather),
                ("road", w.road),
            ] {
                if let Some(v) = val {
                    if !v.is_finite() || v < 0.0 {
                        anyhow::bail!("weights.{} must be non-negative (got {})", name, v);
                    }
                    if v > MAX_WEIGHT {
                        anyhow::bail!("weights.{} must be at most {} (got {})", name, MAX_WEIGHT, v);
                    }
                }
            }
        }

        if let Some(ref t) = self.thresholds {
            let defaults = BucketThresholds::default();
            let moderate = t.moderate.unwrap_or(defaults.moderate);
            let high = t.high.unwrap_or(defaults.high);

            if moderate <= 0.0 {
                anyhow::bail!("thresholds.moderate must be positive (got {})", moderate);
            }
            if high > 100.0 {
                anyhow::bail!("thresholds.high must be at most 100 (got {})", high);
            }
            if moderate >= high {
                anyhow::bail!(
                    "thresholds.moderate ({}) must be less than thresholds.high ({})",
                    moderate,
                    high
                );
            }
        }

        for (name, val) in [
            ("stats_window", self.stats_window),
            ("alert_window", self.alert_window),
            ("trend_days", self.trend_days),
        ] {
            if val == Some(0) {
                anyhow::bail!("{} must be at least 1", name);
            }
        }

        if let Some(days) = self.trend_days {
            if days > MAX_TREND_DAYS {
                anyhow::bail!("trend_days must be at most {} (got {})", MAX_TREND_DAYS, days);
            }
        }

        Ok(())
    }

    /// Resolve config into a form ready for use
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let default_weights = SurvivalWeights::default();
        let weights = match &self.weights {
            Some(w) => SurvivalWeights {
                vehicle: w.vehicle.unwrap_or(default_weights.vehicle),
                speed: w.speed.unwrap_or(default_weights.speed),
                weather: w.weather.unwrap_or(default_weights.weather),
                road: w.road.unwrap_or(default_weights.road),
            },
            None => default_weights,
        };

        let default_thresholds = BucketThresholds::default();
        let thresholds = match &self.thresholds {
            Some(t) => BucketThresholds {
                moderate: t.moderate.unwrap_or(default_thresholds.moderate),
                high: t.high.unwrap_or(default_thresholds.high),
            },
            None => default_thresholds,
        };

        Ok(ResolvedConfig {
            data_path: self.data.clone(),
            weights,
            thresholds,
            stats_window: self.stats_window.unwrap_or(DEFAULT_STATS_WINDOW),
            alert_window: self.alert_window.unwrap_or(DEFAULT_ALERT_WINDOW),
            trend_days: self.trend_days.unwrap_or(DEFAULT_TREND_DAYS),
            config_path: None,
        })
    }
}

impl ResolvedConfig {
    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        CrashRiskConfig::default().resolve()
    }
}

/// Discover and load a config file from a directory
///
/// Search order:
/// 1. `.crashriskrc.json`
/// 2. `crashrisk.config.json`
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(root: &Path) -> Result<Option<(CrashRiskConfig, PathBuf)>> {
    for name in [".crashriskrc.json", "crashrisk.config.json"] {
        let path = root.join(name);
        if path.exists() {
            let config = load_config_file(&path)?;
            return Ok(Some((config, path)));
        }
    }

    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<CrashRiskConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: CrashRiskConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load and resolve config
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config in `root`.
/// Returns default config if nothing is found.
pub fn load_and_resolve(root: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(root)? {
            Some((config, path)) => (config, Some(path)),
            None => (CrashRiskConfig::default(), None),
        }
    };

    let mut resolved = config.resolve()?;
    resolved.config_path = source_path;
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config_is_valid() {
        let config = CrashRiskConfig::default();
        config.validate().expect("default config should be valid");
        let resolved = config.resolve().expect("default config should resolve");
        assert_eq!(resolved.weights, SurvivalWeights::default());
        assert_eq!(resolved.thresholds.moderate, 40.0);
        assert_eq!(resolved.thresholds.high, 70.0);
        assert_eq!(resolved.stats_window, 100);
        assert_eq!(resolved.alert_window, 10);
        assert_eq!(resolved.trend_days, 7);
        assert!(resolved.data_path.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "data": "data/incidents.csv",
            "weights": {"vehicle": 0.4, "speed": 0.2, "weather": 0.2, "road": 0.2},
            "thresholds": {"moderate": 30.0, "high": 60.0},
            "stats_window": 50,
            "alert_window": 5,
            "trend_days": 14
        }"#;
        let config: CrashRiskConfig = serde_json::from_str(json).unwrap();
        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.data_path, Some(PathBuf::from("data/incidents.csv")));
        assert_eq!(resolved.weights.vehicle, 0.4);
        assert_eq!(resolved.thresholds.high, 60.0);
        assert_eq!(resolved.stats_window, 50);
        assert_eq!(resolved.alert_window, 5);
        assert_eq!(resolved.trend_days, 14);
    }

    #[test]
    fn test_reject_unknown_fields() {
        let json = r#"{"unknown_field": true}"#;
        let result: Result<CrashRiskConfig, _> = serde_json::from_str(json);
        assert!(result.is_err(), "unknown fields should be rejected");
    }

    #[test]
    fn test_reject_negative_weight() {
        let json = r#"{"weights": {"speed": -0.1}}"#;
        let config: CrashRiskConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_weight_over_limit() {
        let json = r#"{"weights": {"road": 11.0}}"#;
        let config: CrashRiskConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_unordered_thresholds() {
        let json = r#"{"thresholds": {"moderate": 70.0, "high": 40.0}}"#;
        let config: CrashRiskConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_zero_window() {
        let json = r#"{"stats_window": 0}"#;
        let config: CrashRiskConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_oversized_trend() {
        let json = r#"{"trend_days": 200000000}"#;
        let config: CrashRiskConfig = serde_json::from_str(json).unwrap();
        assert!(config.resolve().is_err());

        let json = r#"{"trend_days": 3660}"#;
        let config: CrashRiskConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.resolve().unwrap().trend_days, 3660);
    }

    #[test]
    fn test_partial_weights_use_defaults_for_rest() {
        let json = r#"{"weights": {"vehicle": 0.5}}"#;
        let config: CrashRiskConfig = serde_json::from_str(json).unwrap();
        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.weights.vehicle, 0.5);
        assert_eq!(resolved.weights.speed, 0.3); // default
        assert_eq!(resolved.weights.weather, 0.2); // default
        assert_eq!(resolved.weights.road, 0.2); // default
    }

    #[test]
    fn test_discover_rc_file_takes_priority() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".crashriskrc.json"), r#"{"alert_window": 3}"#).unwrap();
        fs::write(
            dir.path().join("crashrisk.config.json"),
            r#"{"alert_window": 4}"#,
        )
        .unwrap();

        let (config, path) = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.alert_window, Some(3));
        assert_eq!(path, dir.path().join(".crashriskrc.json"));
    }

    #[test]
    fn test_discover_config_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("crashrisk.config.json"), r#"{"trend_days": 3}"#).unwrap();
        let (config, _) = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.trend_days, Some(3));
    }

    #[test]
    fn test_no_config_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_config(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_load_and_resolve_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("custom.json");
        fs::write(&config_path, r#"{"thresholds": {"high": 80.0}}"#).unwrap();

        let resolved = load_and_resolve(dir.path(), Some(&config_path)).unwrap();
        assert_eq!(resolved.thresholds.high, 80.0);
        assert_eq!(resolved.thresholds.moderate, 40.0);
        assert_eq!(resolved.config_path, Some(config_path));
    }

    #[test]
    fn test_load_invalid_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("bad.json");
        fs::write(&config_path, "{not json").unwrap();
        assert!(load_and_resolve(dir.path(), Some(&config_path)).is_err());
    }
}

//! crashrisk CLI - survival estimation and road risk analysis from incident history

#![deny(warnings)]

// Global invariants enforced:
// - The dataset is loaded once, before any scoring call
// - stdout carries results only; diagnostics go to stderr
// - With --at, identical input yields byte-for-byte identical output

use anyhow::Context;
use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};
use crashrisk_core::config::{self, ResolvedConfig};
use crashrisk_core::report::{
    render_alerts_text, render_analysis_text, render_json, render_prediction_text,
    render_statistics_text, render_trend_text,
};
use crashrisk_core::{
    loader, predict, statistics, stats, Clock, FixedClock, RecordStore, RiskAnalysisEngine,
    Scenario, SystemClock,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Dataset path used when neither --data nor the config names one
const DEFAULT_DATA_PATH: &str = "data/road_accident_data.csv";

/// Accepted scenario speed range (km/h)
const MAX_SPEED: f64 = 200.0;

#[derive(Parser)]
#[command(name = "crashrisk")]
#[command(about = "Crash survival estimation and road risk analysis from historical incidents")]
#[command(version = env!("CRASHRISK_VERSION"))]
struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate survival probability and analyze risk for a scenario
    Predict {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        scenario: ScenarioArgs,
    },
    /// Analyze risk factors (defaults to a car at 60 km/h, clear and dry)
    Risk {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        scenario: OptionalScenarioArgs,
    },
    /// Show dashboard statistics for the most recent incidents
    Stats {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// List risk alerts for the most recent incidents
    Alerts {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Show daily incident counts for the last days
    Trend {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Validate or show configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without running analysis
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Path to the incident dataset (CSV, overrides config file)
    #[arg(long)]
    data: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    /// Path to config file (default: auto-discover)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pin the clock to this local time (YYYY-MM-DDTHH:MM:SS)
    #[arg(long, value_parser = parse_instant)]
    at: Option<NaiveDateTime>,
}

#[derive(Args)]
struct ScenarioArgs {
    /// Vehicle type (e.g. Car, Motorcycle, Truck, Bus)
    #[arg(long)]
    vehicle: String,

    /// Speed in km/h (0-200)
    #[arg(long)]
    speed: f64,

    /// Weather condition (e.g. Clear, Rain, Snow, Fog)
    #[arg(long)]
    weather: String,

    /// Road condition (e.g. Dry, Wet, Icy, Under Construction)
    #[arg(long)]
    road: String,

    /// Location label
    #[arg(long)]
    location: Option<String>,
}

#[derive(Args)]
struct OptionalScenarioArgs {
    /// Vehicle type (default: Car)
    #[arg(long)]
    vehicle: Option<String>,

    /// Speed in km/h, 0-200 (default: 60)
    #[arg(long)]
    speed: Option<f64>,

    /// Weather condition (default: Clear)
    #[arg(long)]
    weather: Option<String>,

    /// Road condition (default: Dry)
    #[arg(long)]
    road: Option<String>,

    /// Location label (default: Current Location)
    #[arg(long)]
    location: Option<String>,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Predict { common, scenario } => {
            let scenario = scenario.into_scenario();
            validate_speed(scenario.speed)?;
            let (store, resolved) = load_inputs(&common)?;
            let prediction = with_clock(common.at, |clock| {
                predict(&scenario, &store, clock, &resolved)
            });
            match common.format {
                OutputFormat::Text => print!("{}", render_prediction_text(&prediction)),
                OutputFormat::Json => println!("{}", render_json(&prediction)),
            }
        }
        Commands::Risk { common, scenario } => {
            let scenario = scenario.into_scenario();
            validate_speed(scenario.speed)?;
            let (store, resolved) = load_inputs(&common)?;
            let analysis = with_clock(common.at, |clock| {
                RiskAnalysisEngine::new(&store, clock)
                    .with_thresholds(resolved.thresholds)
                    .analyze(&scenario)
            });
            match common.format {
                OutputFormat::Text => print!("{}", render_analysis_text(&analysis)),
                OutputFormat::Json => println!("{}", render_json(&analysis)),
            }
        }
        Commands::Stats { common } => {
            let (store, resolved) = load_inputs(&common)?;
            let summary = statistics(&store, &resolved);
            match common.format {
                OutputFormat::Text => print!("{}", render_statistics_text(&summary)),
                OutputFormat::Json => println!("{}", render_json(&summary)),
            }
        }
        Commands::Alerts { common } => {
            let (store, resolved) = load_inputs(&common)?;
            let alerts = stats::recent_alerts(store.records(), resolved.alert_window);
            match common.format {
                OutputFormat::Text => print!("{}", render_alerts_text(&alerts)),
                OutputFormat::Json => println!("{}", render_json(&alerts)),
            }
        }
        Commands::Trend { common } => {
            let (store, resolved) = load_inputs(&common)?;
            let trend = with_clock(common.at, |clock| {
                stats::daily_trend(store.records(), clock, resolved.trend_days)
            });
            match common.format {
                OutputFormat::Text => print!("{}", render_trend_text(&trend)),
                OutputFormat::Json => println!("{}", render_json(&trend)),
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let root = std::env::current_dir()?;
                match config::load_and_resolve(&root, path.as_deref()) {
                    Ok(resolved) => {
                        if let Some(ref p) = resolved.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&root, path.as_deref())
                    .context("failed to load configuration")?;
                print_config(&resolved);
            }
        },
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Resolve configuration and load the dataset once
fn load_inputs(common: &CommonArgs) -> anyhow::Result<(RecordStore, ResolvedConfig)> {
    let root = std::env::current_dir()?;
    let resolved = config::load_and_resolve(&root, common.config.as_deref())
        .context("failed to load configuration")?;

    if let Some(config_path) = &resolved.config_path {
        info!("using config: {}", config_path.display());
    }

    // CLI flag overrides config file value
    let data_path = common
        .data
        .clone()
        .or_else(|| resolved.data_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

    let store = load_store(&data_path);
    Ok((store, resolved))
}

fn load_store(path: &Path) -> RecordStore {
    let store = loader::load_csv_or_empty(path);
    info!(
        records = store.len(),
        dropped = store.dropped(),
        "loaded {}",
        path.display()
    );
    store
}

/// Run `f` with a fixed clock when `at` is given, else the system clock
fn with_clock<T>(at: Option<NaiveDateTime>, f: impl FnOnce(&dyn Clock) -> T) -> T {
    match at {
        Some(instant) => f(&FixedClock(instant)),
        None => f(&SystemClock),
    }
}

fn parse_instant(text: &str) -> Result<NaiveDateTime, String> {
    crashrisk_core::record::parse_date(text)
        .ok_or_else(|| format!("invalid timestamp '{}' (expected YYYY-MM-DDTHH:MM:SS)", text))
}

fn validate_speed(speed: f64) -> anyhow::Result<()> {
    if !(0.0..=MAX_SPEED).contains(&speed) {
        anyhow::bail!("speed must be between 0 and {} km/h (got {})", MAX_SPEED, speed);
    }
    Ok(())
}

fn print_config(resolved: &ResolvedConfig) {
    println!("Configuration:");
    if let Some(ref p) = resolved.config_path {
        println!("  Source: {}", p.display());
    } else {
        println!("  Source: defaults (no config file found)");
    }
    println!();
    println!(
        "  Data: {}",
        resolved
            .data_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| DEFAULT_DATA_PATH.to_string())
    );
    println!();
    println!("Survival weights:");
    println!("  vehicle: {}", resolved.weights.vehicle);
    println!("  speed: {}", resolved.weights.speed);
    println!("  weather: {}", resolved.weights.weather);
    println!("  road: {}", resolved.weights.road);
    println!();
    println!("Thresholds:");
    println!("  moderate: {}", resolved.thresholds.moderate);
    println!("  high: {}", resolved.thresholds.high);
    println!();
    println!("Windows:");
    println!("  stats_window: {}", resolved.stats_window);
    println!("  alert_window: {}", resolved.alert_window);
    println!("  trend_days: {}", resolved.trend_days);
}

impl ScenarioArgs {
    fn into_scenario(self) -> Scenario {
        let scenario = Scenario::new(self.vehicle, self.speed, self.weather, self.road);
        match self.location {
            Some(location) => scenario.with_location(location),
            None => scenario,
        }
    }
}

impl OptionalScenarioArgs {
    fn into_scenario(self) -> Scenario {
        let defaults = Scenario::default();
        Scenario {
            vehicle_type: self.vehicle.unwrap_or(defaults.vehicle_type),
            speed: self.speed.unwrap_or(defaults.speed),
            weather_condition: self.weather.unwrap_or(defaults.weather_condition),
            road_condition: self.road.unwrap_or(defaults.road_condition),
            location: self.location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_range() {
        assert!(validate_speed(0.0).is_ok());
        assert!(validate_speed(200.0).is_ok());
        assert!(validate_speed(-1.0).is_err());
        assert!(validate_speed(200.5).is_err());
        assert!(validate_speed(f64::NAN).is_err());
    }

    #[test]
    fn test_risk_scenario_defaults() {
        let cli = Cli::parse_from(["crashrisk", "risk", "--weather", "Snow"]);
        let Commands::Risk { scenario, .. } = cli.command else {
            panic!("expected risk command");
        };
        let scenario = scenario.into_scenario();
        assert_eq!(scenario.vehicle_type, "Car");
        assert_eq!(scenario.speed, 60.0);
        assert_eq!(scenario.weather_condition, "Snow");
        assert_eq!(scenario.road_condition, "Dry");
        assert_eq!(scenario.location, None);
    }

    #[test]
    fn test_at_flag_parses() {
        let cli = Cli::parse_from(["crashrisk", "trend", "--at", "2024-05-10T12:00:00"]);
        let Commands::Trend { common } = cli.command else {
            panic!("expected trend command");
        };
        let at = common.at.unwrap();
        assert_eq!(at.format("%H:%M").to_string(), "12:00");

        assert!(Cli::try_parse_from(["crashrisk", "trend", "--at", "noon"]).is_err());
    }

    #[test]
    fn test_risk_flags_have_help() {
        use clap::CommandFactory;
        let mut cmd = Cli::command();
        let risk = cmd.find_subcommand_mut("risk").unwrap();
        for flag in ["vehicle", "speed", "weather", "road", "location"] {
            let arg = risk.get_arguments().find(|a| a.get_id() == flag).unwrap();
            assert!(arg.get_help().is_some(), "--{} has no help text", flag);
        }
    }
}

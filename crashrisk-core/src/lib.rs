//! crashrisk core library - survival estimation and road risk analysis over historical incidents

#![deny(warnings)]

// Global invariants enforced in this crate:
// - The record store is loaded once and never mutated afterwards
// - No global mutable state
// - No clock reads except through an injected `Clock`
// - No randomness, threads, or async
// - Every score is clamped to [0, 100]
// - Identical input yields byte-for-byte identical output

pub mod analysis;
pub mod clock;
pub mod config;
pub mod loader;
pub mod record;
pub mod report;
pub mod risk;
pub mod scenario;
pub mod stats;
pub mod store;
pub mod survival;

pub use analysis::{AnalysisSummary, RiskAnalysis, RiskAnalysisEngine, RiskFactor};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::ResolvedConfig;
pub use record::{IncidentRecord, RawRow};
pub use report::render_json;
pub use scenario::Scenario;
pub use stats::{summarize, DerivedStatistics};
pub use store::RecordStore;
pub use survival::{estimate_survival, SurvivalBreakdown};

use serde::{Deserialize, Serialize};

/// A scenario scored by both the survival estimator and the risk engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Prediction {
    pub scenario: Scenario,
    pub survival_probability: f64,
    pub survival_breakdown: SurvivalBreakdown,
    pub analysis: RiskAnalysis,
}

/// Score a scenario against one store snapshot
pub fn predict<C: Clock + ?Sized>(
    scenario: &Scenario,
    store: &RecordStore,
    clock: &C,
    config: &ResolvedConfig,
) -> Prediction {
    let (survival_probability, survival_breakdown) =
        survival::estimate_survival_with_weights(scenario, store.records(), &config.weights);

    let analysis = RiskAnalysisEngine::new(store, clock)
        .with_thresholds(config.thresholds)
        .analyze(scenario);

    Prediction {
        scenario: scenario.clone(),
        survival_probability,
        survival_breakdown,
        analysis,
    }
}

/// Dashboard statistics over the configured trailing window
pub fn statistics(store: &RecordStore, config: &ResolvedConfig) -> DerivedStatistics {
    stats::summarize_with_thresholds(store.recent(config.stats_window), &config.thresholds)
}

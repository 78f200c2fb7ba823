//! Run results: timeline, snapshots, and summary
//!
//! A run is one execution of a scenario against its target twins. The engine
//! constructs the `RunResult` and returns it to the caller without retaining
//! a reference; persistence and rendering are the caller's concern.
//!
//! # Replay Identity
//!
//! Timeline timestamps are *simulated* seconds since run start, so two runs
//! of the same scenario+twins+seed serialize byte-identically. Wall-clock
//! metadata (`started_at_epoch`, `duration_seconds`) lives outside the
//! timeline and is excluded from the replay digest.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::analytics::{CapacityAnalysis, RiskAnalysis};
use crate::events::types::FiredEvent;
use crate::models::scenario::ScenarioType;
use crate::models::twin::{Twin, TwinMetrics, TwinState};
use crate::optimizer::OptimizationOutcome;

/// Driver lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Constructed and validated, no steps executed yet
    Initialized,
    /// Step loop in progress
    Running,
    /// Horizon fully simulated
    Completed,
    /// An error was raised mid-run and propagated to the caller
    Failed,
}

/// One twin's snapshot inside a time step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwinSnapshot {
    /// Full state vector after this step
    pub state: TwinState,

    /// Derived metrics for this step
    pub metrics: TwinMetrics,

    /// Events that affected this twin during this step
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<FiredEvent>,
}

/// One discrete simulated hour across all target twins
///
/// Sequential and Markov: step n+1 is derived only from step n plus that
/// step's scenario-event side effects. Twin snapshots are keyed in a
/// `BTreeMap` so serialization order is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeStep {
    /// Zero-based step index
    pub step: usize,

    /// Simulated seconds since run start at which this step begins
    pub timestamp: u64,

    /// Per-twin snapshots, keyed by twin identity
    pub twins: BTreeMap<String, TwinSnapshot>,

    /// Deterministic events (conditions, capacity actions) fired this step
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<FiredEvent>,

    /// Risk events fired this step
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub risk_events: Vec<FiredEvent>,
}

/// Aggregate metrics reduced from a completed timeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Simulated horizon in hours
    pub duration_hours: usize,

    /// Steps actually executed
    pub steps: usize,

    /// Twins simulated
    pub twin_count: usize,

    /// Cumulative output across all twins at the final step (units)
    pub total_output: f64,

    /// Mean of state efficiency over steps × twins
    pub average_efficiency: f64,

    /// Highest state efficiency observed in any snapshot
    pub peak_efficiency: f64,

    /// Sum of unresolved downtime across twins at the final step (minutes)
    pub total_downtime_minutes: f64,
}

/// Complete result of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Engine-assigned run identity
    pub run_id: String,

    /// Scenario identity fields, echoed for the caller's bookkeeping
    pub scenario_id: String,
    pub scenario_name: String,
    pub scenario_type: ScenarioType,

    /// Final driver status (always `Completed` on the success path; a failed
    /// run surfaces as an error, not a result)
    pub status: RunStatus,

    /// Seed the run's RNG was constructed with
    pub seed: u64,

    /// Wall-clock run metadata (unix seconds / elapsed seconds)
    pub started_at_epoch: u64,
    pub finished_at_epoch: u64,
    pub duration_seconds: f64,

    /// Twin records as they stood at run start (working copies, pre-step)
    pub twins: Vec<Twin>,

    /// Chronologically ordered timeline
    pub timeline: Vec<TimeStep>,

    /// Aggregates reduced from the timeline
    pub summary: RunSummary,

    /// Flat event log (what-if runs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_log: Option<Vec<FiredEvent>>,

    /// GA outcome (optimization runs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimization_results: Option<OptimizationOutcome>,

    /// Risk aggregates (risk-assessment runs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_assessment: Option<RiskAnalysis>,

    /// Utilization aggregates (capacity-planning runs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity_analysis: Option<CapacityAnalysis>,
}

impl RunResult {
    /// SHA-256 hex digest of the canonical-JSON timeline
    ///
    /// Two runs of the same scenario, twins, and seed produce equal digests;
    /// callers can verify replay identity without byte-comparing timelines.
    pub fn timeline_digest(&self) -> String {
        let json = serde_json::to_string(&self.timeline).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_status_serializes_snake_case() {
        let json = serde_json::to_string(&RunStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
    }

    #[test]
    fn test_digest_ignores_wall_clock_metadata() {
        let template = RunResult {
            run_id: "a".to_string(),
            scenario_id: "s".to_string(),
            scenario_name: "s".to_string(),
            scenario_type: ScenarioType::Standard,
            status: RunStatus::Completed,
            seed: 1,
            started_at_epoch: 100,
            finished_at_epoch: 160,
            duration_seconds: 60.0,
            twins: Vec::new(),
            timeline: Vec::new(),
            summary: RunSummary::default(),
            event_log: None,
            optimization_results: None,
            risk_assessment: None,
            capacity_analysis: None,
        };

        let mut later = template.clone();
        later.run_id = "b".to_string();
        later.started_at_epoch = 999;
        later.duration_seconds = 2.5;

        assert_eq!(template.timeline_digest(), later.timeline_digest());
    }
}

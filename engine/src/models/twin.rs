//! Digital twin records
//!
//! A twin is a virtual replica of one physical production entity. It carries
//! an immutable-per-run `configuration` (the baseline seeded from historical
//! data by the caller) and a mutable `state` vector that the engine advances
//! step by step.
//!
//! # Critical Invariants
//!
//! 1. `state.current_efficiency ∈ [0.1, 1.0]`
//! 2. `state.equipment_wear ∈ [0.0, 1.0]`
//! 3. `state.current_downtime ≥ 0`
//!
//! The engine clamps on read and after every mutation it performs, so a state
//! observed in any timeline snapshot satisfies the invariants. Configuration
//! is only ever mutated through explicit scenario events (what-if conditions
//! and capacity actions).

use serde::{Deserialize, Serialize};

/// Kind of production entity a twin replicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TwinType {
    ProductionLine,
    Workstation,
    Equipment,
    ProcessCell,
    EntireFacility,
}

/// Immutable-per-run baseline for a twin
///
/// `production_capacity` is a daily figure (units per 8-hour reference
/// shift day); the step updater converts it to an hourly rate. A missing
/// capacity is defensively defaulted at step time, never rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwinConfiguration {
    /// Nominal daily production capacity (units). None → default 1000.
    #[serde(default)]
    pub production_capacity: Option<f64>,

    /// Baseline efficiency factor in `[0.1, 1.0]`
    pub current_efficiency: f64,

    /// Staffing level (informational; not consumed by the step updater)
    #[serde(default)]
    pub manning_level: Option<u32>,

    /// Free-text process category (informational)
    #[serde(default)]
    pub process_category: Option<String>,
}

impl TwinConfiguration {
    /// Clamp baseline efficiency into its valid range
    pub fn clamp_invariants(&mut self) {
        self.current_efficiency = self.current_efficiency.clamp(0.1, 1.0);
    }
}

/// Mutable state vector advanced by the step updater
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwinState {
    /// Cumulative output since run start (units; never decreases mid-run)
    pub current_output: f64,

    /// Live efficiency, drifting under a small random walk, in `[0.1, 1.0]`
    pub current_efficiency: f64,

    /// Accumulated unresolved downtime (minutes, ≥ 0)
    pub current_downtime: f64,

    /// Derived quality rate (percent, recomputed each step)
    pub quality_rate: f64,

    /// Derived resource utilization (percent, recomputed each step)
    pub resource_utilization: f64,

    /// Energy draw (kWh; only mutated by resource-change scenario events)
    pub energy_consumption: f64,

    /// Worker fatigue in `[0.0, 1.0]`, following the shift cycle
    pub worker_fatigue: f64,

    /// Equipment wear in `[0.0, 1.0]`; monotone within a run (resets only
    /// via external calibration, outside engine scope)
    pub equipment_wear: f64,
}

impl TwinState {
    /// A fresh state at the given baseline efficiency
    ///
    /// # Example
    /// ```
    /// use twin_simulator_core_rs::models::TwinState;
    ///
    /// let state = TwinState::baseline(0.8);
    /// assert_eq!(state.current_output, 0.0);
    /// assert_eq!(state.current_efficiency, 0.8);
    /// ```
    pub fn baseline(efficiency: f64) -> Self {
        let mut state = Self {
            current_output: 0.0,
            current_efficiency: efficiency,
            current_downtime: 0.0,
            quality_rate: 95.0,
            resource_utilization: 0.0,
            energy_consumption: 0.0,
            worker_fatigue: 0.0,
            equipment_wear: 0.0,
        };
        state.clamp_invariants();
        state
    }

    /// Re-establish the state invariants after a mutation
    pub fn clamp_invariants(&mut self) {
        self.current_efficiency = self.current_efficiency.clamp(0.1, 1.0);
        self.equipment_wear = self.equipment_wear.clamp(0.0, 1.0);
        self.worker_fatigue = self.worker_fatigue.clamp(0.0, 1.0);
        self.current_downtime = self.current_downtime.max(0.0);
        self.quality_rate = self.quality_rate.max(0.0);
    }
}

impl Default for TwinState {
    fn default() -> Self {
        Self::baseline(1.0)
    }
}

/// Per-step derived metrics snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwinMetrics {
    /// Units produced this step (hourly rate)
    pub output_rate: f64,

    /// Effective efficiency used for this step (baseline × override)
    pub effective_efficiency: f64,

    /// Quality rate derived this step (percent, capped at 99)
    pub quality_rate: f64,

    /// Resource utilization derived this step (percent, capped at 100)
    pub resource_utilization: f64,
}

/// A virtual replica of one production entity
///
/// Created externally (seeded from historical baselines); the engine clones
/// twin records at run start and works exclusively on the copies, so the
/// caller's records are never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Twin {
    /// Caller-assigned identity
    pub id: String,

    /// Display name
    pub name: String,

    /// Kind of replicated entity
    pub twin_type: TwinType,

    /// Immutable-per-run baseline
    pub configuration: TwinConfiguration,

    /// Mutable state vector
    pub state: TwinState,
}

impl Twin {
    /// Construct a twin, clamping configuration and state into range
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        twin_type: TwinType,
        mut configuration: TwinConfiguration,
        mut state: TwinState,
    ) -> Self {
        configuration.clamp_invariants();
        state.clamp_invariants();
        Self {
            id: id.into(),
            name: name.into(),
            twin_type,
            configuration,
            state,
        }
    }
}

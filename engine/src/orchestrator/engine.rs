//! Simulation driver: the discrete-time step loop
//!
//! The driver owns one run end to end:
//!
//! ```text
//! For each step t (one simulated hour):
//! 1. Evaluate scenario events against the elapsed-hour marker
//! 2. Apply matching events to twin configuration/state (in place)
//! 3. Invoke the step updater for every twin in the target set
//! 4. Append the per-twin snapshots as one TimeStep
//! 5. Advance the simulated clock by exactly one hour
//! ```
//!
//! Lifecycle: `Initialized → Running → {Completed | Failed}`. On any error
//! mid-run the driver transitions to `Failed` and propagates the error
//! verbatim: no partial-result recovery, no retries (the caller decides
//! what to do with a failed run).
//!
//! # Ownership
//!
//! The driver clones the caller's twin records at construction and works
//! exclusively on the copies (copy-on-run-start). Strategies and the event
//! handler only ever receive mutable borrows of the working set, never a
//! second owner, so twins shared across concurrent runs cannot alias.
//!
//! # Determinism
//!
//! All randomness flows through the injected `RngManager`. Same seed + same
//! scenario + same twins = byte-identical timeline.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::analytics::summarize;
use crate::core::clock::SimulationClock;
use crate::events::handler::{EventError, ScenarioEventHandler};
use crate::models::run::{RunResult, RunStatus, TimeStep, TwinSnapshot};
use crate::models::scenario::{InputParameters, Scenario, ScenarioType};
use crate::models::twin::Twin;
use crate::optimizer::{self, GaConfig, OptimizerError};
use crate::rng::RngManager;
use crate::stepper::{advance_twin, StepOverrides};
use crate::strategy::{strategy_for, ScenarioStrategy, StandardStrategy};

/// Upper bound on a scenario horizon (one year of hourly steps)
pub const MAX_DURATION_HOURS: usize = 8760;

/// Engine error taxonomy
///
/// Configuration errors are raised before any simulation step executes;
/// runtime errors transition the driver to `Failed` and propagate verbatim.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Scenario or run parameters failed upfront validation
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A referenced twin identity could not be resolved
    #[error("twin not found: {0}")]
    TwinNotFound(String),

    /// The scenario type cannot be dispatched where it was used
    #[error("unsupported scenario: {0}")]
    UnsupportedScenario(String),

    /// The GA optimizer rejected its inputs
    #[error("optimization failed: {0}")]
    Optimization(#[from] OptimizerError),
}

impl From<EventError> for SimulationError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::TargetNotFound(id) => SimulationError::TwinNotFound(id),
        }
    }
}

/// Drives one scenario run to completion
pub struct SimulationDriver {
    scenario: Scenario,
    /// Scenario parameters with run-time overrides merged in
    params: InputParameters,
    /// Step-updater overrides derived from `params`
    overrides: StepOverrides,
    /// Twin records as they stood at run start
    initial_twins: Vec<Twin>,
    /// Working copies advanced by the step loop (exclusively owned)
    working: Vec<Twin>,
    clock: SimulationClock,
    rng: RngManager,
    handler: ScenarioEventHandler,
    strategy: Box<dyn ScenarioStrategy>,
    status: RunStatus,
    timeline: Vec<TimeStep>,
}

// Manual impl: the boxed strategy is not Debug, so derive is unavailable
impl fmt::Debug for SimulationDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationDriver")
            .field("scenario", &self.scenario.id)
            .field("strategy", &self.strategy.name())
            .field("status", &self.status)
            .field("step", &self.clock.current_step())
            .field("twins", &self.working.len())
            .finish_non_exhaustive()
    }
}

impl SimulationDriver {
    /// Create a driver, dispatching the strategy from the scenario type
    ///
    /// # Errors
    ///
    /// * `UnsupportedScenario` for `ScenarioType::Optimization` (use
    ///   [`run_scenario`] instead)
    /// * `InvalidConfig` / `TwinNotFound` per [`Self::with_strategy`]
    pub fn new(
        scenario: Scenario,
        twins: &[Twin],
        overrides: &InputParameters,
        rng: RngManager,
    ) -> Result<Self, SimulationError> {
        let strategy = strategy_for(scenario.scenario_type)?;
        Self::with_strategy(scenario, twins, overrides, rng, strategy)
    }

    /// Create a driver with an explicit strategy
    ///
    /// Validates the configuration before any step executes: the target set
    /// must be non-empty and free of duplicates, every target (and every
    /// twin referenced by an event target list) must resolve, and the
    /// horizon must not exceed [`MAX_DURATION_HOURS`].
    pub fn with_strategy(
        scenario: Scenario,
        twins: &[Twin],
        overrides: &InputParameters,
        rng: RngManager,
        strategy: Box<dyn ScenarioStrategy>,
    ) -> Result<Self, SimulationError> {
        if scenario.target_twins.is_empty() {
            return Err(SimulationError::InvalidConfig(
                "scenario targets no twins".to_string(),
            ));
        }
        if scenario.duration_hours > MAX_DURATION_HOURS {
            return Err(SimulationError::InvalidConfig(format!(
                "duration_hours {} exceeds maximum {}",
                scenario.duration_hours, MAX_DURATION_HOURS
            )));
        }

        let mut seen = std::collections::HashSet::new();
        for id in &scenario.target_twins {
            if !seen.insert(id) {
                return Err(SimulationError::InvalidConfig(format!(
                    "duplicate target twin: {}",
                    id
                )));
            }
        }

        // Copy-on-run-start: clone each target into the working set, in
        // target order, clamping on read
        let mut working = Vec::with_capacity(scenario.target_twins.len());
        for id in &scenario.target_twins {
            let twin = twins
                .iter()
                .find(|t| &t.id == id)
                .ok_or_else(|| SimulationError::TwinNotFound(id.clone()))?;
            let mut copy = twin.clone();
            copy.configuration.clamp_invariants();
            copy.state.clamp_invariants();
            working.push(copy);
        }

        let params = scenario.input_parameters.merged_with(overrides);
        let handler = strategy.build_event_handler(&params);

        // Event target lists must resolve within the working set
        for id in handler.referenced_targets() {
            if !working.iter().any(|t| t.id == id) {
                return Err(SimulationError::TwinNotFound(id.to_string()));
            }
        }

        let overrides = StepOverrides {
            efficiency_modifier: params.efficiency_modifier,
            capacity_modifier: params.capacity_modifier,
        };
        let clock = SimulationClock::new(scenario.duration_hours);
        let initial_twins = working.clone();

        Ok(Self {
            scenario,
            params,
            overrides,
            initial_twins,
            working,
            clock,
            rng,
            handler,
            strategy,
            status: RunStatus::Initialized,
            timeline: Vec::new(),
        })
    }

    /// Current lifecycle state
    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Steps completed so far
    pub fn current_step(&self) -> usize {
        self.clock.current_step()
    }

    /// Merged input parameters this run executes with
    pub fn params(&self) -> &InputParameters {
        &self.params
    }

    /// Timeline accumulated so far (complete once `run` returns)
    pub fn timeline(&self) -> &[TimeStep] {
        &self.timeline
    }

    /// Execute one step: events, then the step updater for every twin
    fn execute_step(&mut self) -> Result<TimeStep, SimulationError> {
        let step = self.clock.current_step();
        let fired = self
            .handler
            .apply_step(step, &mut self.working, &mut self.rng)?;

        let mut snapshots = BTreeMap::new();
        for twin in &mut self.working {
            let downtime_adjusted = fired
                .iter()
                .any(|event| event.target == twin.id && event.touches_downtime());

            let metrics = advance_twin(
                &twin.configuration,
                &mut twin.state,
                &self.overrides,
                step,
                downtime_adjusted,
                &mut self.rng,
            );

            let twin_events: Vec<_> = fired
                .iter()
                .filter(|event| event.target == twin.id)
                .cloned()
                .collect();

            snapshots.insert(
                twin.id.clone(),
                TwinSnapshot {
                    state: twin.state.clone(),
                    metrics,
                    events: twin_events,
                },
            );
        }

        let (risk_events, events): (Vec<_>, Vec<_>) =
            fired.into_iter().partition(|event| event.is_risk());

        let time_step = TimeStep {
            step,
            timestamp: self.clock.elapsed_seconds(),
            twins: snapshots,
            events,
            risk_events,
        };

        self.clock.advance_step();
        Ok(time_step)
    }

    /// Run the scenario to completion and build the result
    ///
    /// Consumes the driver: the result owns the timeline exclusively and
    /// the engine retains no reference to it.
    pub fn run(mut self) -> Result<RunResult, SimulationError> {
        let started_at_epoch = unix_now();
        let wall_clock = Instant::now();

        self.status = RunStatus::Running;
        info!(
            scenario = %self.scenario.id,
            strategy = self.strategy.name(),
            twins = self.working.len(),
            steps = self.clock.total_steps(),
            "simulation run started"
        );

        while !self.clock.is_finished() {
            match self.execute_step() {
                Ok(time_step) => self.timeline.push(time_step),
                Err(err) => {
                    self.status = RunStatus::Failed;
                    return Err(err);
                }
            }
        }
        self.status = RunStatus::Completed;

        let summary = summarize(&self.timeline, self.scenario.duration_hours);
        debug!(
            scenario = %self.scenario.id,
            total_output = summary.total_output,
            average_efficiency = summary.average_efficiency,
            "timeline reduced"
        );

        let mut result = RunResult {
            run_id: Uuid::new_v4().to_string(),
            scenario_id: self.scenario.id.clone(),
            scenario_name: self.scenario.name.clone(),
            scenario_type: self.scenario.scenario_type,
            status: self.status,
            seed: self.rng.seed(),
            started_at_epoch,
            finished_at_epoch: unix_now(),
            duration_seconds: wall_clock.elapsed().as_secs_f64(),
            twins: self.initial_twins,
            timeline: self.timeline,
            summary,
            event_log: None,
            optimization_results: None,
            risk_assessment: None,
            capacity_analysis: None,
        };
        self.strategy.finalize(&mut result);

        info!(
            scenario = %result.scenario_id,
            steps = result.timeline.len(),
            "simulation run completed"
        );
        Ok(result)
    }
}

/// Execute a scenario end to end
///
/// This is the engine's main entry point. For the four plain scenario types
/// it constructs a driver and runs it. For `optimization` it first runs the
/// GA over the scenario's goals, merges the winning parameter vector into
/// the run overrides, re-runs the standard strategy with the same random
/// stream, and tags the result with the optimizer outcome.
///
/// # Example
/// ```
/// use twin_simulator_core_rs::models::{
///     InputParameters, Scenario, ScenarioType, Twin, TwinConfiguration, TwinState, TwinType,
/// };
/// use twin_simulator_core_rs::orchestrator::run_scenario;
///
/// let twin = Twin::new(
///     "LINE_01",
///     "Assembly Line 1",
///     TwinType::ProductionLine,
///     TwinConfiguration {
///         production_capacity: Some(1000.0),
///         current_efficiency: 0.8,
///         manning_level: Some(12),
///         process_category: None,
///     },
///     TwinState::baseline(0.8),
/// );
///
/// let scenario = Scenario {
///     id: "scn-1".to_string(),
///     name: "Baseline shift".to_string(),
///     scenario_type: ScenarioType::Standard,
///     target_twins: vec!["LINE_01".to_string()],
///     input_parameters: InputParameters::default(),
///     duration_hours: 8,
/// };
///
/// let result = run_scenario(&scenario, &[twin], &InputParameters::default(), 42).unwrap();
/// assert_eq!(result.timeline.len(), 8);
/// ```
pub fn run_scenario(
    scenario: &Scenario,
    twins: &[Twin],
    overrides: &InputParameters,
    seed: u64,
) -> Result<RunResult, SimulationError> {
    let rng = RngManager::new(seed);

    if scenario.scenario_type != ScenarioType::Optimization {
        let driver = SimulationDriver::new(scenario.clone(), twins, overrides, rng)?;
        return driver.run();
    }

    // Optimization: GA search first, then a standard re-run with the best
    // parameters merged into the overrides. The driver continues on the
    // same random stream so the whole composite run is seed-reproducible.
    let mut rng = rng;
    let merged = scenario.input_parameters.merged_with(overrides);
    let ga_config = GaConfig::from_params(&merged);
    let outcome = optimizer::optimize(&merged.optimization_goals, &ga_config, &mut rng)?;
    info!(
        scenario = %scenario.id,
        best_fitness = outcome.best.fitness,
        generations = outcome.generations,
        "optimization search finished; re-running with best parameters"
    );

    let mut tuned = merged;
    tuned.efficiency_modifier = Some(outcome.best.efficiency_modifier);
    tuned.capacity_modifier = Some(outcome.best.capacity_modifier);

    let driver = SimulationDriver::with_strategy(
        scenario.clone(),
        twins,
        &tuned,
        rng,
        Box::new(StandardStrategy),
    )?;
    let mut result = driver.run()?;
    result.optimization_results = Some(outcome);
    Ok(result)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

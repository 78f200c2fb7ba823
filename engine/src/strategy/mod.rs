//! Scenario strategies
//!
//! Thin wrappers around the simulation driver that differ only in which
//! event family is evaluated each step and which extra analysis is attached
//! to the result:
//!
//! 1. **Standard**: no events, base summary only
//! 2. **WhatIf**: conditions checked every step; flat event log attached
//! 3. **RiskAssessment**: risk draws every step; risk analysis attached
//! 4. **CapacityPlanning**: capacity actions; capacity analysis attached
//!
//! The `optimization` scenario type is not a strategy of its own: the
//! orchestrator runs the GA first and then re-runs `Standard` with the
//! winning parameters merged in (see `orchestrator::run_scenario`).

use crate::events::handler::ScenarioEventHandler;
use crate::models::run::RunResult;
use crate::models::scenario::{InputParameters, ScenarioType};
use crate::orchestrator::SimulationError;

mod capacity;
mod risk;
mod standard;
mod what_if;

pub use capacity::CapacityPlanningStrategy;
pub use risk::RiskAssessmentStrategy;
pub use standard::StandardStrategy;
pub use what_if::WhatIfStrategy;

/// Per-scenario-type behavior plugged into the driver
pub trait ScenarioStrategy {
    /// Strategy name for diagnostics
    fn name(&self) -> &'static str;

    /// Which events this strategy evaluates each step
    fn build_event_handler(&self, params: &InputParameters) -> ScenarioEventHandler;

    /// Attach strategy-specific analysis to a completed result
    fn finalize(&self, result: &mut RunResult);
}

/// Resolve the strategy for a scenario type
///
/// `Optimization` is rejected here: it is orchestrated above the driver, not
/// dispatched into it.
pub fn strategy_for(
    scenario_type: ScenarioType,
) -> Result<Box<dyn ScenarioStrategy>, SimulationError> {
    match scenario_type {
        ScenarioType::Standard => Ok(Box::new(StandardStrategy)),
        ScenarioType::WhatIf => Ok(Box::new(WhatIfStrategy)),
        ScenarioType::RiskAssessment => Ok(Box::new(RiskAssessmentStrategy)),
        ScenarioType::CapacityPlanning => Ok(Box::new(CapacityPlanningStrategy)),
        ScenarioType::Optimization => Err(SimulationError::UnsupportedScenario(
            "optimization scenarios are handled by run_scenario, not the driver".to_string(),
        )),
    }
}

//! Capacity-planning strategy: one-shot actions plus utilization analysis

use crate::analytics::analyze_capacity;
use crate::events::handler::ScenarioEventHandler;
use crate::models::run::RunResult;
use crate::models::scenario::InputParameters;
use crate::strategy::ScenarioStrategy;

/// Capacity actions fire at their start hours; result carries a
/// utilization analysis with recommendations
pub struct CapacityPlanningStrategy;

impl ScenarioStrategy for CapacityPlanningStrategy {
    fn name(&self) -> &'static str {
        "capacity_planning"
    }

    fn build_event_handler(&self, params: &InputParameters) -> ScenarioEventHandler {
        ScenarioEventHandler::new(Vec::new(), Vec::new(), params.capacity_actions.clone())
    }

    fn finalize(&self, result: &mut RunResult) {
        result.capacity_analysis = Some(analyze_capacity(&result.timeline));
    }
}

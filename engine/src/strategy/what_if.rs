//! What-if strategy: one-shot conditions plus a flat event log

use crate::events::handler::ScenarioEventHandler;
use crate::models::run::RunResult;
use crate::models::scenario::InputParameters;
use crate::strategy::ScenarioStrategy;

/// Conditions checked every step; result carries a flat event log
pub struct WhatIfStrategy;

impl ScenarioStrategy for WhatIfStrategy {
    fn name(&self) -> &'static str {
        "what_if"
    }

    fn build_event_handler(&self, params: &InputParameters) -> ScenarioEventHandler {
        ScenarioEventHandler::new(params.conditions.clone(), Vec::new(), Vec::new())
    }

    fn finalize(&self, result: &mut RunResult) {
        let log: Vec<_> = result
            .timeline
            .iter()
            .flat_map(|step| step.events.iter().cloned())
            .collect();
        result.event_log = Some(log);
    }
}

//! Standard strategy: plain timeline simulation, no event injection

use crate::events::handler::ScenarioEventHandler;
use crate::models::run::RunResult;
use crate::models::scenario::InputParameters;
use crate::strategy::ScenarioStrategy;

/// No events, base summary only
pub struct StandardStrategy;

impl ScenarioStrategy for StandardStrategy {
    fn name(&self) -> &'static str {
        "standard"
    }

    fn build_event_handler(&self, _params: &InputParameters) -> ScenarioEventHandler {
        ScenarioEventHandler::empty()
    }

    fn finalize(&self, _result: &mut RunResult) {}
}

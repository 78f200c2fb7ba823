//! Risk-assessment strategy: Bernoulli risk draws plus risk aggregates

use crate::analytics::analyze_risks;
use crate::events::handler::ScenarioEventHandler;
use crate::models::run::RunResult;
use crate::models::scenario::InputParameters;
use crate::strategy::ScenarioStrategy;

/// Risks re-rolled every step; result carries a risk analysis
pub struct RiskAssessmentStrategy;

impl ScenarioStrategy for RiskAssessmentStrategy {
    fn name(&self) -> &'static str {
        "risk_assessment"
    }

    fn build_event_handler(&self, params: &InputParameters) -> ScenarioEventHandler {
        ScenarioEventHandler::new(Vec::new(), params.risks.clone(), Vec::new())
    }

    fn finalize(&self, result: &mut RunResult) {
        result.risk_assessment = Some(analyze_risks(&result.timeline));
    }
}

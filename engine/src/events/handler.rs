//! Scenario event evaluation and application
//!
//! The handler owns the event definitions for one run plus the fired-state
//! bookkeeping for the one-shot families. The driver calls `apply_step` once
//! per step, before the step updater runs; because firing is tracked per
//! event, re-evaluating the same hour bucket can never double-apply a
//! one-shot event.
//!
//! Risk events carry no fired-state on purpose: each risk is an independent
//! Bernoulli trial every step (see `types` module docs).

use thiserror::Error;
use tracing::debug;

use crate::events::types::{
    CapacityAction, CapacityActionKind, ConditionKind, FiredEvent, FiredEventDetail, RiskEvent,
    RiskKind, WhatIfCondition,
};
use crate::models::twin::Twin;
use crate::rng::RngManager;

/// Event application failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// A listed event target is not in the working twin set
    #[error("event target not found: {0}")]
    TargetNotFound(String),
}

/// Evaluates scenario events against the simulation clock and applies their
/// effects to the working twin set
#[derive(Debug, Clone)]
pub struct ScenarioEventHandler {
    conditions: Vec<WhatIfCondition>,
    condition_fired: Vec<bool>,
    risks: Vec<RiskEvent>,
    actions: Vec<CapacityAction>,
    action_fired: Vec<bool>,
}

impl ScenarioEventHandler {
    /// Create a handler for the given event definitions
    ///
    /// Risk probabilities are clamped into 0–100 here so a malformed
    /// definition degrades to never/always rather than failing mid-run.
    pub fn new(
        conditions: Vec<WhatIfCondition>,
        mut risks: Vec<RiskEvent>,
        actions: Vec<CapacityAction>,
    ) -> Self {
        for risk in &mut risks {
            risk.probability = risk.probability.clamp(0.0, 100.0);
        }
        let condition_fired = vec![false; conditions.len()];
        let action_fired = vec![false; actions.len()];
        Self {
            conditions,
            condition_fired,
            risks,
            actions,
            action_fired,
        }
    }

    /// A handler with no events (standard scenarios)
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new(), Vec::new())
    }

    /// Whether any event definitions are configured
    pub fn has_events(&self) -> bool {
        !self.conditions.is_empty() || !self.risks.is_empty() || !self.actions.is_empty()
    }

    /// Every twin identity referenced by an explicit target list
    ///
    /// Used by the driver to validate event targets against the scenario's
    /// twin set before the first step executes.
    pub fn referenced_targets(&self) -> Vec<&str> {
        let condition_targets = self
            .conditions
            .iter()
            .filter_map(|c| c.targets.as_ref())
            .flatten();
        let action_targets = self
            .actions
            .iter()
            .filter_map(|a| a.targets.as_ref())
            .flatten();
        condition_targets
            .chain(action_targets)
            .map(String::as_str)
            .collect()
    }

    /// Evaluate all events for one step and apply matching effects
    ///
    /// `step` is the zero-based step index; the elapsed-hour marker used for
    /// trigger comparison is the hour at which the step begins. Returns one
    /// `FiredEvent` record per (event, affected twin) pair, in definition
    /// order, for the timeline.
    pub fn apply_step(
        &mut self,
        step: usize,
        twins: &mut [Twin],
        rng: &mut RngManager,
    ) -> Result<Vec<FiredEvent>, EventError> {
        let elapsed_hours = step as f64;
        let mut fired = Vec::new();

        // One-shot conditions: first step whose elapsed hour reaches the trigger
        for i in 0..self.conditions.len() {
            if self.condition_fired[i] || elapsed_hours < self.conditions[i].trigger_hour {
                continue;
            }
            self.condition_fired[i] = true;

            let condition = self.conditions[i].clone();
            for idx in resolve_targets(condition.targets.as_deref(), twins)? {
                apply_condition(condition.kind, condition.value, &mut twins[idx]);
                debug!(
                    twin = %twins[idx].id,
                    kind = ?condition.kind,
                    value = condition.value,
                    step,
                    "what-if condition fired"
                );
                fired.push(FiredEvent {
                    step,
                    target: twins[idx].id.clone(),
                    detail: FiredEventDetail::Condition {
                        kind: condition.kind,
                        value: condition.value,
                    },
                });
            }
        }

        // Risks: independent Bernoulli trial per risk, every step. One draw
        // per risk; a firing risk hits every twin in the target set.
        for risk in &self.risks {
            if !rng.chance(risk.probability / 100.0) {
                continue;
            }
            for twin in twins.iter_mut() {
                apply_risk(risk, twin);
                debug!(
                    twin = %twin.id,
                    kind = ?risk.kind,
                    impact = risk.impact,
                    step,
                    "risk event fired"
                );
                fired.push(FiredEvent {
                    step,
                    target: twin.id.clone(),
                    detail: FiredEventDetail::Risk {
                        kind: risk.kind,
                        impact: risk.impact,
                        duration_minutes: risk.duration_minutes,
                    },
                });
            }
        }

        // One-shot capacity actions
        for i in 0..self.actions.len() {
            if self.action_fired[i] || elapsed_hours < self.actions[i].start_hour {
                continue;
            }
            self.action_fired[i] = true;

            let action = self.actions[i].clone();
            for idx in resolve_targets(action.targets.as_deref(), twins)? {
                apply_action(action.kind, action.value, &mut twins[idx]);
                debug!(
                    twin = %twins[idx].id,
                    kind = ?action.kind,
                    value = action.value,
                    step,
                    "capacity action fired"
                );
                fired.push(FiredEvent {
                    step,
                    target: twins[idx].id.clone(),
                    detail: FiredEventDetail::CapacityAction {
                        kind: action.kind,
                        value: action.value,
                    },
                });
            }
        }

        Ok(fired)
    }
}

/// Resolve an optional target list to working-twin indices
///
/// None means "every twin in the target set". A listed identity that is not
/// in the working set is a configuration error; the driver validates targets
/// up front, so hitting this mid-run means the configuration was mutated
/// after validation.
fn resolve_targets(
    targets: Option<&[String]>,
    twins: &[Twin],
) -> Result<Vec<usize>, EventError> {
    match targets {
        None => Ok((0..twins.len()).collect()),
        Some(ids) => {
            let mut indices = Vec::with_capacity(ids.len());
            for id in ids {
                let idx = twins
                    .iter()
                    .position(|t| &t.id == id)
                    .ok_or_else(|| EventError::TargetNotFound(id.clone()))?;
                indices.push(idx);
            }
            Ok(indices)
        }
    }
}

/// Apply a what-if condition's effect to one twin
fn apply_condition(kind: ConditionKind, value: f64, twin: &mut Twin) {
    match kind {
        ConditionKind::EfficiencyChange => {
            twin.configuration.current_efficiency *= value;
            twin.configuration.clamp_invariants();
        }
        ConditionKind::CapacityChange => {
            let capacity = twin
                .configuration
                .production_capacity
                .unwrap_or(crate::stepper::DEFAULT_PRODUCTION_CAPACITY);
            twin.configuration.production_capacity = Some((capacity * value).max(0.0));
        }
        ConditionKind::DowntimeEvent => {
            twin.state.current_downtime += value.max(0.0);
        }
        ConditionKind::ResourceChange => {
            twin.state.energy_consumption += value;
        }
    }
    twin.state.clamp_invariants();
}

/// Apply a risk event's impact to one twin
fn apply_risk(risk: &RiskEvent, twin: &mut Twin) {
    match risk.kind {
        RiskKind::EquipmentFailure | RiskKind::SupplyDelay => {
            twin.state.current_downtime += risk.duration_minutes.max(0.0);
            if risk.kind == RiskKind::EquipmentFailure {
                twin.state.equipment_wear += risk.impact / 1000.0;
            }
        }
        RiskKind::QualityIssue => {
            twin.state.quality_rate -= risk.impact;
        }
        RiskKind::WorkerShortage => {
            twin.state.worker_fatigue += risk.impact / 100.0;
        }
    }
    twin.state.clamp_invariants();
}

/// Apply a capacity action's effect to one twin
fn apply_action(kind: CapacityActionKind, value: f64, twin: &mut Twin) {
    match kind {
        CapacityActionKind::ScaleCapacity => {
            let capacity = twin
                .configuration
                .production_capacity
                .unwrap_or(crate::stepper::DEFAULT_PRODUCTION_CAPACITY);
            twin.configuration.production_capacity = Some((capacity * value).max(0.0));
        }
        CapacityActionKind::ScaleEfficiency => {
            twin.configuration.current_efficiency *= value;
            twin.configuration.clamp_invariants();
        }
        CapacityActionKind::HalveDowntime => {
            twin.state.current_downtime *= 0.5;
        }
    }
    twin.state.clamp_invariants();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::twin::{TwinConfiguration, TwinState, TwinType};

    fn twin(id: &str) -> Twin {
        Twin::new(
            id,
            id,
            TwinType::ProductionLine,
            TwinConfiguration {
                production_capacity: Some(1000.0),
                current_efficiency: 0.8,
                manning_level: None,
                process_category: None,
            },
            TwinState::baseline(0.8),
        )
    }

    #[test]
    fn test_condition_fires_exactly_once() {
        let mut handler = ScenarioEventHandler::new(
            vec![WhatIfCondition {
                trigger_hour: 2.0,
                kind: ConditionKind::DowntimeEvent,
                targets: None,
                value: 30.0,
            }],
            Vec::new(),
            Vec::new(),
        );
        let mut twins = vec![twin("LINE_01")];
        let mut rng = RngManager::new(1);

        // Not due yet at hours 0 and 1
        assert!(handler.apply_step(0, &mut twins, &mut rng).unwrap().is_empty());
        assert!(handler.apply_step(1, &mut twins, &mut rng).unwrap().is_empty());

        // Fires at hour 2, once
        let fired = handler.apply_step(2, &mut twins, &mut rng).unwrap();
        assert_eq!(fired.len(), 1);
        assert_eq!(twins[0].state.current_downtime, 30.0);

        // Never again, even though elapsed hours keep satisfying the trigger
        assert!(handler.apply_step(3, &mut twins, &mut rng).unwrap().is_empty());
        assert_eq!(twins[0].state.current_downtime, 30.0);
    }

    #[test]
    fn test_risk_at_full_probability_fires_every_step() {
        let mut handler = ScenarioEventHandler::new(
            Vec::new(),
            vec![RiskEvent {
                kind: RiskKind::EquipmentFailure,
                probability: 100.0,
                impact: 5.0,
                duration_minutes: 120.0,
            }],
            Vec::new(),
        );
        let mut twins = vec![twin("LINE_01")];
        let mut rng = RngManager::new(1);

        for step in 0..3 {
            let fired = handler.apply_step(step, &mut twins, &mut rng).unwrap();
            assert_eq!(fired.len(), 1, "risk must fire at step {}", step);
        }
        assert_eq!(twins[0].state.current_downtime, 360.0);
    }

    #[test]
    fn test_risk_at_zero_probability_never_fires() {
        let mut handler = ScenarioEventHandler::new(
            Vec::new(),
            vec![RiskEvent {
                kind: RiskKind::QualityIssue,
                probability: 0.0,
                impact: 10.0,
                duration_minutes: 0.0,
            }],
            Vec::new(),
        );
        let mut twins = vec![twin("LINE_01")];
        let mut rng = RngManager::new(1);

        for step in 0..50 {
            assert!(handler.apply_step(step, &mut twins, &mut rng).unwrap().is_empty());
        }
    }

    #[test]
    fn test_halve_downtime_action() {
        let mut handler = ScenarioEventHandler::new(
            Vec::new(),
            Vec::new(),
            vec![CapacityAction {
                start_hour: 0.0,
                kind: CapacityActionKind::HalveDowntime,
                value: 1.0,
                targets: None,
            }],
        );
        let mut twins = vec![twin("LINE_01")];
        twins[0].state.current_downtime = 100.0;
        let mut rng = RngManager::new(1);

        let fired = handler.apply_step(0, &mut twins, &mut rng).unwrap();
        assert_eq!(fired.len(), 1);
        assert_eq!(twins[0].state.current_downtime, 50.0);
    }

    #[test]
    fn test_targeted_condition_only_hits_listed_twin() {
        let mut handler = ScenarioEventHandler::new(
            vec![WhatIfCondition {
                trigger_hour: 0.0,
                kind: ConditionKind::CapacityChange,
                targets: Some(vec!["LINE_02".to_string()]),
                value: 0.5,
            }],
            Vec::new(),
            Vec::new(),
        );
        let mut twins = vec![twin("LINE_01"), twin("LINE_02")];
        let mut rng = RngManager::new(1);

        let fired = handler.apply_step(0, &mut twins, &mut rng).unwrap();
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].target, "LINE_02");
        assert_eq!(twins[0].configuration.production_capacity, Some(1000.0));
        assert_eq!(twins[1].configuration.production_capacity, Some(500.0));
    }

    #[test]
    fn test_unknown_target_is_an_error() {
        let mut handler = ScenarioEventHandler::new(
            vec![WhatIfCondition {
                trigger_hour: 0.0,
                kind: ConditionKind::EfficiencyChange,
                targets: Some(vec!["MISSING".to_string()]),
                value: 1.1,
            }],
            Vec::new(),
            Vec::new(),
        );
        let mut twins = vec![twin("LINE_01")];
        let mut rng = RngManager::new(1);

        let err = handler.apply_step(0, &mut twins, &mut rng).unwrap_err();
        assert_eq!(err, EventError::TargetNotFound("MISSING".to_string()));
    }
}

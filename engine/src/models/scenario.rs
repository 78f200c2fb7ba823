//! Scenario definitions and input parameters
//!
//! A scenario is a named simulation intent bound to one or more twins. The
//! caller provides a scenario record plus an optional run-time parameter
//! override; the engine merges the override over the scenario's own
//! parameters before the run starts and treats the merged value as immutable
//! for the duration of the run.
//!
//! Parameters are a tagged struct with explicit optional fields per scenario
//! type rather than an open-ended dictionary, so misuse is caught at compile
//! time. A free-form `extra` map remains as an escape hatch for genuinely
//! scenario-specific extensions; the engine itself never reads it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::events::types::{CapacityAction, RiskEvent, WhatIfCondition};

/// Kind of simulation a scenario requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioType {
    /// Plain timeline simulation, no event injection
    Standard,
    /// Conditions fire at configured hours
    WhatIf,
    /// GA parameter search, then a standard re-run with the best parameters
    Optimization,
    /// Bernoulli risk draws every step
    RiskAssessment,
    /// Capacity actions fire at configured hours
    CapacityPlanning,
}

/// Goals the genetic algorithm optimizes for
///
/// Any subset may be active. An empty set is rejected by the optimizer
/// before any search work happens (fitness would be identically zero and
/// the "best" individual arbitrary).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationGoals {
    #[serde(default)]
    pub maximize_efficiency: bool,
    #[serde(default)]
    pub maximize_capacity: bool,
    #[serde(default)]
    pub maximize_quality: bool,
    #[serde(default)]
    pub optimize_resources: bool,
}

impl OptimizationGoals {
    /// True when no goal is active
    pub fn is_empty(&self) -> bool {
        !(self.maximize_efficiency
            || self.maximize_capacity
            || self.maximize_quality
            || self.optimize_resources)
    }
}

/// Typed scenario input parameters
///
/// Fields are grouped by the scenario type that consumes them; unrelated
/// fields are simply ignored by the other strategies. All fields are
/// optional so partial overrides merge cleanly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputParameters {
    /// Multiplier applied to every twin's baseline efficiency
    #[serde(default)]
    pub efficiency_modifier: Option<f64>,

    /// Multiplier applied to every twin's production capacity
    #[serde(default)]
    pub capacity_modifier: Option<f64>,

    /// What-if conditions (consumed by `ScenarioType::WhatIf`)
    #[serde(default)]
    pub conditions: Vec<WhatIfCondition>,

    /// Risk events (consumed by `ScenarioType::RiskAssessment`)
    #[serde(default)]
    pub risks: Vec<RiskEvent>,

    /// Capacity actions (consumed by `ScenarioType::CapacityPlanning`)
    #[serde(default)]
    pub capacity_actions: Vec<CapacityAction>,

    /// Goals for `ScenarioType::Optimization`
    #[serde(default)]
    pub optimization_goals: OptimizationGoals,

    /// GA population size override (default 50)
    #[serde(default)]
    pub population_size: Option<usize>,

    /// GA generation count override (default 100)
    #[serde(default)]
    pub generations: Option<usize>,

    /// GA per-gene mutation probability override (default 0.1)
    #[serde(default)]
    pub mutation_rate: Option<f64>,

    /// Escape hatch for scenario-specific extensions; opaque to the engine
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl InputParameters {
    /// Merge run-time overrides over these parameters
    ///
    /// Override semantics are field-wise: a `Some` scalar wins, a non-empty
    /// event list replaces the base list wholesale, a non-empty goal set
    /// replaces the base goals, and `extra` keys are overlaid.
    ///
    /// # Example
    /// ```
    /// use twin_simulator_core_rs::models::InputParameters;
    ///
    /// let base = InputParameters {
    ///     efficiency_modifier: Some(0.9),
    ///     capacity_modifier: Some(1.1),
    ///     ..Default::default()
    /// };
    /// let overrides = InputParameters {
    ///     efficiency_modifier: Some(1.0),
    ///     ..Default::default()
    /// };
    ///
    /// let merged = base.merged_with(&overrides);
    /// assert_eq!(merged.efficiency_modifier, Some(1.0));
    /// assert_eq!(merged.capacity_modifier, Some(1.1));
    /// ```
    pub fn merged_with(&self, overrides: &InputParameters) -> InputParameters {
        let mut extra = self.extra.clone();
        for (key, value) in &overrides.extra {
            extra.insert(key.clone(), value.clone());
        }

        InputParameters {
            efficiency_modifier: overrides.efficiency_modifier.or(self.efficiency_modifier),
            capacity_modifier: overrides.capacity_modifier.or(self.capacity_modifier),
            conditions: if overrides.conditions.is_empty() {
                self.conditions.clone()
            } else {
                overrides.conditions.clone()
            },
            risks: if overrides.risks.is_empty() {
                self.risks.clone()
            } else {
                overrides.risks.clone()
            },
            capacity_actions: if overrides.capacity_actions.is_empty() {
                self.capacity_actions.clone()
            } else {
                overrides.capacity_actions.clone()
            },
            optimization_goals: if overrides.optimization_goals.is_empty() {
                self.optimization_goals
            } else {
                overrides.optimization_goals
            },
            population_size: overrides.population_size.or(self.population_size),
            generations: overrides.generations.or(self.generations),
            mutation_rate: overrides.mutation_rate.or(self.mutation_rate),
            extra,
        }
    }
}

/// A named simulation intent bound to a set of target twins
///
/// Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Caller-assigned identity
    pub id: String,

    /// Display name
    pub name: String,

    /// Which strategy drives the run
    pub scenario_type: ScenarioType,

    /// Identities of the twins this scenario simulates
    pub target_twins: Vec<String>,

    /// Scenario-level input parameters (merged under run-time overrides)
    #[serde(default)]
    pub input_parameters: InputParameters,

    /// Simulated horizon in hours (one step per hour)
    pub duration_hours: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::types::{ConditionKind, WhatIfCondition};

    #[test]
    fn test_empty_goals_detection() {
        assert!(OptimizationGoals::default().is_empty());
        let goals = OptimizationGoals {
            maximize_quality: true,
            ..Default::default()
        };
        assert!(!goals.is_empty());
    }

    #[test]
    fn test_merge_keeps_base_event_list_when_override_empty() {
        let base = InputParameters {
            conditions: vec![WhatIfCondition {
                trigger_hour: 2.0,
                kind: ConditionKind::EfficiencyChange,
                targets: None,
                value: 1.1,
            }],
            ..Default::default()
        };

        let merged = base.merged_with(&InputParameters::default());
        assert_eq!(merged.conditions.len(), 1);
    }

    #[test]
    fn test_merge_overlays_extra_keys() {
        let mut base = InputParameters::default();
        base.extra.insert("shift_pattern".into(), serde_json::json!("2x8"));
        base.extra.insert("site".into(), serde_json::json!("north"));

        let mut overrides = InputParameters::default();
        overrides.extra.insert("site".into(), serde_json::json!("south"));

        let merged = base.merged_with(&overrides);
        assert_eq!(merged.extra["shift_pattern"], serde_json::json!("2x8"));
        assert_eq!(merged.extra["site"], serde_json::json!("south"));
    }
}

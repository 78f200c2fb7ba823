//! Scenario event types
//!
//! Three event families, each with its own trigger semantics:
//!
//! - **What-if conditions** fire exactly once, at the first step whose
//!   elapsed hour reaches `trigger_hour`.
//! - **Risk events** are independent Bernoulli trials: every configured risk
//!   is re-rolled every step. There is no cooldown, so a catastrophic risk
//!   CAN fire on consecutive steps and compound downtime.
//! - **Capacity actions** fire exactly once, at the first step whose elapsed
//!   hour reaches `start_hour`.
//!
//! All definitions are self-contained and serde-round-trippable, and every
//! firing is recorded in the timeline for replay identity.

use serde::{Deserialize, Serialize};

/// What a what-if condition perturbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    /// Multiply baseline configuration efficiency (clamped to [0.1, 1.0])
    EfficiencyChange,
    /// Multiply configuration production capacity
    CapacityChange,
    /// Add `value` minutes of downtime to current state
    DowntimeEvent,
    /// Add `value` kWh to the twin's energy draw
    ResourceChange,
}

/// A one-shot what-if perturbation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhatIfCondition {
    /// Simulated hour offset at which the condition fires
    pub trigger_hour: f64,

    /// What is perturbed and how `value` is interpreted
    pub kind: ConditionKind,

    /// Twin identities to affect; None → every twin in the target set
    #[serde(default)]
    pub targets: Option<Vec<String>>,

    /// Multiplier (efficiency/capacity) or additive amount (downtime/energy)
    pub value: f64,
}

/// Kind of stochastic risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskKind {
    EquipmentFailure,
    QualityIssue,
    WorkerShortage,
    SupplyDelay,
}

/// A per-step Bernoulli risk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskEvent {
    /// What happens when the risk materializes
    pub kind: RiskKind,

    /// Percent chance per step, 0–100 (values outside are clamped)
    pub probability: f64,

    /// Severity weight; feeds the risk score and state impact
    pub impact: f64,

    /// Downtime added when a downtime-type risk fires (minutes)
    #[serde(default)]
    pub duration_minutes: f64,
}

/// What a capacity action does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityActionKind {
    /// Multiply configuration production capacity by `value`
    ScaleCapacity,
    /// Multiply baseline configuration efficiency by `value` (clamped)
    ScaleEfficiency,
    /// Halve current downtime (`value` ignored)
    HalveDowntime,
}

/// A one-shot capacity-planning action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityAction {
    /// Simulated hour offset at which the action fires
    pub start_hour: f64,

    /// What the action does
    pub kind: CapacityActionKind,

    /// Multiplier for the scale variants; ignored by `HalveDowntime`
    #[serde(default = "default_action_value")]
    pub value: f64,

    /// Twin identities to affect; None → every twin in the target set
    #[serde(default)]
    pub targets: Option<Vec<String>>,
}

fn default_action_value() -> f64 {
    1.0
}

/// Record of one event firing against one twin
///
/// The handler expands events that target "all twins" into one record per
/// affected twin, so `target` is always a concrete identity in timelines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiredEvent {
    /// Step index at which the event fired
    pub step: usize,

    /// Twin the effect was applied to
    pub target: String,

    /// What fired
    pub detail: FiredEventDetail,
}

/// Discriminated payload of a fired event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FiredEventDetail {
    Condition {
        kind: ConditionKind,
        value: f64,
    },
    Risk {
        kind: RiskKind,
        impact: f64,
        duration_minutes: f64,
    },
    CapacityAction {
        kind: CapacityActionKind,
        value: f64,
    },
}

impl FiredEvent {
    /// Whether this firing is a risk event (timelines report risks in a
    /// separate list from deterministic events)
    pub fn is_risk(&self) -> bool {
        matches!(self.detail, FiredEventDetail::Risk { .. })
    }

    /// Whether this firing already adjusted the twin's downtime this step
    ///
    /// The step updater skips its own downtime stage for such twins so an
    /// injected outage is neither double-counted nor partially recovered
    /// within the hour it was injected.
    pub fn touches_downtime(&self) -> bool {
        match &self.detail {
            FiredEventDetail::Condition { kind, .. } => *kind == ConditionKind::DowntimeEvent,
            FiredEventDetail::Risk { kind, .. } => {
                matches!(kind, RiskKind::EquipmentFailure | RiskKind::SupplyDelay)
            }
            FiredEventDetail::CapacityAction { kind, .. } => {
                *kind == CapacityActionKind::HalveDowntime
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kinds_serialize_snake_case() {
        let json = serde_json::to_string(&RiskKind::EquipmentFailure).unwrap();
        assert_eq!(json, "\"equipment_failure\"");

        let json = serde_json::to_string(&CapacityActionKind::HalveDowntime).unwrap();
        assert_eq!(json, "\"halve_downtime\"");
    }

    #[test]
    fn test_fired_event_classification() {
        let risk = FiredEvent {
            step: 3,
            target: "LINE_01".to_string(),
            detail: FiredEventDetail::Risk {
                kind: RiskKind::EquipmentFailure,
                impact: 5.0,
                duration_minutes: 120.0,
            },
        };
        assert!(risk.is_risk());
        assert!(risk.touches_downtime());

        let condition = FiredEvent {
            step: 3,
            target: "LINE_01".to_string(),
            detail: FiredEventDetail::Condition {
                kind: ConditionKind::EfficiencyChange,
                value: 1.1,
            },
        };
        assert!(!condition.is_risk());
        assert!(!condition.touches_downtime());
    }

    #[test]
    fn test_condition_roundtrip() {
        let condition = WhatIfCondition {
            trigger_hour: 4.0,
            kind: ConditionKind::CapacityChange,
            targets: Some(vec!["CELL_07".to_string()]),
            value: 0.8,
        };
        let json = serde_json::to_string(&condition).unwrap();
        let back: WhatIfCondition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, condition);
    }
}

//! Scenario event model
//!
//! Typed perturbations injected into a run: what-if conditions, risk events,
//! and capacity actions. Event definitions live in `types`; trigger
//! evaluation and state application live in `handler`.

pub mod handler;
pub mod types;

pub use handler::{EventError, ScenarioEventHandler};
pub use types::{
    CapacityAction, CapacityActionKind, ConditionKind, FiredEvent, FiredEventDetail, RiskEvent,
    RiskKind, WhatIfCondition,
};

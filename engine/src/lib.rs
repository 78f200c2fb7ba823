//! Digital Twin Simulator Core - Rust Engine
//!
//! Discrete-time state simulator for virtual production-line twins with
//! deterministic execution.
//!
//! # Architecture
//!
//! - **core**: Time management (one-hour discrete steps)
//! - **models**: Domain types (Twin, Scenario, RunResult)
//! - **events**: Scenario event injection (conditions, risks, actions)
//! - **stepper**: Per-twin state update pipeline
//! - **strategy**: Per-scenario-type behavior (standard, what-if, risk, capacity)
//! - **optimizer**: Genetic-algorithm parameter search
//! - **orchestrator**: Main simulation loop and run assembly
//! - **analytics**: Timeline reduction (summary, risk score, capacity analysis)
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. All randomness is deterministic (seeded RNG, explicitly threaded)
//! 2. Twin state invariants are re-clamped after every mutation
//! 3. Runs work on cloned twins; caller records are never mutated

// Module declarations
pub mod analytics;
pub mod core;
pub mod events;
pub mod models;
pub mod optimizer;
pub mod orchestrator;
pub mod rng;
pub mod stepper;
pub mod strategy;

// Re-exports for convenience
pub use analytics::{analyze_capacity, analyze_risks, summarize, CapacityAnalysis, RiskAnalysis};
pub use core::clock::{SimulationClock, STEP_SECONDS};
pub use events::{
    CapacityAction, CapacityActionKind, ConditionKind, EventError, FiredEvent, FiredEventDetail,
    RiskEvent, RiskKind, ScenarioEventHandler, WhatIfCondition,
};
pub use models::{
    run::{RunResult, RunStatus, RunSummary, TimeStep, TwinSnapshot},
    scenario::{InputParameters, OptimizationGoals, Scenario, ScenarioType},
    twin::{Twin, TwinConfiguration, TwinMetrics, TwinState, TwinType},
};
pub use optimizer::{optimize, GaConfig, OptimizationOutcome, OptimizerError};
pub use orchestrator::{run_scenario, SimulationDriver, SimulationError};
pub use rng::RngManager;
pub use stepper::{advance_twin, StepOverrides};
pub use strategy::{strategy_for, ScenarioStrategy};

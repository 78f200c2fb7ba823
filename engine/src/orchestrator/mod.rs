//! Simulation driver and run orchestration

pub mod engine;

pub use engine::{run_scenario, SimulationDriver, SimulationError, MAX_DURATION_HOURS};

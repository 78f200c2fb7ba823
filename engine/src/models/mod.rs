//! Domain types for the digital twin simulation engine

pub mod run;
pub mod scenario;
pub mod twin;

pub use run::{RunResult, RunStatus, RunSummary, TimeStep, TwinSnapshot};
pub use scenario::{InputParameters, OptimizationGoals, Scenario, ScenarioType};
pub use twin::{Twin, TwinConfiguration, TwinMetrics, TwinState, TwinType};

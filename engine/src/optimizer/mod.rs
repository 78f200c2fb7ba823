//! Genetic-algorithm parameter optimizer

pub mod ga;

pub use ga::{
    optimize, GaConfig, GenerationStats, Individual, OptimizationOutcome, OptimizerError,
};

//! Genetic algorithm over simulation input parameters
//!
//! Searches the four-dimensional modifier space (efficiency, capacity,
//! quality target, resource optimization) for the vector maximizing a
//! fitness function derived from the scenario's optimization goals. Fitness
//! is evaluated directly from the parameter vector, not by running a full
//! timeline per candidate, which keeps the search cheap; the winning vector
//! is then fed into one real simulation run by the orchestrator.
//!
//! The per-generation transformation is a pipeline of pure stages, each
//! producing a new generation rather than mutating in place:
//! `evaluate → select (elitism + tournament) → crossover → mutate`.
//!
//! # Determinism
//!
//! All sampling goes through the injected `RngManager`; the same seed, goals
//! and config reproduce the same best individual.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::scenario::{InputParameters, OptimizationGoals};
use crate::rng::RngManager;

/// Gene bounds applied after mutation
const GENE_MIN: f64 = 0.1;
const GENE_MAX: f64 = 2.0;

/// Relative size of a mutation nudge (`± 10%`)
const MUTATION_SPAN: f64 = 0.10;

/// Generations between progress reports
const REPORT_INTERVAL: usize = 10;

/// Optimizer failure modes
///
/// Both are degenerate-input conditions caught before any search work: an
/// empty goal set would make fitness identically zero and the "best"
/// individual arbitrary, so it is rejected rather than silently returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptimizerError {
    #[error("optimization_goals is empty; at least one goal must be active")]
    NoGoals,

    #[error("population size must be > 0")]
    EmptyPopulation,
}

/// GA tuning parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaConfig {
    /// Individuals per generation
    pub population_size: usize,

    /// Fixed generation count (termination is not convergence-based)
    pub generations: usize,

    /// Per-gene mutation probability
    pub mutation_rate: f64,

    /// Fraction of the population copied unchanged each generation
    pub elitism_fraction: f64,

    /// Tournament group size for parent selection
    pub tournament_size: usize,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 100,
            mutation_rate: 0.1,
            elitism_fraction: 0.1,
            tournament_size: 3,
        }
    }
}

impl GaConfig {
    /// Build a config from scenario parameters, falling back to defaults
    pub fn from_params(params: &InputParameters) -> Self {
        let defaults = Self::default();
        Self {
            population_size: params.population_size.unwrap_or(defaults.population_size),
            generations: params.generations.unwrap_or(defaults.generations),
            mutation_rate: params.mutation_rate.unwrap_or(defaults.mutation_rate),
            ..defaults
        }
    }

    /// Elite count: top 10% of the population, minimum 2, capped at the
    /// population size
    fn elite_count(&self) -> usize {
        let fraction = (self.population_size as f64 * self.elitism_fraction).floor() as usize;
        fraction.max(2).min(self.population_size)
    }
}

/// One candidate parameter vector plus its fitness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    pub efficiency_modifier: f64,
    pub capacity_modifier: f64,
    pub quality_target: f64,
    pub resource_optimization: f64,
    pub fitness: f64,
}

impl Individual {
    /// Uniformly sample a fresh individual from the initial gene ranges
    fn sample(rng: &mut RngManager) -> Self {
        Self {
            efficiency_modifier: rng.range_f64(0.8, 1.0),
            capacity_modifier: rng.range_f64(0.9, 1.0),
            quality_target: rng.range_f64(0.95, 1.0),
            resource_optimization: rng.range_f64(0.0, 1.0),
            fitness: 0.0,
        }
    }
}

/// Best/average fitness at one reported generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub best_fitness: f64,
    pub average_fitness: f64,
}

/// Result of one optimization search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationOutcome {
    /// Best-ever individual (ties keep the earlier one)
    pub best: Individual,

    /// Generations executed
    pub generations: usize,

    /// Population size used
    pub population_size: usize,

    /// Stats for generation 0, every 10th generation, and the last
    pub history: Vec<GenerationStats>,
}

/// Weighted-sum fitness over the active goals
///
/// Inactive goals contribute 0. Weights follow the reference model:
/// efficiency 100×, capacity 50×, quality 500×(target − 0.95), resources 30×.
fn fitness(goals: &OptimizationGoals, individual: &Individual) -> f64 {
    let mut score = 0.0;
    if goals.maximize_efficiency {
        score += 100.0 * individual.efficiency_modifier;
    }
    if goals.maximize_capacity {
        score += 50.0 * individual.capacity_modifier;
    }
    if goals.maximize_quality {
        score += 500.0 * (individual.quality_target - 0.95);
    }
    if goals.optimize_resources {
        score += 30.0 * individual.resource_optimization;
    }
    score
}

/// Evaluate fitness for a whole generation
fn evaluate(goals: &OptimizationGoals, population: &mut [Individual]) {
    for individual in population.iter_mut() {
        individual.fitness = fitness(goals, individual);
    }
}

/// Index of the fittest individual; ties keep the earlier one
fn fittest_index(population: &[Individual]) -> usize {
    let mut best = 0;
    for (i, individual) in population.iter().enumerate().skip(1) {
        if individual.fitness > population[best].fitness {
            best = i;
        }
    }
    best
}

/// Tournament selection: draw `tournament_size` individuals, keep the fittest
fn tournament_select<'a>(
    population: &'a [Individual],
    tournament_size: usize,
    rng: &mut RngManager,
) -> &'a Individual {
    let mut winner = &population[rng.index(population.len())];
    for _ in 1..tournament_size {
        let challenger = &population[rng.index(population.len())];
        if challenger.fitness > winner.fitness {
            winner = challenger;
        }
    }
    winner
}

/// Uniform gene-wise crossover: each gene inherited from either parent 50/50
fn crossover(a: &Individual, b: &Individual, rng: &mut RngManager) -> Individual {
    Individual {
        efficiency_modifier: if rng.chance(0.5) {
            a.efficiency_modifier
        } else {
            b.efficiency_modifier
        },
        capacity_modifier: if rng.chance(0.5) {
            a.capacity_modifier
        } else {
            b.capacity_modifier
        },
        quality_target: if rng.chance(0.5) {
            a.quality_target
        } else {
            b.quality_target
        },
        resource_optimization: if rng.chance(0.5) {
            a.resource_optimization
        } else {
            b.resource_optimization
        },
        fitness: 0.0,
    }
}

/// Nudge one gene by `± 10%` with probability `mutation_rate`, then clamp
fn mutate_gene(value: &mut f64, mutation_rate: f64, rng: &mut RngManager) {
    if rng.chance(mutation_rate) {
        *value = (*value * (1.0 + rng.range_f64(-MUTATION_SPAN, MUTATION_SPAN)))
            .clamp(GENE_MIN, GENE_MAX);
    }
}

/// Per-gene mutation pass
fn mutate(individual: &mut Individual, mutation_rate: f64, rng: &mut RngManager) {
    mutate_gene(&mut individual.efficiency_modifier, mutation_rate, rng);
    mutate_gene(&mut individual.capacity_modifier, mutation_rate, rng);
    mutate_gene(&mut individual.quality_target, mutation_rate, rng);
    mutate_gene(&mut individual.resource_optimization, mutation_rate, rng);
}

/// Produce the next generation from an evaluated one
///
/// Elites (already-evaluated fitness sorted descending with a stable sort,
/// so ties keep the earlier individual) are copied unchanged; the remainder
/// is filled by tournament selection, uniform crossover, and mutation.
fn next_generation(
    current: &[Individual],
    config: &GaConfig,
    rng: &mut RngManager,
) -> Vec<Individual> {
    let mut ranked: Vec<&Individual> = current.iter().collect();
    ranked.sort_by(|a, b| b.fitness.partial_cmp(&a.fitness).unwrap_or(std::cmp::Ordering::Equal));

    let mut next: Vec<Individual> = ranked
        .iter()
        .take(config.elite_count())
        .map(|elite| (*elite).clone())
        .collect();

    while next.len() < config.population_size {
        let parent_a = tournament_select(current, config.tournament_size, rng).clone();
        let parent_b = tournament_select(current, config.tournament_size, rng).clone();
        let mut child = crossover(&parent_a, &parent_b, rng);
        mutate(&mut child, config.mutation_rate, rng);
        next.push(child);
    }

    next
}

/// Run the full GA search
///
/// Terminates after the configured generation count. Progress is recorded
/// for generation 0, every 10th generation, and the final generation.
///
/// # Errors
///
/// * `OptimizerError::NoGoals` when no optimization goal is active
/// * `OptimizerError::EmptyPopulation` when `population_size == 0`
pub fn optimize(
    goals: &OptimizationGoals,
    config: &GaConfig,
    rng: &mut RngManager,
) -> Result<OptimizationOutcome, OptimizerError> {
    if goals.is_empty() {
        return Err(OptimizerError::NoGoals);
    }
    if config.population_size == 0 {
        return Err(OptimizerError::EmptyPopulation);
    }

    let mut population: Vec<Individual> = (0..config.population_size)
        .map(|_| Individual::sample(rng))
        .collect();
    evaluate(goals, &mut population);

    let mut best = population[fittest_index(&population)].clone();
    let mut history = Vec::new();

    let mut record = |generation: usize, population: &[Individual], best: &Individual| {
        let average = population.iter().map(|i| i.fitness).sum::<f64>()
            / population.len() as f64;
        debug!(
            generation,
            best_fitness = best.fitness,
            average_fitness = average,
            "ga generation evaluated"
        );
        history.push(GenerationStats {
            generation,
            best_fitness: best.fitness,
            average_fitness: average,
        });
    };

    record(0, &population, &best);

    for generation in 1..config.generations {
        population = next_generation(&population, config, rng);
        evaluate(goals, &mut population);

        let candidate = &population[fittest_index(&population)];
        // Strictly greater: a tie keeps the earlier best
        if candidate.fitness > best.fitness {
            best = candidate.clone();
        }

        if generation % REPORT_INTERVAL == 0 || generation == config.generations - 1 {
            record(generation, &population, &best);
        }
    }

    Ok(OptimizationOutcome {
        best,
        generations: config.generations,
        population_size: config.population_size,
        history,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn efficiency_goal() -> OptimizationGoals {
        OptimizationGoals {
            maximize_efficiency: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_fitness_weights() {
        let individual = Individual {
            efficiency_modifier: 0.9,
            capacity_modifier: 0.95,
            quality_target: 0.97,
            resource_optimization: 0.5,
            fitness: 0.0,
        };

        let all_goals = OptimizationGoals {
            maximize_efficiency: true,
            maximize_capacity: true,
            maximize_quality: true,
            optimize_resources: true,
        };
        let expected = 100.0 * 0.9 + 50.0 * 0.95 + 500.0 * (0.97 - 0.95) + 30.0 * 0.5;
        assert!((fitness(&all_goals, &individual) - expected).abs() < 1e-9);

        // Inactive goals contribute nothing
        assert!((fitness(&efficiency_goal(), &individual) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_goals_rejected() {
        let mut rng = RngManager::new(1);
        let err = optimize(&OptimizationGoals::default(), &GaConfig::default(), &mut rng)
            .unwrap_err();
        assert_eq!(err, OptimizerError::NoGoals);
    }

    #[test]
    fn test_zero_population_rejected() {
        let mut rng = RngManager::new(1);
        let config = GaConfig {
            population_size: 0,
            ..Default::default()
        };
        let err = optimize(&efficiency_goal(), &config, &mut rng).unwrap_err();
        assert_eq!(err, OptimizerError::EmptyPopulation);
    }

    #[test]
    fn test_elite_count_minimum_two() {
        let config = GaConfig {
            population_size: 10,
            ..Default::default()
        };
        assert_eq!(config.elite_count(), 2);

        let config = GaConfig {
            population_size: 50,
            ..Default::default()
        };
        assert_eq!(config.elite_count(), 5);
    }

    #[test]
    fn test_crossover_genes_come_from_parents() {
        let a = Individual {
            efficiency_modifier: 0.8,
            capacity_modifier: 0.9,
            quality_target: 0.95,
            resource_optimization: 0.0,
            fitness: 0.0,
        };
        let b = Individual {
            efficiency_modifier: 1.0,
            capacity_modifier: 1.0,
            quality_target: 1.0,
            resource_optimization: 1.0,
            fitness: 0.0,
        };

        let mut rng = RngManager::new(77);
        for _ in 0..50 {
            let child = crossover(&a, &b, &mut rng);
            assert!(
                child.efficiency_modifier == a.efficiency_modifier
                    || child.efficiency_modifier == b.efficiency_modifier
            );
            assert!(
                child.resource_optimization == a.resource_optimization
                    || child.resource_optimization == b.resource_optimization
            );
        }
    }

    #[test]
    fn test_mutation_respects_gene_bounds() {
        let mut rng = RngManager::new(5);
        for _ in 0..1000 {
            let mut value = 1.95;
            mutate_gene(&mut value, 1.0, &mut rng);
            assert!((GENE_MIN..=GENE_MAX).contains(&value));

            let mut value = 0.11;
            mutate_gene(&mut value, 1.0, &mut rng);
            assert!((GENE_MIN..=GENE_MAX).contains(&value));
        }
    }

    #[test]
    fn test_history_best_is_non_decreasing() {
        let mut rng = RngManager::new(314);
        let outcome = optimize(&efficiency_goal(), &GaConfig::default(), &mut rng).unwrap();

        let mut previous = f64::MIN;
        for stats in &outcome.history {
            assert!(
                stats.best_fitness >= previous,
                "best fitness regressed at generation {}",
                stats.generation
            );
            previous = stats.best_fitness;
        }
    }

    #[test]
    fn test_history_reported_every_tenth_generation() {
        let mut rng = RngManager::new(314);
        let outcome = optimize(&efficiency_goal(), &GaConfig::default(), &mut rng).unwrap();

        let generations: Vec<usize> = outcome.history.iter().map(|s| s.generation).collect();
        assert!(generations.contains(&0));
        assert!(generations.contains(&10));
        assert!(generations.contains(&90));
        assert!(generations.contains(&99));
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let mut rng1 = RngManager::new(2024);
        let mut rng2 = RngManager::new(2024);
        let outcome1 = optimize(&efficiency_goal(), &GaConfig::default(), &mut rng1).unwrap();
        let outcome2 = optimize(&efficiency_goal(), &GaConfig::default(), &mut rng2).unwrap();
        assert_eq!(outcome1, outcome2);
    }
}

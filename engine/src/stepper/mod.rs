//! Step updater: advances one twin by one simulated hour
//!
//! The update is a fixed nine-stage pipeline (see `advance_twin`). Inputs are
//! defensively defaulted: a missing production capacity falls back to
//! `DEFAULT_PRODUCTION_CAPACITY` and the updater never returns an error.
//!
//! The baseline efficiency used for output comes from the twin's
//! *configuration* (optionally scaled by a run-level modifier); the *state*
//! efficiency is a separate live reading that drifts under a small random
//! walk and feeds the run summary, not the output computation.

use serde::{Deserialize, Serialize};

use crate::models::twin::{TwinConfiguration, TwinMetrics, TwinState};
use crate::rng::RngManager;

/// Capacity substituted when a twin's configuration omits it (units/day)
pub const DEFAULT_PRODUCTION_CAPACITY: f64 = 1000.0;

/// Reference shift length used to convert daily capacity to an hourly rate
pub const HOURS_PER_SHIFT: f64 = 8.0;

/// Mean signed efficiency drift per step (gradual process decay)
const EFFICIENCY_DRIFT_MEAN: f64 = -0.001;

/// Half-width of the efficiency drift noise band
const EFFICIENCY_DRIFT_NOISE: f64 = 0.005;

/// Equipment wear added every step (monotone; resets only via external
/// calibration, outside engine scope)
const WEAR_PER_STEP: f64 = 0.0005;

/// Downtime recovered per uneventful step (minutes)
const DOWNTIME_RECOVERY_PER_STEP: f64 = 5.0;

/// Run-level parameter overrides consumed by the step updater
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StepOverrides {
    /// Multiplier on baseline configuration efficiency
    pub efficiency_modifier: Option<f64>,

    /// Multiplier on configuration production capacity
    pub capacity_modifier: Option<f64>,
}

/// Advance one twin's state by one simulated hour
///
/// Stages, in order:
/// 1. Effective efficiency = baseline × optional efficiency modifier
/// 2. Effective capacity = configured capacity × optional capacity modifier
/// 3. Output rate = `(capacity / 8) × efficiency × U(0.95, 1.05)`; the
///    uniform factor models shift-level variance around nominal throughput
/// 4. Cumulative output accumulates (never resets mid-run)
/// 5. State efficiency drifts by a mean −0.001 random walk, clamped [0.1, 1]
/// 6. Downtime: with probability `equipment_wear × 1%` a stochastic failure
///    adds 10–60 minutes; otherwise downtime recovers 5 minutes, floored at
///    0. Skipped entirely when a scenario event already adjusted downtime
///    this step (`downtime_adjusted`), so injected outages are not partially
///    recovered within the hour they occur.
/// 7. Equipment wear increases by a fixed increment, capped at 1
/// 8. Worker fatigue rises in the end-of-shift phase (`step % 8 > 6`), else
///    falls; clamped [0, 1]
/// 9. Derived metrics: quality rate `min(99, 95 + 4×eff − 10×fatigue)` and
///    resource utilization `min(100, output_rate / hourly_capacity × 100)`
///
/// # Example
/// ```
/// use twin_simulator_core_rs::models::{TwinConfiguration, TwinState};
/// use twin_simulator_core_rs::stepper::{advance_twin, StepOverrides};
/// use twin_simulator_core_rs::RngManager;
///
/// let config = TwinConfiguration {
///     production_capacity: Some(1000.0),
///     current_efficiency: 0.8,
///     manning_level: None,
///     process_category: None,
/// };
/// let mut state = TwinState::baseline(0.8);
/// let mut rng = RngManager::new(42);
///
/// let metrics = advance_twin(&config, &mut state, &StepOverrides::default(), 0, false, &mut rng);
/// // (1000 / 8) × 0.8 × [0.95, 1.05) = [95, 105)
/// assert!(metrics.output_rate >= 95.0 && metrics.output_rate < 105.0);
/// assert_eq!(state.current_output, metrics.output_rate);
/// ```
pub fn advance_twin(
    config: &TwinConfiguration,
    state: &mut TwinState,
    overrides: &StepOverrides,
    step: usize,
    downtime_adjusted: bool,
    rng: &mut RngManager,
) -> TwinMetrics {
    // Stages 1-2: effective efficiency and capacity
    let efficiency = config.current_efficiency * overrides.efficiency_modifier.unwrap_or(1.0);
    let capacity =
        config.production_capacity.unwrap_or(DEFAULT_PRODUCTION_CAPACITY)
            * overrides.capacity_modifier.unwrap_or(1.0);
    let hourly_capacity = capacity / HOURS_PER_SHIFT;

    // Stage 3: output with shift-level variance
    let output_rate = hourly_capacity * efficiency * rng.range_f64(0.95, 1.05);

    // Stage 4: cumulative output
    state.current_output += output_rate;

    // Stage 5: efficiency drift
    let drift = EFFICIENCY_DRIFT_MEAN
        + rng.range_f64(-EFFICIENCY_DRIFT_NOISE, EFFICIENCY_DRIFT_NOISE);
    state.current_efficiency = (state.current_efficiency + drift).clamp(0.1, 1.0);

    // Stage 6: stochastic downtime / recovery
    if !downtime_adjusted {
        if rng.chance(state.equipment_wear * 0.01) {
            state.current_downtime += rng.range_f64(10.0, 60.0);
        } else {
            state.current_downtime = (state.current_downtime - DOWNTIME_RECOVERY_PER_STEP).max(0.0);
        }
    }

    // Stage 7: monotone wear
    state.equipment_wear = (state.equipment_wear + WEAR_PER_STEP).min(1.0);

    // Stage 8: shift-phase fatigue
    if step % 8 > 6 {
        state.worker_fatigue += 0.05;
    } else {
        state.worker_fatigue -= 0.02;
    }
    state.worker_fatigue = state.worker_fatigue.clamp(0.0, 1.0);

    // Stage 9: derived metrics
    let quality_rate = (95.0 + 4.0 * efficiency - 10.0 * state.worker_fatigue).min(99.0);
    let resource_utilization = if hourly_capacity > 0.0 {
        (output_rate / hourly_capacity * 100.0).min(100.0)
    } else {
        0.0
    };

    state.quality_rate = quality_rate;
    state.resource_utilization = resource_utilization;
    state.clamp_invariants();

    TwinMetrics {
        output_rate,
        effective_efficiency: efficiency,
        quality_rate,
        resource_utilization,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(capacity: Option<f64>, efficiency: f64) -> TwinConfiguration {
        TwinConfiguration {
            production_capacity: capacity,
            current_efficiency: efficiency,
            manning_level: None,
            process_category: None,
        }
    }

    #[test]
    fn test_missing_capacity_defaults_to_1000() {
        let config = config(None, 1.0);
        let mut state = TwinState::baseline(1.0);
        let mut rng = RngManager::new(9);

        let metrics = advance_twin(&config, &mut state, &StepOverrides::default(), 0, false, &mut rng);
        // 1000/8 × 1.0 × [0.95, 1.05)
        assert!(metrics.output_rate >= 118.75 && metrics.output_rate < 131.25);
    }

    #[test]
    fn test_modifiers_scale_output() {
        let config = config(Some(800.0), 0.5);
        let overrides = StepOverrides {
            efficiency_modifier: Some(2.0),
            capacity_modifier: Some(2.0),
        };
        let mut state = TwinState::baseline(0.5);
        let mut rng = RngManager::new(9);

        let metrics = advance_twin(&config, &mut state, &overrides, 0, false, &mut rng);
        assert_eq!(metrics.effective_efficiency, 1.0);
        // (1600/8) × 1.0 × [0.95, 1.05)
        assert!(metrics.output_rate >= 190.0 && metrics.output_rate < 210.0);
    }

    #[test]
    fn test_downtime_recovers_when_wear_is_zero() {
        let config = config(Some(1000.0), 0.8);
        let mut state = TwinState::baseline(0.8);
        state.current_downtime = 12.0;
        let mut rng = RngManager::new(3);

        // wear 0 → failure chance 0 → recovery path
        advance_twin(&config, &mut state, &StepOverrides::default(), 0, false, &mut rng);
        assert_eq!(state.current_downtime, 7.0);
        advance_twin(&config, &mut state, &StepOverrides::default(), 1, false, &mut rng);
        assert_eq!(state.current_downtime, 2.0);
        advance_twin(&config, &mut state, &StepOverrides::default(), 2, false, &mut rng);
        assert_eq!(state.current_downtime, 0.0);
    }

    #[test]
    fn test_downtime_stage_skipped_after_event_adjustment() {
        let config = config(Some(1000.0), 0.8);
        let mut state = TwinState::baseline(0.8);
        state.current_downtime = 120.0;
        let mut rng = RngManager::new(3);

        advance_twin(&config, &mut state, &StepOverrides::default(), 0, true, &mut rng);
        assert_eq!(state.current_downtime, 120.0);
    }

    #[test]
    fn test_fatigue_follows_shift_phase() {
        let config = config(Some(1000.0), 0.8);
        let mut state = TwinState::baseline(0.8);
        state.worker_fatigue = 0.5;
        let mut rng = RngManager::new(3);

        // Step 7 is the end-of-shift phase (7 % 8 > 6)
        advance_twin(&config, &mut state, &StepOverrides::default(), 7, false, &mut rng);
        assert!((state.worker_fatigue - 0.55).abs() < 1e-12);

        // Step 8 wraps back to the rested phase
        advance_twin(&config, &mut state, &StepOverrides::default(), 8, false, &mut rng);
        assert!((state.worker_fatigue - 0.53).abs() < 1e-12);
    }

    #[test]
    fn test_wear_is_monotone() {
        let config = config(Some(1000.0), 0.8);
        let mut state = TwinState::baseline(0.8);
        let mut rng = RngManager::new(11);

        let mut previous = state.equipment_wear;
        for step in 0..500 {
            advance_twin(&config, &mut state, &StepOverrides::default(), step, false, &mut rng);
            assert!(state.equipment_wear >= previous);
            previous = state.equipment_wear;
        }
    }

    #[test]
    fn test_quality_rate_capped_at_99() {
        let config = config(Some(1000.0), 1.0);
        let mut state = TwinState::baseline(1.0);
        let mut rng = RngManager::new(5);

        let metrics = advance_twin(&config, &mut state, &StepOverrides::default(), 0, false, &mut rng);
        // 95 + 4×1.0 − 10×0 = 99, capped
        assert!(metrics.quality_rate <= 99.0);
    }
}

//! Time management for the simulation
//!
//! The simulation operates in discrete steps of exactly one simulated hour.
//! The clock advances by one hour per step regardless of wall-clock execution
//! time; wall-clock duration is tracked separately by the driver as run
//! metadata.

use serde::{Deserialize, Serialize};

/// Length of one simulation step in simulated seconds (fixed at one hour)
pub const STEP_SECONDS: u64 = 3600;

/// Manages simulation time in discrete one-hour steps
///
/// # Example
/// ```
/// use twin_simulator_core_rs::core::clock::SimulationClock;
///
/// let mut clock = SimulationClock::new(24); // 24-hour horizon
/// assert_eq!(clock.current_step(), 0);
/// assert_eq!(clock.total_steps(), 24);
///
/// clock.advance_step();
/// assert_eq!(clock.current_step(), 1);
/// assert_eq!(clock.elapsed_hours(), 1.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationClock {
    /// Steps completed since run start
    current_step: usize,
    /// Total steps in the horizon
    total_steps: usize,
}

impl SimulationClock {
    /// Create a clock over a horizon of `duration_hours` simulated hours
    ///
    /// `total_steps = duration_hours × 3600 / STEP_SECONDS`, which with the
    /// fixed one-hour step collapses to one step per hour. A zero-hour
    /// horizon is valid and yields a clock that is immediately finished.
    pub fn new(duration_hours: usize) -> Self {
        let total_steps = duration_hours * 3600 / STEP_SECONDS as usize;
        Self {
            current_step: 0,
            total_steps,
        }
    }

    /// Advance time by one step (one simulated hour)
    pub fn advance_step(&mut self) {
        self.current_step += 1;
    }

    /// Steps completed since run start
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Total steps in the horizon
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// Simulated hours elapsed since run start
    pub fn elapsed_hours(&self) -> f64 {
        self.current_step as f64
    }

    /// Simulated seconds elapsed since run start
    pub fn elapsed_seconds(&self) -> u64 {
        self.current_step as u64 * STEP_SECONDS
    }

    /// Whether the horizon has been fully simulated
    pub fn is_finished(&self) -> bool {
        self.current_step >= self.total_steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_horizon_is_immediately_finished() {
        let clock = SimulationClock::new(0);
        assert!(clock.is_finished());
        assert_eq!(clock.total_steps(), 0);
    }

    #[test]
    fn test_one_step_per_hour() {
        let mut clock = SimulationClock::new(8);
        let mut steps = 0;
        while !clock.is_finished() {
            clock.advance_step();
            steps += 1;
        }
        assert_eq!(steps, 8);
        assert_eq!(clock.elapsed_seconds(), 8 * STEP_SECONDS);
    }
}

//! Timeline reduction: base summary, risk score, capacity analysis
//!
//! All functions here are pure reductions over a completed timeline; they
//! never mutate twin state and they tolerate empty timelines (a zero-hour
//! run yields all-zero aggregates).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::events::types::{FiredEventDetail, RiskKind};
use crate::models::run::{RunSummary, TimeStep};

/// Utilization threshold above which expansion is recommended (percent)
const PEAK_EXPANSION_THRESHOLD: f64 = 90.0;

/// Utilization threshold below which downsizing is recommended (percent)
const AVERAGE_DOWNSIZE_THRESHOLD: f64 = 50.0;

/// Peak-to-trough spread above which demand smoothing is recommended (points)
const SPREAD_SMOOTHING_THRESHOLD: f64 = 30.0;

/// Occurrence count and cumulative impact for one risk kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskKindBreakdown {
    pub occurrences: usize,
    pub total_impact: f64,
}

/// Risk aggregates for a risk-assessment run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskAnalysis {
    /// `min(100, 10 × Σ impact)` over every risk firing in the timeline
    pub risk_score: f64,

    /// Total risk firings across all kinds
    pub total_occurrences: usize,

    /// Per-kind occurrence counts and impact totals
    pub by_kind: BTreeMap<RiskKind, RiskKindBreakdown>,
}

/// Utilization aggregates for a capacity-planning run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapacityAnalysis {
    /// Highest per-step resource utilization observed (percent)
    pub peak_utilization: f64,

    /// Mean per-step resource utilization (percent)
    pub average_utilization: f64,

    /// Sample variance of utilization (n−1 denominator; 0 when n < 2)
    pub utilization_variance: f64,

    /// Textual recommendations derived from the thresholds above
    pub recommendations: Vec<String>,
}

/// Reduce a timeline into the base run summary
///
/// `total_output` and `total_downtime_minutes` read the final step's states
/// (output is cumulative per twin; downtime is a level, not a rate).
pub fn summarize(timeline: &[TimeStep], duration_hours: usize) -> RunSummary {
    let steps = timeline.len();
    let twin_count = timeline.first().map(|ts| ts.twins.len()).unwrap_or(0);

    let mut efficiency_sum = 0.0;
    let mut peak_efficiency: f64 = 0.0;
    for step in timeline {
        for snapshot in step.twins.values() {
            efficiency_sum += snapshot.state.current_efficiency;
            peak_efficiency = peak_efficiency.max(snapshot.state.current_efficiency);
        }
    }

    let samples = steps * twin_count;
    let average_efficiency = if samples > 0 {
        efficiency_sum / samples as f64
    } else {
        0.0
    };

    let (total_output, total_downtime_minutes) = timeline
        .last()
        .map(|final_step| {
            final_step.twins.values().fold((0.0, 0.0), |(out, down), s| {
                (out + s.state.current_output, down + s.state.current_downtime)
            })
        })
        .unwrap_or((0.0, 0.0));

    RunSummary {
        duration_hours,
        steps,
        twin_count,
        total_output,
        average_efficiency,
        peak_efficiency,
        total_downtime_minutes,
    }
}

/// Aggregate risk firings from the timeline's risk-event lists
pub fn analyze_risks(timeline: &[TimeStep]) -> RiskAnalysis {
    let mut by_kind: BTreeMap<RiskKind, RiskKindBreakdown> = BTreeMap::new();
    let mut impact_sum = 0.0;
    let mut total_occurrences = 0;

    for step in timeline {
        for fired in &step.risk_events {
            if let FiredEventDetail::Risk { kind, impact, .. } = &fired.detail {
                let entry = by_kind.entry(*kind).or_default();
                entry.occurrences += 1;
                entry.total_impact += impact;
                impact_sum += impact;
                total_occurrences += 1;
            }
        }
    }

    RiskAnalysis {
        risk_score: (10.0 * impact_sum).min(100.0),
        total_occurrences,
        by_kind,
    }
}

/// Aggregate per-step resource utilization into a capacity analysis
pub fn analyze_capacity(timeline: &[TimeStep]) -> CapacityAnalysis {
    let utilizations: Vec<f64> = timeline
        .iter()
        .flat_map(|step| step.twins.values())
        .map(|snapshot| snapshot.metrics.resource_utilization)
        .collect();

    if utilizations.is_empty() {
        return CapacityAnalysis::default();
    }

    let n = utilizations.len() as f64;
    let peak = utilizations.iter().cloned().fold(f64::MIN, f64::max);
    let trough = utilizations.iter().cloned().fold(f64::MAX, f64::min);
    let average = utilizations.iter().sum::<f64>() / n;

    // Sample variance, n−1 denominator
    let variance = if utilizations.len() > 1 {
        utilizations
            .iter()
            .map(|u| (u - average).powi(2))
            .sum::<f64>()
            / (n - 1.0)
    } else {
        0.0
    };

    let mut recommendations = Vec::new();
    if peak > PEAK_EXPANSION_THRESHOLD {
        recommendations.push(format!(
            "Peak utilization {:.1}% exceeds {:.0}%: consider expanding capacity",
            peak, PEAK_EXPANSION_THRESHOLD
        ));
    }
    if average < AVERAGE_DOWNSIZE_THRESHOLD {
        recommendations.push(format!(
            "Average utilization {:.1}% is below {:.0}%: consider downsizing or consolidating",
            average, AVERAGE_DOWNSIZE_THRESHOLD
        ));
    }
    if peak - trough > SPREAD_SMOOTHING_THRESHOLD {
        recommendations.push(format!(
            "Utilization spread of {:.1} points exceeds {:.0}: consider smoothing demand",
            peak - trough,
            SPREAD_SMOOTHING_THRESHOLD
        ));
    }
    if recommendations.is_empty() {
        recommendations.push("Capacity profile balanced; no action recommended".to_string());
    }

    CapacityAnalysis {
        peak_utilization: peak,
        average_utilization: average,
        utilization_variance: variance,
        recommendations,
    }
}

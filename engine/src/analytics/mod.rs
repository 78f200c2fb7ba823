//! Summary and analytics generation over completed timelines

pub mod summary;

pub use summary::{
    analyze_capacity, analyze_risks, summarize, CapacityAnalysis, RiskAnalysis, RiskKindBreakdown,
};

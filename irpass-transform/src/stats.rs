//! Per-transform statistics

use serde::Serialize;
use std::fmt;

/// Counters accumulated over every invocation of a scheduled transform
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransformStats {
    /// Completed invocations
    pub invocations: usize,
    /// Analysis lookups made through the context
    pub analysis_lookups: usize,
    /// Invalidation requests forwarded to the engine
    pub invalidations_requested: usize,
    /// Time spent inside `run` (microseconds)
    pub total_time_us: u64,
}

impl TransformStats {
    /// Create empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the counters of `other`
    pub fn merge(&mut self, other: &TransformStats) {
        self.invocations += other.invocations;
        self.analysis_lookups += other.analysis_lookups;
        self.invalidations_requested += other.invalidations_requested;
        self.total_time_us += other.total_time_us;
    }
}

impl fmt::Display for TransformStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} invocations, {} analysis lookups, {} invalidations, {}us",
            self.invocations, self.analysis_lookups, self.invalidations_requested, self.total_time_us
        )
    }
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;

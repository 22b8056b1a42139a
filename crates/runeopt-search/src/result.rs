//! Progress and result types delivered to the caller

use runeopt_core::{Combination, LoadoutIds};

/// Aggregated progress across the workers of the running phase
///
/// Counts include every finished phase.
#[derive(Debug, Clone)]
pub struct SearchProgress {
    /// 1 for the reduced search, 2 for the expanded one
    pub phase: u8,
    pub processed: u64,
    pub skipped: u64,
    pub total: u64,
    pub best_score: Option<f64>,
    pub best_combination: Option<Combination>,
}

impl SearchProgress {
    /// Fraction of the enumerated space covered so far, in `[0, 1]`
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        ((self.processed + self.skipped) as f64 / self.total as f64).min(1.0)
    }
}

/// Final outcome of a search
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub best_score: f64,
    /// `None` only if every weapon subtree faulted
    pub best_combination: Option<Combination>,
    /// Loadouts fully scored, summed over phases
    pub processed: u64,
    /// Loadouts pruned without scoring, summed over phases
    pub skipped: u64,
    /// Size of the enumerated space, summed over phases
    pub total: u64,
    /// Number of phases that ran
    pub phases: u8,
}

impl SearchResult {
    pub fn ids(&self) -> Option<LoadoutIds> {
        self.best_combination.as_ref().map(Combination::ids)
    }
}

/// Coordinator → handle events
#[derive(Debug, Clone)]
pub enum SearchEvent {
    Progress(SearchProgress),
    Complete(SearchResult),
    Cancelled,
}

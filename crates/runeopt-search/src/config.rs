//! Search options
//!
//! Everything the caller can tune about a search, loadable from RON.
//! Worker counts follow the same clamping rule as the rest of the
//! workspace: requested values are clamped to `[1, max_workers()]`.

use runeopt_core::{CharacterContext, Grade, Role};
use serde::{Deserialize, Serialize};

/// Upper limit on parallel workers regardless of the machine
pub const WORKER_CAP: usize = 8;

/// Options for a single search
///
/// # Example
///
/// ```
/// use runeopt_search::SearchOptions;
///
/// let options = SearchOptions::default().with_worker_count(4);
/// assert_eq!(options.worker_count(), 4.min(runeopt_search::max_workers()));
/// assert_eq!(options.top_n, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Overrides the context's role
    pub role: Option<Role>,
    /// Overrides the context's class code
    pub class_code: Option<String>,
    /// Runes below this grade are ignored
    pub min_grade: Grade,
    /// Requested number of workers; `None` uses [`max_workers`]
    ///
    /// Read through [`SearchOptions::worker_count`], which applies clamping.
    pub worker_count: Option<usize>,
    /// Enhancement level every rune is scored at
    pub enhance_level: u8,
    /// Size of the per-ranking cut applied to weapon and armor pools
    pub top_n: usize,
    /// Neighbors added on each side of a phase-1 pick in phase 2
    pub expand_k: usize,
    /// Scored leaves between progress events of a worker
    pub progress_interval: u64,
    /// Disable to run an exhaustive search
    pub pruning: bool,
    /// Run the expanded second phase
    pub two_phase: bool,
    /// Run the search on the calling thread if no thread can be spawned
    pub inline_fallback: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            role: None,
            class_code: None,
            min_grade: Grade::Common,
            worker_count: None,
            enhance_level: 0,
            top_n: 10,
            expand_k: 5,
            progress_interval: 50_000,
            pruning: true,
            two_phase: true,
            inline_fallback: true,
        }
    }
}

impl SearchOptions {
    pub fn with_worker_count(mut self, n: usize) -> Self {
        self.worker_count = Some(n);
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_class(mut self, class_code: impl Into<String>) -> Self {
        self.class_code = Some(class_code.into());
        self
    }

    pub fn with_min_grade(mut self, grade: Grade) -> Self {
        self.min_grade = grade;
        self
    }

    pub fn with_enhance_level(mut self, level: u8) -> Self {
        self.enhance_level = level;
        self
    }

    pub fn exhaustive(mut self) -> Self {
        self.pruning = false;
        self
    }

    pub fn single_phase(mut self) -> Self {
        self.two_phase = false;
        self
    }

    /// Effective worker count, clamped to `[1, max_workers()]`
    pub fn worker_count(&self) -> usize {
        self.worker_count
            .map_or_else(max_workers, |n| n.clamp(1, max_workers()))
    }

    /// The context with this search's role and class overrides applied
    pub fn apply_to(&self, ctx: &CharacterContext) -> CharacterContext {
        let mut ctx = ctx.clone();
        if let Some(role) = self.role {
            ctx.role = role;
        }
        if let Some(class_code) = &self.class_code {
            ctx.class_code = class_code.clone();
        }
        ctx
    }
}

/// Maximum number of workers on this system
///
/// The number of logical CPUs reported by `num_cpus`, capped at [`WORKER_CAP`].
pub fn max_workers() -> usize {
    num_cpus::get().clamp(1, WORKER_CAP)
}

//! Branch-and-bound enumeration over one weapon partition
//!
//! Loadouts are enumerated weapon → armor 5-subset → emblem → accessory
//! 3-subset, each subset taken in increasing pool index. Because every pool
//! is sorted by upper bound, the best completion of a partial loadout is the
//! next entries of each remaining pool, and once a branch fails the bound
//! test every later sibling fails it too. The whole remaining range is then
//! counted as skipped in one step, keeping `processed + skipped` equal to the
//! number of loadouts covered.
//!
//! Fixed slots contribute their upper bound rather than their base score:
//! synergies are only resolved at the leaves, so a fixed rune may still gain
//! from runes chosen further down.

use crate::space::{
    binomial, SearchSpace, SlotIndices, ACCESSORY_START, ARMOR_START, EMBLEM_SLOT, WEAPON_SLOT,
};
use log::error;
use runeopt_core::{ACCESSORY_SLOTS, ARMOR_SLOTS, TOTAL_SLOTS};
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};

/// Lifecycle of a worker's search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Enumerating,
    Reporting,
    Done,
}

/// Counters and best loadout of a worker so far
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WorkerProgress {
    pub processed: u64,
    pub skipped: u64,
    /// Best score found by this worker, if it beat the seed
    pub best_score: Option<f64>,
    pub best: Option<SlotIndices>,
}

/// Branch-and-bound state for one worker
pub struct Searcher<'a> {
    space: &'a SearchSpace,
    cancel: &'a AtomicBool,
    pruning: bool,
    progress_interval: u64,
    state: WorkerState,
    processed: u64,
    skipped: u64,
    best_score: f64,
    best: Option<SlotIndices>,
    slots: SlotIndices,
    since_report: u64,
    #[cfg(test)]
    fault_weapon: Option<usize>,
}

impl<'a> Searcher<'a> {
    /// Create a searcher; only loadouts scoring strictly above `seed` are kept
    pub fn new(space: &'a SearchSpace, cancel: &'a AtomicBool, seed: Option<f64>) -> Self {
        Self {
            space,
            cancel,
            pruning: true,
            progress_interval: u64::MAX,
            state: WorkerState::Idle,
            processed: 0,
            skipped: 0,
            best_score: seed.unwrap_or(f64::NEG_INFINITY),
            best: None,
            slots: [0; TOTAL_SLOTS],
            since_report: 0,
            #[cfg(test)]
            fault_weapon: None,
        }
    }

    pub fn with_pruning(mut self, pruning: bool) -> Self {
        self.pruning = pruning;
        self
    }

    /// Emit progress every `interval` scored leaves
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn progress(&self) -> WorkerProgress {
        WorkerProgress {
            processed: self.processed,
            skipped: self.skipped,
            best_score: self.best.map(|_| self.best_score),
            best: self.best,
        }
    }

    /// Panic on the first leaf under weapon index `w`
    #[cfg(test)]
    fn with_fault_under(mut self, w: usize) -> Self {
        self.fault_weapon = Some(w);
        self
    }

    /// Rune ids of the slots visited last, `?` where an index is out of range
    fn visited_ids(&self) -> String {
        self.slots
            .iter()
            .enumerate()
            .map(|(slot, &index)| {
                self.space
                    .pool(slot)
                    .get(index)
                    .map_or_else(|| "?".to_string(), |r| r.id().to_string())
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    fn prunes(&self, bound: f64) -> bool {
        self.pruning && bound <= self.best_score
    }

    /// Search every weapon in `weapons`, reporting progress through `report`
    ///
    /// A panic while searching one weapon is contained: that weapon's subtree
    /// is counted as skipped and the search moves on.
    pub fn run<R>(&mut self, weapons: Range<usize>, mut report: R) -> WorkerProgress
    where
        R: FnMut(&WorkerProgress),
    {
        self.state = WorkerState::Enumerating;
        for w in weapons {
            if self.cancelled() {
                break;
            }
            let before = (self.processed, self.skipped, self.best_score, self.best);
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.weapon(w, &mut report)));
            match outcome {
                Ok(true) => {}
                Ok(false) => break,
                Err(_) => {
                    // Slots deeper than the fault may still hold an earlier branch
                    error!(
                        "search fault in the subtree of weapon {} (last slots visited: [{}]); \
                         the whole subtree is counted as skipped",
                        self.space.weapons[w].id(),
                        self.visited_ids()
                    );
                    (self.processed, self.skipped, self.best_score, self.best) = before;
                    self.skipped = self.skipped.saturating_add(self.space.per_weapon());
                    self.state = WorkerState::Enumerating;
                }
            }
        }
        self.state = WorkerState::Done;
        self.progress()
    }

    /// Returns false when cancelled
    fn weapon<R: FnMut(&WorkerProgress)>(&mut self, w: usize, report: &mut R) -> bool {
        let space = self.space;
        self.slots[WEAPON_SLOT] = w;
        let fixed = space.weapons[w].max_score;
        let bound = fixed
            + space.armor_rest(0, ARMOR_SLOTS)
            + space.emblem_best()
            + space.accessory_rest(0, ACCESSORY_SLOTS);
        if self.prunes(bound) {
            self.skipped = self.skipped.saturating_add(space.per_weapon());
            return true;
        }
        self.armors(0, 0, fixed, report)
    }

    fn armors<R: FnMut(&WorkerProgress)>(
        &mut self,
        depth: usize,
        start: usize,
        fixed: f64,
        report: &mut R,
    ) -> bool {
        if depth == ARMOR_SLOTS {
            return self.emblems(fixed, report);
        }
        let space = self.space;
        let n = space.armors.len();
        let remaining = ARMOR_SLOTS - depth;
        let tail = space.emblem_best() + space.accessory_rest(0, ACCESSORY_SLOTS);

        for i in start..=(n - remaining) {
            if self.cancelled() {
                return false;
            }
            let with = fixed + space.armors[i].max_score;
            let bound = with + space.armor_rest(i + 1, remaining - 1) + tail;
            if self.prunes(bound) {
                let skipped = binomial(n - i, remaining).saturating_mul(space.below_armor());
                self.skipped = self.skipped.saturating_add(skipped);
                break;
            }
            self.slots[ARMOR_START + depth] = i;
            if !self.armors(depth + 1, i + 1, with, report) {
                return false;
            }
        }
        true
    }

    fn emblems<R: FnMut(&WorkerProgress)>(&mut self, fixed: f64, report: &mut R) -> bool {
        let space = self.space;
        let n = space.emblems.len();
        let below = binomial(space.accessories.len(), ACCESSORY_SLOTS);
        let tail = space.accessory_rest(0, ACCESSORY_SLOTS);

        for e in 0..n {
            let with = fixed + space.emblems[e].max_score;
            if self.prunes(with + tail) {
                let skipped = ((n - e) as u64).saturating_mul(below);
                self.skipped = self.skipped.saturating_add(skipped);
                break;
            }
            self.slots[EMBLEM_SLOT] = e;
            if !self.accessories(0, 0, with, report) {
                return false;
            }
        }
        true
    }

    fn accessories<R: FnMut(&WorkerProgress)>(
        &mut self,
        depth: usize,
        start: usize,
        fixed: f64,
        report: &mut R,
    ) -> bool {
        if depth == ACCESSORY_SLOTS {
            return self.leaf(report);
        }
        let space = self.space;
        let n = space.accessories.len();
        let remaining = ACCESSORY_SLOTS - depth;

        for i in start..=(n - remaining) {
            let with = fixed + space.accessories[i].max_score;
            let bound = with + space.accessory_rest(i + 1, remaining - 1);
            if self.prunes(bound) {
                self.skipped = self.skipped.saturating_add(binomial(n - i, remaining));
                break;
            }
            self.slots[ACCESSORY_START + depth] = i;
            if !self.accessories(depth + 1, i + 1, with, report) {
                return false;
            }
        }
        true
    }

    fn leaf<R: FnMut(&WorkerProgress)>(&mut self, report: &mut R) -> bool {
        if self.cancelled() {
            return false;
        }
        #[cfg(test)]
        {
            if self.fault_weapon == Some(self.slots[WEAPON_SLOT]) {
                panic!("injected fault");
            }
        }
        let refs = self.space.slot_refs(&self.slots);
        let base: f64 = refs.iter().map(|r| r.base_score).sum();
        let score = base + self.space.resolver.bonus(&refs);

        self.processed += 1;
        if score > self.best_score {
            self.best_score = score;
            self.best = Some(self.slots);
        }

        self.since_report += 1;
        if self.since_report >= self.progress_interval {
            self.since_report = 0;
            self.state = WorkerState::Reporting;
            report(&self.progress());
            self.state = WorkerState::Enumerating;
        }
        true
    }
}

//! Coordinator - owns the workers of a search and drives both phases
//!
//! ## Phases
//!
//! 1. The weapon and armor pools are cut to their top-N and the weapon list
//!    is split into contiguous partitions, one per worker.
//! 2. Around the phase-1 weapon and armor picks, each pool gains its ±K
//!    neighbors from the full ranking. If neither pool grew, phase 2 is
//!    skipped; otherwise it runs seeded with the phase-1 best score, so it
//!    can only replace the result with a strictly better one.
//!
//! Workers share nothing mutable. The coordinator keeps one progress record
//! per worker, derives aggregated progress from them, and picks the best
//! result by taking a max over the workers' final reports.

use crate::bnb::WorkerProgress;
use crate::candidates::{expand, reduce, RankedPools};
use crate::config::SearchOptions;
use crate::partition;
use crate::result::{SearchEvent, SearchProgress, SearchResult};
use crate::space::{SearchSpace, SlotIndices};
use crate::spawn::spawn_named;
use crate::worker::{WorkerId, WorkerMessage, WorkerTask};
use log::{debug, error, info, warn};
use runeopt_core::{Combination, RuneId, ScoredRune, SynergyResolver, ARMOR_SLOTS};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Counters of finished phases
#[derive(Debug, Clone, Copy, Default)]
struct Totals {
    processed: u64,
    skipped: u64,
    total: u64,
}

impl Totals {
    fn add(self, other: Totals) -> Totals {
        Totals {
            processed: self.processed.saturating_add(other.processed),
            skipped: self.skipped.saturating_add(other.skipped),
            total: self.total.saturating_add(other.total),
        }
    }
}

/// The coordinator's record of one worker
struct WorkerSlot {
    id: WorkerId,
    thread: Option<JoinHandle<()>>,
    /// Loadouts in this worker's partition
    assigned: u64,
    progress: WorkerProgress,
    done: bool,
}

struct PhaseOutcome {
    totals: Totals,
    best: Option<(f64, Combination)>,
}

/// Drives a complete search and streams events to its handle
pub(crate) struct Coordinator {
    ranked: RankedPools,
    resolver: SynergyResolver,
    options: SearchOptions,
    cancel: Arc<AtomicBool>,
    events: Sender<SearchEvent>,
}

impl Coordinator {
    pub fn new(
        ranked: RankedPools,
        resolver: SynergyResolver,
        options: SearchOptions,
        cancel: Arc<AtomicBool>,
        events: Sender<SearchEvent>,
    ) -> Self {
        Self {
            ranked,
            resolver,
            options,
            cancel,
            events,
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    fn send(&self, event: SearchEvent) {
        // The handle may already be gone
        let _ = self.events.send(event);
    }

    fn space(&self, weapons: Vec<ScoredRune>, armors: Vec<ScoredRune>) -> Arc<SearchSpace> {
        Arc::new(SearchSpace::new(
            weapons,
            armors,
            self.ranked.emblems.clone(),
            self.ranked.accessories.clone(),
            self.resolver,
        ))
    }

    /// Run both phases and deliver the final event
    pub fn run(self) {
        let top_n = self.options.top_n;
        let weapons = reduce(&self.ranked.weapons, top_n.max(1));
        let armors = reduce(&self.ranked.armors, top_n.max(ARMOR_SLOTS));
        info!(
            "search started: {}/{} weapons, {}/{} armors, {} emblems, {} accessories",
            weapons.len(),
            self.ranked.weapons.len(),
            armors.len(),
            self.ranked.armors.len(),
            self.ranked.emblems.len(),
            self.ranked.accessories.len()
        );

        let space = self.space(weapons.clone(), armors.clone());
        let Some(first) = self.run_phase(1, space, None, Totals::default(), None) else {
            return self.finish_cancelled();
        };
        let mut totals = first.totals;
        let mut best = first.best;
        let mut phases = 1;

        let pick = best.as_ref().map(|(score, combination)| {
            let armor_ids: Vec<RuneId> = combination.armors.iter().map(|a| a.id).collect();
            (*score, combination.weapon.id, armor_ids)
        });
        if self.options.two_phase {
            match pick {
                Some((score, weapon_id, armor_ids)) => {
                    let k = self.options.expand_k;
                    let wider_weapons = expand(&self.ranked.weapons, &weapons, &[weapon_id], k);
                    let wider_armors = expand(&self.ranked.armors, &armors, &armor_ids, k);

                    if wider_weapons.len() > weapons.len() || wider_armors.len() > armors.len() {
                        info!(
                            "phase 2: {} weapons, {} armors, seeded with {:.3}",
                            wider_weapons.len(),
                            wider_armors.len(),
                            score
                        );
                        let space = self.space(wider_weapons, wider_armors);
                        let Some(second) =
                            self.run_phase(2, space, Some(score), totals, best.clone())
                        else {
                            return self.finish_cancelled();
                        };
                        totals = totals.add(second.totals);
                        phases = 2;
                        if second.best.is_some() {
                            best = second.best;
                        }
                    } else {
                        info!("phase 2 skipped: expanded pools are not larger");
                    }
                }
                None => warn!("phase 2 skipped: phase 1 found no loadout"),
            }
        }

        let (best_score, best_combination) = match best {
            Some((score, combination)) => (score, Some(combination)),
            None => (0.0, None),
        };
        info!(
            "search finished: best {:.3}, {} processed, {} skipped of {}",
            best_score, totals.processed, totals.skipped, totals.total
        );
        self.send(SearchEvent::Complete(SearchResult {
            best_score,
            best_combination,
            processed: totals.processed,
            skipped: totals.skipped,
            total: totals.total,
            phases,
        }));
    }

    fn finish_cancelled(&self) {
        info!("search cancelled");
        self.send(SearchEvent::Cancelled);
    }

    /// Run one phase to completion; `None` when cancelled
    fn run_phase(
        &self,
        phase: u8,
        space: Arc<SearchSpace>,
        seed: Option<f64>,
        before: Totals,
        prior: Option<(f64, Combination)>,
    ) -> Option<PhaseOutcome> {
        let ranges = partition::contiguous(space.weapons.len(), self.options.worker_count());
        debug!(
            "phase {}: {} loadouts over {} workers",
            phase,
            space.total(),
            ranges.len()
        );

        let (tx, rx) = mpsc::channel();
        let mut workers = Vec::with_capacity(ranges.len());
        for (i, range) in ranges.into_iter().enumerate() {
            let id = WorkerId(i);
            let assigned = (range.len() as u64).saturating_mul(space.per_weapon());
            let task = WorkerTask {
                id,
                space: Arc::clone(&space),
                weapons: range,
                seed,
                pruning: self.options.pruning,
                progress_interval: self.options.progress_interval,
                cancel: Arc::clone(&self.cancel),
            };

            let spawned = {
                let task = task.clone();
                let tx = tx.clone();
                spawn_named(format!("runeopt-worker-{}", i), move || task.run(tx))
            };
            let thread = match spawned {
                Ok(handle) => Some(handle),
                Err(e) => {
                    warn!("failed to spawn {}: {}; running its partition inline", id, e);
                    task.run(tx.clone());
                    None
                }
            };
            workers.push(WorkerSlot {
                id,
                thread,
                assigned,
                progress: WorkerProgress::default(),
                done: false,
            });
        }
        drop(tx);

        let mut remaining = workers.len();
        while remaining > 0 {
            match rx.recv() {
                Ok(WorkerMessage::Progress { worker, progress }) => {
                    workers[worker.0].progress = progress;
                }
                Ok(WorkerMessage::Complete { worker, progress }) => {
                    let slot = &mut workers[worker.0];
                    slot.progress = progress;
                    slot.done = true;
                    remaining -= 1;
                }
                Err(_) => {
                    error!("{} workers exited without reporting", remaining);
                    break;
                }
            }
            if !self.cancelled() {
                let snapshot = self.snapshot(phase, &space, &workers, before, prior.as_ref());
                self.send(SearchEvent::Progress(snapshot));
            }
        }

        for slot in &mut workers {
            if let Some(thread) = slot.thread.take() {
                if thread.join().is_err() {
                    error!("{} panicked", slot.id);
                }
            }
        }

        if self.cancelled() {
            return None;
        }

        let mut totals = Totals {
            total: space.total(),
            ..Totals::default()
        };
        for slot in &workers {
            let covered = slot.progress.processed.saturating_add(slot.progress.skipped);
            let mut skipped = slot.progress.skipped;
            if !slot.done {
                // Whatever the worker never reached counts as skipped
                skipped = skipped.saturating_add(slot.assigned.saturating_sub(covered));
            }
            totals.processed = totals.processed.saturating_add(slot.progress.processed);
            totals.skipped = totals.skipped.saturating_add(skipped);
        }

        let best = phase_best(&workers).map(|(score, slots)| (score, space.combination(&slots)));
        debug!(
            "phase {} done: {} processed, {} skipped, best {:?}",
            phase,
            totals.processed,
            totals.skipped,
            best.as_ref().map(|(score, _)| *score)
        );
        Some(PhaseOutcome { totals, best })
    }

    fn snapshot(
        &self,
        phase: u8,
        space: &SearchSpace,
        workers: &[WorkerSlot],
        before: Totals,
        prior: Option<&(f64, Combination)>,
    ) -> SearchProgress {
        let mut processed = before.processed;
        let mut skipped = before.skipped;
        for slot in workers {
            processed = processed.saturating_add(slot.progress.processed);
            skipped = skipped.saturating_add(slot.progress.skipped);
        }

        let (best_score, best_combination) = match (phase_best(workers), prior) {
            (Some((score, slots)), Some((prior_score, _))) if score > *prior_score => {
                (Some(score), Some(space.combination(&slots)))
            }
            (_, Some((prior_score, combination))) => (Some(*prior_score), Some(combination.clone())),
            (Some((score, slots)), None) => (Some(score), Some(space.combination(&slots))),
            (None, None) => (None, None),
        };

        SearchProgress {
            phase,
            processed,
            skipped,
            total: before.total.saturating_add(space.total()),
            best_score,
            best_combination,
        }
    }
}

/// Best report across workers; ties go to the lowest worker index
fn phase_best(workers: &[WorkerSlot]) -> Option<(f64, SlotIndices)> {
    let mut best: Option<(f64, SlotIndices)> = None;
    for slot in workers {
        if let (Some(score), Some(slots)) = (slot.progress.best_score, slot.progress.best) {
            if best.map_or(true, |(current, _)| score > current) {
                best = Some((score, slots));
            }
        }
    }
    best
}

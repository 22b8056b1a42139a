//! Worker tasks and their messages to the coordinator

use crate::bnb::{Searcher, WorkerProgress};
use crate::space::SearchSpace;
use log::debug;
use std::ops::Range;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc::Sender;
use std::sync::Arc;

/// Index of a worker within a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(pub usize);

impl std::fmt::Display for WorkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Worker({})", self.0)
    }
}

/// Worker → coordinator messages
#[derive(Debug, Clone)]
pub enum WorkerMessage {
    Progress {
        worker: WorkerId,
        progress: WorkerProgress,
    },
    Complete {
        worker: WorkerId,
        progress: WorkerProgress,
    },
}

/// Everything a worker needs, handed over at dispatch
///
/// The space is shared read-only; nothing in a task is written by anyone else.
#[derive(Debug, Clone)]
pub struct WorkerTask {
    pub id: WorkerId,
    pub space: Arc<SearchSpace>,
    pub weapons: Range<usize>,
    pub seed: Option<f64>,
    pub pruning: bool,
    pub progress_interval: u64,
    pub cancel: Arc<AtomicBool>,
}

impl WorkerTask {
    /// Search the partition, streaming progress and the final result to `tx`
    ///
    /// A closed channel means nobody is listening any more; the search still
    /// runs to completion or cancellation.
    pub fn run(self, tx: Sender<WorkerMessage>) {
        let id = self.id;
        debug!("{} searching weapons {:?}", id, self.weapons);

        let mut searcher = Searcher::new(&self.space, &self.cancel, self.seed)
            .with_pruning(self.pruning)
            .with_progress_interval(self.progress_interval);
        let progress = searcher.run(self.weapons.clone(), |progress| {
            let _ = tx.send(WorkerMessage::Progress {
                worker: id,
                progress: *progress,
            });
        });

        debug!(
            "{} done: {} processed, {} skipped",
            id, progress.processed, progress.skipped
        );
        let _ = tx.send(WorkerMessage::Complete {
            worker: id,
            progress,
        });
    }
}
